//! Option lists for dependent selectors. The synchronous page render and
//! the on-demand JSON endpoint both shape their results here so the two
//! paths cannot drift.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OptionItem {
    pub id: i64,
    pub text: String,
    #[sqlx(default)]
    pub selected: bool,
}

/// Marks the options whose ids were previously chosen, so a filtered URL
/// round-trips to the same selector state.
pub fn mark_selected(mut options: Vec<OptionItem>, selected: &[i64]) -> Vec<OptionItem> {
    for opt in &mut options {
        opt.selected = selected.contains(&opt.id);
    }
    options
}

/// Legacy response shape: a plain id → label map.
pub fn as_map(options: &[OptionItem]) -> BTreeMap<i64, String> {
    options.iter().map(|o| (o.id, o.text.clone())).collect()
}
