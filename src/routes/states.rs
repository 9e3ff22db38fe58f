use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::gate::{Gate, ReadCities};
use crate::db;
use crate::error::AppError;
use crate::listing::parse_id_list;
use crate::options;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct OptionsParams {
    /// Comma-joined parent country ids; blank or "all" means none.
    pub country: Option<String>,
    /// Previously chosen state ids, marked selected in the response.
    pub selected: Option<String>,
    /// "map" for the legacy id -> label object, anything else for the
    /// ordered option array.
    pub shape: Option<String>,
}

/// On-demand half of the dependent selector. Queries the same relation,
/// with the same ordering and shape, as the synchronous page render.
pub async fn options(
    _gate: Gate<ReadCities>,
    State(state): State<SharedState>,
    Query(params): Query<OptionsParams>,
) -> Result<Response, AppError> {
    let country_ids = parse_id_list(params.country.as_deref());
    let selected = parse_id_list(params.selected.as_deref());

    let opts = db::states::options_for_countries(&state.pool, &country_ids).await?;
    let opts = options::mark_selected(opts, &selected);

    match params.shape.as_deref() {
        Some("map") => Ok(Json(options::as_map(&opts)).into_response()),
        _ => Ok(Json(opts).into_response()),
    }
}
