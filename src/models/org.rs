use serde::{Deserialize, Serialize};

use crate::models::Status;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Org {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "is_active")]
    pub status: Status,
}
