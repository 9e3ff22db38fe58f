use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Status;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "is_active")]
    pub status: Status,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub country_id: i64,
    pub name: String,
    #[sqlx(rename = "is_active")]
    pub status: Status,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub state_id: i64,
    pub name: String,
    #[sqlx(rename = "is_active")]
    pub status: Status,
    pub updatedby_userid: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection joining up the geographic hierarchy for display.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct CityRow {
    pub id: i64,
    pub name: String,
    pub state_name: String,
    pub country_name: String,
}
