use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record status. The bulk-removal path sets `Removed` rather than deleting
/// rows, so the audit trail survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum Status {
    Active = 1,
    Inactive = 2,
    Removed = 3,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub org_id: Option<i64>,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(rename = "is_active")]
    pub status: Status,
    pub updatedby_userid: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection: user columns plus the id+name display fields of the
/// related org and role, resolved in the same query.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub org_name: Option<String>,
    pub role_name: Option<String>,
}
