use sqlx::PgPool;

use crate::models::Org;
use crate::options::OptionItem;

/// Active orgs as selector options. Newest first, matching the original
/// ordering of the user form.
pub async fn options(pool: &PgPool) -> Result<Vec<OptionItem>, sqlx::Error> {
    sqlx::query_as::<_, OptionItem>(
        "SELECT id, name AS text FROM orgs WHERE is_active = 1 ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Org>, sqlx::Error> {
    sqlx::query_as::<_, Org>("SELECT * FROM orgs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, name: &str) -> Result<Org, sqlx::Error> {
    sqlx::query_as::<_, Org>("INSERT INTO orgs (name) VALUES ($1) RETURNING id, name, is_active")
        .bind(name)
        .fetch_one(pool)
        .await
}
