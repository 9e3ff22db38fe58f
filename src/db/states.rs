use sqlx::PgPool;

use crate::models::State;
use crate::options::OptionItem;

/// Valid child options for the selected countries, ordered by label. The
/// page render and the on-demand endpoint both call this, so the two paths
/// return identical sequences. No parents selected means no options, never
/// an error.
pub async fn options_for_countries(
    pool: &PgPool,
    country_ids: &[i64],
) -> Result<Vec<OptionItem>, sqlx::Error> {
    if country_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, OptionItem>(
        "SELECT id, name AS text FROM states
         WHERE is_active = 1 AND country_id = ANY($1)
         ORDER BY name ASC, id ASC",
    )
    .bind(country_ids)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<State>, sqlx::Error> {
    sqlx::query_as::<_, State>("SELECT * FROM states WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, country_id: i64, name: &str) -> Result<State, sqlx::Error> {
    sqlx::query_as::<_, State>(
        "INSERT INTO states (country_id, name) VALUES ($1, $2)
         RETURNING id, country_id, name, is_active",
    )
    .bind(country_id)
    .bind(name)
    .fetch_one(pool)
    .await
}
