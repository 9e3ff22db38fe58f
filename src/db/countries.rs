use sqlx::PgPool;

use crate::models::Country;
use crate::options::OptionItem;

pub async fn options(pool: &PgPool) -> Result<Vec<OptionItem>, sqlx::Error> {
    sqlx::query_as::<_, OptionItem>(
        "SELECT id, name AS text FROM countries WHERE is_active = 1 ORDER BY name ASC, id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &PgPool, name: &str) -> Result<Country, sqlx::Error> {
    sqlx::query_as::<_, Country>(
        "INSERT INTO countries (name) VALUES ($1) RETURNING id, name, is_active",
    )
    .bind(name)
    .fetch_one(pool)
    .await
}
