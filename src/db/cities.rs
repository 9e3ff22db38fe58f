use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::listing::{Page, Pager, Predicate};
use crate::models::{City, CityRow, Status};

const SEARCH_COLUMNS: &[&str] = &["c.name"];

const SEARCH_RELATED: &[&str] = &[
    "EXISTS (SELECT 1 FROM states s2 WHERE s2.id = c.state_id AND s2.name ILIKE ",
    "EXISTS (SELECT 1 FROM states s3 JOIN countries co2 ON co2.id = s3.country_id \
     WHERE s3.id = c.state_id AND co2.name ILIKE ",
];

/// Active cities filtered by search term and country/state id lists, with
/// the state and country names joined in for display. Empty id lists are
/// the unconstrained sentinel.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    country_ids: &[i64],
    state_ids: &[i64],
    pager: Pager,
    page: i64,
) -> Result<Page<CityRow>, sqlx::Error> {
    let predicate = Predicate::new()
        .text(search, SEARCH_COLUMNS, SEARCH_RELATED)
        .id_in("s.country_id", country_ids)
        .id_in("c.state_id", state_ids);

    let mut count_qb = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM cities c \
         JOIN states s ON s.id = c.state_id \
         WHERE c.is_active = 1",
    );
    predicate.apply(&mut count_qb);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let (limit, offset) = pager.limit_offset(page);
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT c.id, c.name, s.name AS state_name, co.name AS country_name \
         FROM cities c \
         JOIN states s ON s.id = c.state_id \
         JOIN countries co ON co.id = s.country_id \
         WHERE c.is_active = 1",
    );
    predicate.apply(&mut qb);
    qb.push(" ORDER BY c.name ASC, c.id ASC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let items = qb.build_query_as::<CityRow>().fetch_all(pool).await?;

    Ok(Page {
        items,
        total,
        page: page.max(1),
        per_page: pager.page_size,
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<City>, sqlx::Error> {
    sqlx::query_as::<_, City>("SELECT * FROM cities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, state_id: i64, name: &str) -> Result<City, sqlx::Error> {
    sqlx::query_as::<_, City>(
        "INSERT INTO cities (state_id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(state_id)
    .bind(name)
    .fetch_one(pool)
    .await
}

#[derive(Debug, Default)]
pub struct CityChanges {
    pub name: Option<String>,
    pub state_id: Option<i64>,
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: &CityChanges,
    actor_id: i64,
) -> Result<u64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE cities SET updated_at = now()");
    qb.push(", updatedby_userid = ");
    qb.push_bind(actor_id);
    if let Some(name) = &changes.name {
        qb.push(", name = ");
        qb.push_bind(name.clone());
    }
    if let Some(state_id) = changes.state_id {
        qb.push(", state_id = ");
        qb.push_bind(state_id);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Reference rows are hard-deleted; there is nothing downstream to audit.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn bulk_remove(pool: &PgPool, ids: &[i64], actor_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE cities SET is_active = $2, updatedby_userid = $3, updated_at = now()
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .bind(Status::Removed)
    .bind(actor_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
