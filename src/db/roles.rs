use sqlx::PgPool;

use crate::models::Role;
use crate::options::OptionItem;

/// Roles as selector options, ordered by name.
pub async fn options(pool: &PgPool) -> Result<Vec<OptionItem>, sqlx::Error> {
    sqlx::query_as::<_, OptionItem>("SELECT id, name AS text FROM roles ORDER BY name ASC, id ASC")
        .fetch_all(pool)
        .await
}

/// The user's current role, if any. At most one row by schema constraint.
pub async fn role_for_user(pool: &PgPool, user_id: i64) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT r.id, r.name FROM roles r
         JOIN user_roles ur ON ur.role_id = r.id
         WHERE ur.user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &PgPool, name: &str) -> Result<Role, sqlx::Error> {
    sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(pool)
        .await
}

/// Second phase of role assignment: the caller resolves a role id to its
/// name, and this replaces the user's role membership by that name. The
/// lookup and the membership swap happen in one transaction.
pub async fn sync_for_user(pool: &PgPool, user_id: i64, role_name: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let role_id: i64 = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
        .bind(role_name)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}
