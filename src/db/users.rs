use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::listing::{Page, Pager, Predicate};
use crate::models::{Status, User, UserRow};

const SEARCH_COLUMNS: &[&str] = &["u.name", "u.username", "u.email", "u.phone"];

// Related-entity matches are independent EXISTS checks, ORed into the text
// disjunction. A joined conjunction would change which rows qualify.
const SEARCH_RELATED: &[&str] = &[
    "EXISTS (SELECT 1 FROM orgs o2 WHERE o2.id = u.org_id AND o2.name ILIKE ",
    "EXISTS (SELECT 1 FROM user_roles ur2 JOIN roles r2 ON r2.id = ur2.role_id \
     WHERE ur2.user_id = u.id AND r2.name ILIKE ",
];

fn search_predicate(search: Option<&str>) -> Predicate {
    Predicate::new().text(search, SEARCH_COLUMNS, SEARCH_RELATED)
}

/// Active users matching the search term, one page at a time, with org and
/// role names projected in the same query.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    pager: Pager,
    page: i64,
) -> Result<Page<UserRow>, sqlx::Error> {
    let predicate = search_predicate(search);

    let mut count_qb =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users u WHERE u.is_active = 1");
    predicate.apply(&mut count_qb);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let (limit, offset) = pager.limit_offset(page);
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT u.id, u.name, u.username, u.email, u.phone, \
         o.name AS org_name, r.name AS role_name \
         FROM users u \
         LEFT JOIN orgs o ON o.id = u.org_id \
         LEFT JOIN user_roles ur ON ur.user_id = u.id \
         LEFT JOIN roles r ON r.id = ur.role_id \
         WHERE u.is_active = 1",
    );
    predicate.apply(&mut qb);
    qb.push(" ORDER BY u.name ASC, u.id ASC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let items = qb.build_query_as::<UserRow>().fetch_all(pool).await?;

    Ok(Page {
        items,
        total,
        page: page.max(1),
        per_page: pager.page_size,
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Display projection for the show page: same shape as a listing row.
pub async fn find_row_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT u.id, u.name, u.username, u.email, u.phone, \
         o.name AS org_name, r.name AS role_name \
         FROM users u \
         LEFT JOIN orgs o ON o.id = u.org_id \
         LEFT JOIN user_roles ur ON ur.user_id = u.id \
         LEFT JOIN roles r ON r.id = ur.role_id \
         WHERE u.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    org_id: Option<i64>,
    name: &str,
    username: &str,
    email: &str,
    phone: Option<&str>,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (org_id, name, username, email, phone, password_hash, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(org_id)
    .bind(name)
    .bind(username)
    .bind(email)
    .bind(phone)
    .bind(password_hash)
    .bind(Status::Active)
    .fetch_one(pool)
    .await
}

/// Fields a partial update may touch. `None` means "leave unchanged".
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub org_id: Option<i64>,
    pub status: Option<Status>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.org_id.is_none()
            && self.status.is_none()
    }
}

/// Writes only the fields present in `changes`. Returns rows affected so
/// the caller can surface a 404 for an unknown id.
pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: &UserChanges,
    actor_id: i64,
) -> Result<u64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = now()");
    qb.push(", updatedby_userid = ");
    qb.push_bind(actor_id);
    if let Some(name) = &changes.name {
        qb.push(", name = ");
        qb.push_bind(name.clone());
    }
    if let Some(username) = &changes.username {
        qb.push(", username = ");
        qb.push_bind(username.clone());
    }
    if let Some(email) = &changes.email {
        qb.push(", email = ");
        qb.push_bind(email.clone());
    }
    if let Some(phone) = &changes.phone {
        qb.push(", phone = ");
        qb.push_bind(phone.clone());
    }
    if let Some(org_id) = changes.org_id {
        qb.push(", org_id = ");
        qb.push_bind(org_id);
    }
    if let Some(status) = changes.status {
        qb.push(", is_active = ");
        qb.push_bind(status);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Single delete is soft: the row drops out of listings but keeps its
/// history and foreign keys intact.
pub async fn soft_delete(pool: &PgPool, id: i64, actor_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET is_active = $2, updatedby_userid = $3, updated_at = now()
         WHERE id = $1 AND is_active = $4",
    )
    .bind(id)
    .bind(Status::Inactive)
    .bind(actor_id)
    .bind(Status::Active)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Bulk removal sets the sentinel status and stamps the acting user, as one
/// atomic multi-row write.
pub async fn bulk_remove(pool: &PgPool, ids: &[i64], actor_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET is_active = $2, updatedby_userid = $3, updated_at = now()
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .bind(Status::Removed)
    .bind(actor_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
