use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::header::REFERER;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::gate::{CreateUsers, DeleteUsers, Gate, ReadUsers, ShowUsers, UpdateUsers};
use crate::auth::password;
use crate::db;
use crate::error::{AppError, FieldError};
use crate::flash;
use crate::listing::Page;
use crate::models::{User, UserRow};
use crate::options::{mark_selected, OptionItem};
use crate::state::SharedState;
use crate::views::page_url;

#[derive(Template)]
#[template(path = "users/index.html")]
struct UsersIndexTemplate {
    flash: Option<String>,
    search: String,
    page: Page<UserRow>,
    prev_url: Option<String>,
    next_url: Option<String>,
}

#[derive(Template)]
#[template(path = "users/create.html")]
struct UserCreateTemplate {
    orgs: Vec<OptionItem>,
    roles: Vec<OptionItem>,
}

#[derive(Template)]
#[template(path = "users/show.html")]
struct UserShowTemplate {
    user: UserRow,
}

#[derive(Template)]
#[template(path = "users/edit.html")]
struct UserEditTemplate {
    user: User,
    orgs: Vec<OptionItem>,
    roles: Vec<OptionItem>,
}

#[derive(Deserialize)]
pub struct IndexParams {
    pub s: Option<String>,
    pub page: Option<i64>,
}

pub async fn index(
    _gate: Gate<ReadUsers>,
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, AppError> {
    let (jar, flash) = flash::take(jar);
    let search = params.s.clone().unwrap_or_default();

    let page = db::users::list(
        &state.pool,
        params.s.as_deref(),
        state.pager,
        params.page.unwrap_or(1),
    )
    .await?;

    let mut qs = form_urlencoded::Serializer::new(String::new());
    if !search.trim().is_empty() {
        qs.append_pair("s", &search);
    }
    let filter_qs = qs.finish();

    let prev_url = page
        .has_prev()
        .then(|| page_url("/admin/users", &filter_qs, page.page - 1));
    let next_url = page
        .has_next()
        .then(|| page_url("/admin/users", &filter_qs, page.page + 1));

    let template = UsersIndexTemplate {
        flash,
        search,
        page,
        prev_url,
        next_url,
    };
    Ok((jar, Html(template.render().unwrap_or_default())))
}

pub async fn create_page(
    _gate: Gate<CreateUsers>,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let orgs = db::orgs::options(&state.pool).await?;
    let roles = db::roles::options(&state.pool).await?;

    let template = UserCreateTemplate { orgs, roles };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn show(
    _gate: Gate<ShowUsers>,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = db::users::find_row_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let template = UserShowTemplate { user };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn edit_page(
    _gate: Gate<UpdateUsers>,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let current_role = db::roles::role_for_user(&state.pool, id).await?;

    let selected_org: Vec<i64> = user.org_id.into_iter().collect();
    let selected_role: Vec<i64> = current_role.map(|r| r.id).into_iter().collect();

    let orgs = mark_selected(db::orgs::options(&state.pool).await?, &selected_org);
    let roles = mark_selected(db::roles::options(&state.pool).await?, &selected_role);

    let template = UserEditTemplate { user, orgs, roles };
    Ok(Html(template.render().unwrap_or_default()))
}

#[derive(Deserialize)]
pub struct StoreUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    #[serde(default, deserialize_with = "crate::views::empty_as_none")]
    pub org_id: Option<i64>,
    pub role_id: i64,
}

fn validate_store(req: &StoreUser) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push(FieldError {
            field: "name",
            message: "Name is required".to_string(),
        });
    }
    if req.username.trim().is_empty() {
        errors.push(FieldError {
            field: "username",
            message: "Username is required".to_string(),
        });
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        errors.push(FieldError {
            field: "email",
            message: "A valid email is required".to_string(),
        });
    }
    if req.password.len() < 8 {
        errors.push(FieldError {
            field: "password",
            message: "Password must be at least 8 characters".to_string(),
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub async fn store(
    gate: Gate<CreateUsers>,
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(req): Form<StoreUser>,
) -> Result<(CookieJar, Redirect), AppError> {
    validate_store(&req)?;

    // Resolve the references up front so a bad id fails before anything
    // persists.
    let role = db::roles::find_by_id(&state.pool, req.role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?;

    if let Some(org_id) = req.org_id {
        db::orgs::find_by_id(&state.pool, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Org not found".to_string()))?;
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let phone = req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

    let user = db::users::create(
        &state.pool,
        req.org_id,
        &req.name,
        &req.username,
        &req.email,
        phone,
        &pw_hash,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A user with this username already exists".to_string())
        }
        _ => AppError::Database(e),
    })?;

    // Role binding is by name, through the membership table.
    db::roles::sync_for_user(&state.pool, user.id, &role.name).await?;

    tracing::info!(user_id = user.id, actor = gate.actor.user_id, "user created");

    Ok((
        flash::set(jar, "User created"),
        Redirect::to("/admin/users"),
    ))
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "crate::views::empty_as_none")]
    pub org_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::views::empty_as_none")]
    pub role_id: Option<i64>,
}

fn validate_update(req: &UpdateUser) -> Result<(), AppError> {
    let mut errors = Vec::new();
    if matches!(&req.name, Some(name) if name.trim().is_empty()) {
        errors.push(FieldError {
            field: "name",
            message: "Name cannot be blank".to_string(),
        });
    }
    if matches!(&req.username, Some(username) if username.trim().is_empty()) {
        errors.push(FieldError {
            field: "username",
            message: "Username cannot be blank".to_string(),
        });
    }
    if matches!(&req.email, Some(email) if email.trim().is_empty() || !email.contains('@')) {
        errors.push(FieldError {
            field: "email",
            message: "A valid email is required".to_string(),
        });
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Partial update: only fields present in the payload are written.
pub async fn update(
    gate: Gate<UpdateUsers>,
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(req): Form<UpdateUser>,
) -> Result<(CookieJar, Redirect), AppError> {
    validate_update(&req)?;

    db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let role = match req.role_id {
        Some(role_id) => Some(
            db::roles::find_by_id(&state.pool, role_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Role not found".to_string()))?,
        ),
        None => None,
    };

    if let Some(org_id) = req.org_id {
        db::orgs::find_by_id(&state.pool, org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Org not found".to_string()))?;
    }

    let changes = db::users::UserChanges {
        name: req.name,
        username: req.username,
        email: req.email,
        phone: req.phone,
        org_id: req.org_id,
        status: None,
    };
    if !changes.is_empty() {
        db::users::update(&state.pool, id, &changes, gate.actor.user_id).await?;
    }

    if let Some(role) = role {
        db::roles::sync_for_user(&state.pool, id, &role.name).await?;
    }

    Ok((
        flash::set(jar, "User updated"),
        Redirect::to("/admin/users"),
    ))
}

pub async fn destroy(
    gate: Gate<DeleteUsers>,
    State(state): State<SharedState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    let affected = db::users::soft_delete(&state.pool, id, gate.actor.user_id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    // Return to the page the delete was issued from.
    let back = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/admin/users")
        .to_string();

    Ok((flash::set(jar, "User deleted"), Redirect::to(&back)))
}
