pub mod auth;
pub mod cities;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        // Auth views
        .route("/", get(auth::login_page))
        .route("/auth/login", get(auth::login_page))
        // Users
        .route("/admin/users", get(users::index).post(users::store))
        .route("/admin/users/create", get(users::create_page))
        .route(
            "/admin/users/{id}",
            get(users::show)
                .post(users::update)
                .put(users::update)
                .delete(users::destroy),
        )
        .route("/admin/users/{id}/edit", get(users::edit_page))
        // Cities
        .route("/admin/cities", get(cities::index).post(cities::store))
        .route("/admin/cities/create", get(cities::create_page))
        .route(
            "/admin/cities/{id}",
            axum::routing::post(cities::update)
                .put(cities::update)
                .delete(cities::destroy),
        )
        .route("/admin/cities/{id}/edit", get(cities::edit_page))
}

/// HTML selects submit an empty string for "no selection"; treat that as
/// absent rather than failing integer parsing.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Appends a page number to an already-encoded filter query string.
pub(crate) fn page_url(path: &str, filter_qs: &str, page: i64) -> String {
    if filter_qs.is_empty() {
        format!("{path}?page={page}")
    } else {
        format!("{path}?{filter_qs}&page={page}")
    }
}
