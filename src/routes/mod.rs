pub mod auth;
pub mod cities;
pub mod states;
pub mod users;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        // Dependent options for the cities search form
        .route("/api/v1/states/options", get(states::options))
        // Bulk status updates, invoked from the datatable toolbar
        .route("/api/v1/users", delete(users::mass_destroy))
        .route("/api/v1/cities", delete(cities::mass_destroy))
}
