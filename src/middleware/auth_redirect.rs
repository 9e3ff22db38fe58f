use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

const LOGIN_PATH: &str = "/auth/login";

/// Turns 401 responses on the browser-facing routes into a redirect to the
/// sign-in page. Clients that explicitly ask for JSON keep the raw 401.
pub async fn redirect_unauthorized(req: Request, next: Next) -> Response {
    let wants_json = req
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    let response = next.run(req).await;
    if response.status() == StatusCode::UNAUTHORIZED && !wants_json {
        return Redirect::to(LOGIN_PATH).into_response();
    }
    response
}
