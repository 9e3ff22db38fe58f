use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::gate::{DeleteCities, Gate};
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct MassDestroyRequest {
    pub ids: Vec<i64>,
}

pub async fn mass_destroy(
    gate: Gate<DeleteCities>,
    State(state): State<SharedState>,
    Json(req): Json<MassDestroyRequest>,
) -> Result<StatusCode, AppError> {
    if req.ids.is_empty() {
        return Err(AppError::BadRequest("No ids supplied".to_string()));
    }

    let affected = db::cities::bulk_remove(&state.pool, &req.ids, gate.actor.user_id).await?;
    tracing::info!(affected, actor = gate.actor.user_id, "cities bulk-removed");

    Ok(StatusCode::NO_CONTENT)
}
