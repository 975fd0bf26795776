use axum::extract::State;
use axum::Json;

use crate::model::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: state.manager().health().await,
    })
}
