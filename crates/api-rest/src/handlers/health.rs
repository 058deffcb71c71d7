use crate::AppState;
use api_shared::{HealthRes, HealthService};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and store are up", body = HealthRes),
        (status = 500, description = "Store unreachable", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Round-trips a trivial query so that a broken store shows up here rather than on the
/// first real request.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthRes>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthService::check_health())),
        Err(e) => {
            tracing::error!("Health check error: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthService::store_unavailable(e)),
            )
        }
    }
}
