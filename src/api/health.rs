use crate::api::CheckoutState;
use crate::health::HealthStatus;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// GET /health
pub async fn health(State(state): State<Arc<CheckoutState>>) -> (StatusCode, Json<HealthStatus>) {
    info!("🏥 Health check requested");
    let status = state.health_checker.check_health().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
