//! HTTP boundary
//!
//! Routes decode requests, call the orchestrator and encode its results.
//! No handler writes order state itself.

pub mod checkout;
pub mod health;
pub mod partials;
pub mod webhooks;

use crate::health::HealthChecker;
use crate::services::transaction_orchestrator::TransactionOrchestrator;
use crate::services::views::ViewContext;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub struct CheckoutState {
    pub orchestrator: Arc<TransactionOrchestrator>,
    pub views: ViewContext,
    pub health_checker: HealthChecker,
}

pub fn router(state: Arc<CheckoutState>) -> Router {
    Router::new()
        .route("/api/{flow}/create", post(checkout::create_order))
        .route("/api/{flow}/status/{order_id}", get(checkout::order_status))
        .route("/midtrans/notification", post(webhooks::handle_notification))
        .route("/partial/{view}", get(partials::render_view))
        .route("/partial/{view}/{order_id}", get(partials::render_order_view))
        .route("/health", get(health::health))
        .with_state(state)
}
