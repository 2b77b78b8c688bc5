//! GET /partial/{view} and GET /partial/{view}/{order_id}

use crate::api::CheckoutState;
use crate::error::CheckoutError;
use crate::services::views::{render_fragment, ViewFragment};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

pub async fn render_view(
    State(state): State<Arc<CheckoutState>>,
    Path(view): Path<String>,
) -> Result<Json<ViewFragment>, CheckoutError> {
    render_fragment(&view, None, &state.views).map(Json)
}

pub async fn render_order_view(
    State(state): State<Arc<CheckoutState>>,
    Path((view, order_id)): Path<(String, String)>,
) -> Result<Json<ViewFragment>, CheckoutError> {
    let order = state.orchestrator.get_order(&order_id).await?;
    render_fragment(&view, Some(&order), &state.views).map(Json)
}
