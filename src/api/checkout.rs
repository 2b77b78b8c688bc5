//! POST /api/{flow}/create and GET /api/{flow}/status/{order_id}

use crate::api::CheckoutState;
use crate::error::{CheckoutError, CheckoutResult};
use crate::payments::types::{PaymentArtifact, PaymentFlow, TransactionStatus};
use crate::services::transaction_orchestrator::CreateOrderInput;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub ok: bool,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub ok: bool,
    pub order_id: String,
    pub status: TransactionStatus,
    pub is_final: bool,
}

pub(crate) fn parse_flow(raw: &str) -> CheckoutResult<PaymentFlow> {
    PaymentFlow::from_str(raw).map_err(|_| CheckoutError::UnsupportedFlow {
        flow: raw.to_string(),
    })
}

/// Form posts send numbers as strings; both are accepted.
fn lenient_number(value: Option<&JsonValue>) -> Option<f64> {
    match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_create_body(body: &str) -> CheckoutResult<CreateOrderInput> {
    let payload: JsonValue = if body.trim().is_empty() {
        JsonValue::Object(Default::default())
    } else {
        serde_json::from_str(body).map_err(|e| CheckoutError::MalformedRequest {
            message: format!("Invalid JSON body: {}", e),
        })?
    };

    if !payload.is_object() {
        return Err(CheckoutError::MalformedRequest {
            message: "Request body must be a JSON object".to_string(),
        });
    }

    Ok(CreateOrderInput {
        item_name: payload
            .get("itemName")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        quantity: lenient_number(payload.get("qty")),
        unit_amount: lenient_number(payload.get("amount")),
        acquirer: payload
            .get("acquirer")
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

fn flow_matches(order_flow: PaymentFlow, requested: PaymentFlow) -> bool {
    order_flow == PaymentFlow::Unknown || order_flow == requested
}

/// POST /api/{flow}/create
pub async fn create_order(
    State(state): State<Arc<CheckoutState>>,
    Path(flow): Path<String>,
    body: String,
) -> Result<Json<CreateOrderResponse>, CheckoutError> {
    let flow = parse_flow(&flow)?;
    let input = parse_create_body(&body)?;

    info!(flow = %flow, "Creating order");
    let order = state.orchestrator.create_order(flow, input).await?;

    let (token, redirect_url) = match order.payment_artifact {
        Some(PaymentArtifact::SnapToken {
            token,
            redirect_url,
        }) => (Some(token), redirect_url),
        _ => (None, None),
    };

    Ok(Json(CreateOrderResponse {
        ok: true,
        order_id: order.order_id,
        token,
        redirect_url,
    }))
}

/// GET /api/{flow}/status/{order_id}
///
/// An order is only visible under the flow it was created with. Placeholder
/// orders recorded from notifications have no flow and answer under either.
pub async fn order_status(
    State(state): State<Arc<CheckoutState>>,
    Path((flow, order_id)): Path<(String, String)>,
) -> Result<Json<StatusResponse>, CheckoutError> {
    let flow = parse_flow(&flow)?;
    let order = state.orchestrator.get_order(&order_id).await?;
    if !flow_matches(order.flow, flow) {
        warn!(order_id = %order_id, requested = %flow, actual = %order.flow, "Status requested under the wrong flow");
        return Err(CheckoutError::NotFound { order_id });
    }

    let snapshot = state.orchestrator.refresh_status(&order_id).await?;

    Ok(Json(StatusResponse {
        ok: true,
        order_id: snapshot.order_id,
        status: snapshot.status,
        is_final: snapshot.is_final,
    }))
}
