use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::CheckoutState;
use crate::error::CheckoutError;
use crate::payments::utils::json_field_as_string;
use crate::services::transaction_orchestrator::Notification;

fn parse_notification(payload: &JsonValue) -> Result<Notification, &'static str> {
    let field = |name: &'static str| json_field_as_string(payload, name).ok_or(name);
    Ok(Notification {
        order_id: field("order_id")?,
        status_code: field("status_code")?,
        gross_amount: field("gross_amount")?,
        signature_key: field("signature_key")?,
    })
}

fn reply(status: StatusCode, received: bool) -> Response {
    (status, Json(serde_json::json!({ "received": received }))).into_response()
}

/// POST /midtrans/notification
///
/// Anything other than a 200 makes Midtrans redeliver the notification.
pub async fn handle_notification(
    State(state): State<Arc<CheckoutState>>,
    body: String,
) -> Response {
    let payload: JsonValue = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Invalid JSON notification payload");
            return reply(StatusCode::BAD_REQUEST, false);
        }
    };

    let notification = match parse_notification(&payload) {
        Ok(n) => n,
        Err(field) => {
            warn!(field, "Notification is missing a signed field");
            return reply(StatusCode::BAD_REQUEST, false);
        }
    };

    let order_id = notification.order_id.clone();
    info!(
        order_id = %order_id,
        status_code = %notification.status_code,
        transaction_status = payload.get("transaction_status").and_then(|v| v.as_str()).unwrap_or("-"),
        "Received notification"
    );

    match state.orchestrator.apply_notification(notification).await {
        Ok(snapshot) => {
            info!(
                order_id = %order_id,
                status = %snapshot.status,
                is_final = snapshot.is_final,
                "Notification processed successfully"
            );
            reply(StatusCode::OK, true)
        }
        Err(CheckoutError::Unauthorized { .. }) => {
            warn!(order_id = %order_id, "Invalid notification signature");
            reply(StatusCode::UNAUTHORIZED, false)
        }
        Err(e) => {
            error!(order_id = %order_id, error = %e, "Notification processing failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_fields_are_stringified_as_received() {
        let payload = json!({
            "order_id": "ORDER-1",
            "status_code": 200,
            "gross_amount": "10000.00",
            "signature_key": "abc"
        });
        let notification = parse_notification(&payload).unwrap();
        assert_eq!(notification.status_code, "200");
        assert_eq!(notification.gross_amount, "10000.00");
    }

    #[test]
    fn missing_field_is_reported() {
        let payload = json!({"order_id": "ORDER-1", "status_code": "200", "gross_amount": "1"});
        assert_eq!(parse_notification(&payload).unwrap_err(), "signature_key");
    }
}
