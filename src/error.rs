//! Error taxonomy for the checkout core
//!
//! Every failure an order operation can produce, with its HTTP status,
//! machine-readable code and the message that is safe to show to clients.

use crate::database::order_store::StoreError;
use crate::payments::error::PaymentError;
use thiserror::Error;

pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Unsupported payment flow: {flow}")]
    UnsupportedFlow { flow: String },

    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Gateway rejected request: {message}")]
    GatewayRejected {
        message: String,
        status_code: Option<String>,
    },

    #[error("Gateway unavailable: {message}")]
    GatewayUnavailable { message: String },

    #[error("Gateway returned no usable payment artifact for order {order_id}")]
    ArtifactMissing { order_id: String },

    #[error("Order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("Unknown view: {view}")]
    UnknownView { view: String },

    #[error("View {view} requires an order id")]
    OrderRequired { view: String },

    #[error("Invalid notification signature for order {order_id}")]
    Unauthorized { order_id: String },

    #[error("Order store error: {message}")]
    Storage { message: String },
}

impl CheckoutError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            CheckoutError::InvalidAmount { .. } => 400,
            CheckoutError::UnsupportedFlow { .. } => 400,
            CheckoutError::MalformedRequest { .. } => 400,
            CheckoutError::Unauthorized { .. } => 401,
            CheckoutError::NotFound { .. } => 404,
            CheckoutError::UnknownView { .. } => 404,
            CheckoutError::OrderRequired { .. } => 404,
            CheckoutError::GatewayRejected { .. } => 500,
            CheckoutError::ArtifactMissing { .. } => 500,
            CheckoutError::Storage { .. } => 500,
            CheckoutError::GatewayUnavailable { .. } => 503,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CheckoutError::InvalidAmount { .. } => "INVALID_AMOUNT",
            CheckoutError::UnsupportedFlow { .. } => "UNSUPPORTED_FLOW",
            CheckoutError::MalformedRequest { .. } => "MALFORMED_REQUEST",
            CheckoutError::GatewayRejected { .. } => "GATEWAY_REJECTED",
            CheckoutError::GatewayUnavailable { .. } => "GATEWAY_UNAVAILABLE",
            CheckoutError::ArtifactMissing { .. } => "ARTIFACT_MISSING",
            CheckoutError::NotFound { .. } => "NOT_FOUND",
            CheckoutError::UnknownView { .. } => "UNKNOWN_VIEW",
            CheckoutError::OrderRequired { .. } => "ORDER_REQUIRED",
            CheckoutError::Unauthorized { .. } => "UNAUTHORIZED",
            CheckoutError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::GatewayUnavailable { .. } | CheckoutError::Storage { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::InvalidAmount { message } => message.clone(),
            CheckoutError::UnsupportedFlow { flow } => {
                format!("Payment flow '{}' is not supported", flow)
            }
            CheckoutError::MalformedRequest { message } => message.clone(),
            CheckoutError::GatewayRejected { message, .. } => {
                format!("Payment gateway rejected the transaction: {}", message)
            }
            CheckoutError::GatewayUnavailable { .. } => {
                "Payment gateway is temporarily unavailable".to_string()
            }
            CheckoutError::ArtifactMissing { .. } => {
                "Payment gateway did not return a usable payment code".to_string()
            }
            CheckoutError::NotFound { .. } => "Order not found".to_string(),
            CheckoutError::UnknownView { view } => format!("View '{}' does not exist", view),
            CheckoutError::OrderRequired { view } => {
                format!("View '{}' needs an order id in the path", view)
            }
            CheckoutError::Unauthorized { .. } => "Invalid signature".to_string(),
            CheckoutError::Storage { .. } => "Failed to record the order".to_string(),
        }
    }
}

impl From<PaymentError> for CheckoutError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Rejected {
                message,
                status_code,
            } => CheckoutError::GatewayRejected {
                message,
                status_code,
            },
            PaymentError::Unavailable { message } => CheckoutError::GatewayUnavailable { message },
            PaymentError::NotFound { order_id } => CheckoutError::NotFound { order_id },
            PaymentError::InvalidResponse { message } => CheckoutError::GatewayRejected {
                message,
                status_code: None,
            },
        }
    }
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        CheckoutError::Storage {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_http_status_mapping_is_correct() {
        assert_eq!(
            CheckoutError::InvalidAmount {
                message: "too small".to_string()
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            CheckoutError::Unauthorized {
                order_id: "o".to_string()
            }
            .http_status_code(),
            401
        );
        assert_eq!(
            CheckoutError::NotFound {
                order_id: "o".to_string()
            }
            .http_status_code(),
            404
        );
        assert_eq!(
            CheckoutError::ArtifactMissing {
                order_id: "o".to_string()
            }
            .http_status_code(),
            500
        );
        assert_eq!(
            CheckoutError::GatewayUnavailable {
                message: "timeout".to_string()
            }
            .http_status_code(),
            503
        );
    }

    #[test]
    fn gateway_errors_convert() {
        let err: CheckoutError = PaymentError::Unavailable {
            message: "timeout".to_string(),
        }
        .into();
        assert!(matches!(err, CheckoutError::GatewayUnavailable { .. }));
        assert!(err.is_retryable());

        let err: CheckoutError = PaymentError::Rejected {
            message: "gross_amount mismatch".to_string(),
            status_code: Some("400".to_string()),
        }
        .into();
        assert!(!err.is_retryable());
        assert!(err.user_message().contains("gross_amount mismatch"));
    }

    #[test]
    fn unavailable_message_hides_upstream_detail() {
        let err = CheckoutError::GatewayUnavailable {
            message: "connect to 10.0.0.3:443 refused".to_string(),
        };
        assert!(!err.user_message().contains("10.0.0.3"));
    }
}
