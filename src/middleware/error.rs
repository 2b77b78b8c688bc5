//! Error response formatting
//!
//! Converts `CheckoutError` into the JSON body every endpoint uses for
//! failures, with the matching HTTP status code.

use crate::error::CheckoutError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Failure body returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Always `false`; lets the frontend branch on a single field
    pub ok: bool,

    /// Human-readable error message
    pub message: String,

    /// Machine-readable error code
    pub code: String,
}

impl ErrorResponse {
    pub fn from_checkout_error(error: &CheckoutError) -> Self {
        Self {
            ok: false,
            message: error.user_message(),
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        let status_code = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(
                error = %self,
                status = %status_code.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = %self,
                status = %status_code.as_u16(),
                "Client error occurred"
            );
        }

        let error_response = ErrorResponse::from_checkout_error(&self);
        (status_code, Json(error_response)).into_response()
    }
}
