use thiserror::Error;

pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    #[error("Gateway rejected request: {message}")]
    Rejected {
        message: String,
        status_code: Option<String>,
    },

    #[error("Gateway unavailable: {message}")]
    Unavailable { message: String },

    #[error("Transaction not found at gateway: {order_id}")]
    NotFound { order_id: String },

    #[error("Invalid gateway response: {message}")]
    InvalidResponse { message: String },
}

impl PaymentError {
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Rejected { .. } => false,
            PaymentError::Unavailable { .. } => true,
            PaymentError::NotFound { .. } => false,
            PaymentError::InvalidResponse { .. } => false,
        }
    }

    /// Classifies a Midtrans `status_code` (HTTP-like, carried as a string in
    /// response bodies) that signals failure.
    pub fn from_gateway_code(code: &str, message: String) -> Self {
        match code.parse::<u16>() {
            Ok(c) if c >= 500 => PaymentError::Unavailable { message },
            _ => PaymentError::Rejected {
                message,
                status_code: Some(code.to_string()),
            },
        }
    }
}
