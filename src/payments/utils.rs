use crate::payments::error::{PaymentError, PaymentResult};
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, warn};

/// Reply from the gateway: HTTP status plus the parsed JSON body.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub status: StatusCode,
    pub body: JsonValue,
}

/// Thin JSON client for the gateway. Every request is bounded by `timeout`
/// and is sent exactly once.
#[derive(Clone)]
pub struct PaymentHttpClient {
    client: Client,
    timeout: Duration,
}

impl PaymentHttpClient {
    pub fn new(timeout: Duration) -> PaymentResult<Self> {
        let client =
            Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| PaymentError::Unavailable {
                    message: format!("failed to initialize HTTP client: {}", e),
                })?;

        Ok(Self { client, timeout })
    }

    /// Sends a request authenticated with the gateway server key (HTTP basic,
    /// empty password).
    ///
    /// Transport failures, timeouts and 5xx replies map to
    /// [`PaymentError::Unavailable`]. 4xx replies are returned to the caller
    /// when the body is JSON so provider-specific messages can be extracted.
    pub async fn request_json(
        &self,
        method: reqwest::Method,
        url: &str,
        server_key: &str,
        body: Option<&JsonValue>,
    ) -> PaymentResult<GatewayReply> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .timeout(self.timeout)
            .basic_auth(server_key, Some(""))
            .header("Accept", "application/json");
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("gateway request timed out after {:?}", self.timeout)
            } else {
                format!("gateway request failed: {}", e)
            };
            warn!(method = %method, url = %url, error = %e, "gateway transport error");
            PaymentError::Unavailable { message }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Unavailable {
                message: format!("failed to read gateway response: {}", e),
            })?;
        debug!(method = %method, url = %url, status = %status, "gateway replied");

        if status.is_server_error() {
            return Err(PaymentError::Unavailable {
                message: format!("HTTP {}: {}", status, text),
            });
        }

        match serde_json::from_str::<JsonValue>(&text) {
            Ok(body) => Ok(GatewayReply { status, body }),
            Err(_) if status.is_client_error() => Err(PaymentError::Rejected {
                message: format!("HTTP {}: {}", status, text),
                status_code: Some(status.as_u16().to_string()),
            }),
            Err(e) => Err(PaymentError::InvalidResponse {
                message: format!("invalid gateway JSON response: {}", e),
            }),
        }
    }
}

/// Reads a field that the gateway may send either as a string or a number.
pub fn json_field_as_string(value: &JsonValue, field: &str) -> Option<String> {
    match value.get(field)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
