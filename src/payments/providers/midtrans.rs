use crate::config::GatewayConfig;
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::provider::PaymentGateway;
use crate::payments::qr::{actions_from_response, extract_qr_url};
use crate::payments::types::{
    ChargeResult, ChargeSpec, GatewayEnvironment, PaymentArtifact, PaymentFlow, StatusResult,
    TransactionStatus,
};
use crate::payments::utils::{json_field_as_string, GatewayReply, PaymentHttpClient};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{info, warn};

pub const SANDBOX_API_BASE_URL: &str = "https://api.sandbox.midtrans.com";
pub const PRODUCTION_API_BASE_URL: &str = "https://api.midtrans.com";
pub const SANDBOX_SNAP_BASE_URL: &str = "https://app.sandbox.midtrans.com/snap";
pub const PRODUCTION_SNAP_BASE_URL: &str = "https://app.midtrans.com/snap";

#[derive(Debug, Clone)]
pub struct MidtransConfig {
    pub server_key: String,
    pub is_production: bool,
    pub api_base_url: String,
    pub snap_base_url: String,
    pub timeout_secs: u64,
}

impl Default for MidtransConfig {
    fn default() -> Self {
        Self {
            server_key: String::new(),
            is_production: false,
            api_base_url: SANDBOX_API_BASE_URL.to_string(),
            snap_base_url: SANDBOX_SNAP_BASE_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

impl From<&GatewayConfig> for MidtransConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            server_key: config.server_key.clone(),
            is_production: config.is_production,
            api_base_url: config.api_base_url(),
            snap_base_url: config.snap_base_url(),
            timeout_secs: config.timeout_secs,
        }
    }
}

pub struct MidtransProvider {
    config: MidtransConfig,
    http: PaymentHttpClient,
}

impl MidtransProvider {
    pub fn new(config: MidtransConfig) -> PaymentResult<Self> {
        let http = PaymentHttpClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { config, http })
    }

    fn api_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    fn snap_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.snap_base_url.trim_end_matches('/'), path)
    }

    async fn charge_qris(&self, spec: &ChargeSpec) -> PaymentResult<ChargeResult> {
        let payload = qris_charge_payload(spec);
        let reply = self
            .http
            .request_json(
                reqwest::Method::POST,
                &self.api_endpoint("/v2/charge"),
                &self.config.server_key,
                Some(&payload),
            )
            .await?;
        let result = normalize_charge_reply(reply)?;
        info!(
            order_id = %spec.order_id,
            gross_amount = spec.gross_amount,
            has_artifact = result.artifact.is_some(),
            "midtrans qris charge created"
        );
        Ok(result)
    }

    async fn create_snap_token(&self, spec: &ChargeSpec) -> PaymentResult<ChargeResult> {
        let payload = snap_transaction_payload(spec);
        let reply = self
            .http
            .request_json(
                reqwest::Method::POST,
                &self.snap_endpoint("/v1/transactions"),
                &self.config.server_key,
                Some(&payload),
            )
            .await?;
        let result = normalize_snap_reply(reply)?;
        info!(
            order_id = %spec.order_id,
            gross_amount = spec.gross_amount,
            has_artifact = result.artifact.is_some(),
            "midtrans snap token created"
        );
        Ok(result)
    }
}

#[async_trait]
impl PaymentGateway for MidtransProvider {
    async fn create_charge(&self, spec: ChargeSpec) -> PaymentResult<ChargeResult> {
        match spec.flow {
            PaymentFlow::Qris => self.charge_qris(&spec).await,
            PaymentFlow::Snap => self.create_snap_token(&spec).await,
            PaymentFlow::Unknown => Err(PaymentError::Rejected {
                message: "cannot create a charge without a payment flow".to_string(),
                status_code: None,
            }),
        }
    }

    async fn query_status(&self, order_id: &str) -> PaymentResult<StatusResult> {
        let reply = self
            .http
            .request_json(
                reqwest::Method::GET,
                &self.api_endpoint(&format!("/v2/{}/status", order_id)),
                &self.config.server_key,
                None,
            )
            .await?;
        normalize_status_reply(order_id, reply)
    }

    fn name(&self) -> &'static str {
        "midtrans"
    }

    fn environment(&self) -> GatewayEnvironment {
        if self.config.is_production {
            GatewayEnvironment::Production
        } else {
            GatewayEnvironment::Sandbox
        }
    }
}

fn transaction_details(spec: &ChargeSpec) -> JsonValue {
    serde_json::json!({
        "order_id": spec.order_id,
        "gross_amount": spec.gross_amount,
    })
}

pub fn qris_charge_payload(spec: &ChargeSpec) -> JsonValue {
    let mut payload = serde_json::json!({
        "payment_type": "qris",
        "transaction_details": transaction_details(spec),
        "item_details": spec.item_details,
        "custom_expiry": {
            "order_time": spec.expiry.formatted_start(),
            "expiry_duration": spec.expiry.duration_minutes,
            "unit": "minute",
        },
    });
    if let Some(acquirer) = spec.acquirer.as_deref().filter(|a| !a.trim().is_empty()) {
        payload["qris"] = serde_json::json!({ "acquirer": acquirer });
    }
    payload
}

pub fn snap_transaction_payload(spec: &ChargeSpec) -> JsonValue {
    serde_json::json!({
        "transaction_details": transaction_details(spec),
        "item_details": spec.item_details,
        "expiry": {
            "start_time": spec.expiry.formatted_start(),
            "unit": "minute",
            "duration": spec.expiry.duration_minutes,
        },
    })
}

/// Collects whatever human-readable error text the gateway sent.
fn gateway_message(body: &JsonValue) -> String {
    let mut parts = Vec::new();
    if let Some(message) = body.get("status_message").and_then(|v| v.as_str()) {
        parts.push(message.to_string());
    }
    for key in ["validation_messages", "error_messages"] {
        if let Some(messages) = body.get(key).and_then(|v| v.as_array()) {
            parts.extend(
                messages
                    .iter()
                    .filter_map(|m| m.as_str())
                    .map(|m| m.to_string()),
            );
        }
    }
    if parts.is_empty() {
        "gateway returned an error without a message".to_string()
    } else {
        parts.join("; ")
    }
}

fn is_success_code(code: &str) -> bool {
    code.starts_with('2')
}

fn rejected(status: StatusCode, body: &JsonValue) -> PaymentError {
    PaymentError::Rejected {
        message: gateway_message(body),
        status_code: Some(status.as_u16().to_string()),
    }
}

/// Core API charge replies arrive as HTTP 200 with the real outcome in the
/// body `status_code` (`201` on success).
pub fn normalize_charge_reply(reply: GatewayReply) -> PaymentResult<ChargeResult> {
    let GatewayReply { status, body } = reply;
    if status.is_client_error() {
        return Err(rejected(status, &body));
    }
    if let Some(code) = json_field_as_string(&body, "status_code") {
        if !is_success_code(&code) {
            warn!(status_code = %code, body = %body, "midtrans charge declined");
            return Err(PaymentError::from_gateway_code(&code, gateway_message(&body)));
        }
    }

    let artifact = extract_qr_url(&actions_from_response(&body))
        .map(|url| PaymentArtifact::QrUrl { url })
        .or_else(|| {
            body.get("qr_string")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(|value| PaymentArtifact::QrString {
                    value: value.to_string(),
                })
        });

    Ok(ChargeResult {
        artifact,
        raw: body,
    })
}

pub fn normalize_snap_reply(reply: GatewayReply) -> PaymentResult<ChargeResult> {
    let GatewayReply { status, body } = reply;
    if !status.is_success() {
        warn!(status = %status, body = %body, "midtrans snap request declined");
        return Err(rejected(status, &body));
    }

    let artifact = body
        .get("token")
        .and_then(|v| v.as_str())
        .filter(|t| !t.trim().is_empty())
        .map(|token| PaymentArtifact::SnapToken {
            token: token.to_string(),
            redirect_url: body
                .get("redirect_url")
                .and_then(|v| v.as_str())
                .map(|u| u.to_string()),
        });

    Ok(ChargeResult {
        artifact,
        raw: body,
    })
}

/// A body carrying `transaction_status` is always a status reply, whatever its
/// `status_code` (expired transactions report `407`).
pub fn normalize_status_reply(order_id: &str, reply: GatewayReply) -> PaymentResult<StatusResult> {
    let GatewayReply { status, body } = reply;

    if let Some(raw_status) = body.get("transaction_status").and_then(|v| v.as_str()) {
        return Ok(StatusResult {
            status: TransactionStatus::normalize(Some(raw_status)),
            raw: body,
        });
    }

    let code = json_field_as_string(&body, "status_code");
    if status == StatusCode::NOT_FOUND || code.as_deref() == Some("404") {
        return Err(PaymentError::NotFound {
            order_id: order_id.to_string(),
        });
    }
    if status.is_client_error() {
        return Err(rejected(status, &body));
    }
    if let Some(code) = code.filter(|c| !is_success_code(c)) {
        return Err(PaymentError::from_gateway_code(&code, gateway_message(&body)));
    }

    Ok(StatusResult {
        status: TransactionStatus::Unknown,
        raw: body,
    })
}
