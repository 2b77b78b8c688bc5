#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, Router};
use http::{Request, StatusCode};
use qris_checkout::api::{self, CheckoutState};
use qris_checkout::database::InMemoryOrderStore;
use qris_checkout::health::HealthChecker;
use qris_checkout::payments::error::{PaymentError, PaymentResult};
use qris_checkout::payments::provider::PaymentGateway;
use qris_checkout::payments::signature::SignatureVerifier;
use qris_checkout::payments::types::{
    ChargeResult, ChargeSpec, GatewayEnvironment, PaymentArtifact, PaymentFlow, StatusResult,
    TransactionStatus,
};
use qris_checkout::services::transaction_orchestrator::{
    OrchestratorConfig, TransactionOrchestrator,
};
use qris_checkout::services::views::{ViewContext, POLL_INTERVAL_MS};
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

pub const SERVER_KEY: &str = "SB-Mid-server-integration";

/// Gateway double: fixed artifacts per flow and a status that tests can move.
pub struct FakeMidtrans {
    status: Mutex<PaymentResult<TransactionStatus>>,
    pub charges: Mutex<Vec<ChargeSpec>>,
    pub status_queries: Mutex<Vec<String>>,
}

impl FakeMidtrans {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(Ok(TransactionStatus::Pending)),
            charges: Mutex::new(Vec::new()),
            status_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, status: TransactionStatus) {
        *self.status.lock().unwrap() = Ok(status);
    }

    pub fn go_offline(&self) {
        *self.status.lock().unwrap() = Err(PaymentError::Unavailable {
            message: "connection timed out".to_string(),
        });
    }
}

#[async_trait]
impl PaymentGateway for FakeMidtrans {
    async fn create_charge(&self, spec: ChargeSpec) -> PaymentResult<ChargeResult> {
        let artifact = match spec.flow {
            PaymentFlow::Snap => PaymentArtifact::SnapToken {
                token: format!("snap-{}", spec.order_id),
                redirect_url: Some(format!(
                    "https://app.sandbox.midtrans.com/snap/v4/redirection/snap-{}",
                    spec.order_id
                )),
            },
            _ => PaymentArtifact::QrUrl {
                url: format!(
                    "https://api.sandbox.midtrans.com/v2/qris/{}/qr-code",
                    spec.order_id
                ),
            },
        };
        self.charges.lock().unwrap().push(spec);
        Ok(ChargeResult {
            artifact: Some(artifact),
            raw: serde_json::json!({"status_code": "201"}),
        })
    }

    async fn query_status(&self, order_id: &str) -> PaymentResult<StatusResult> {
        self.status_queries.lock().unwrap().push(order_id.to_string());
        let status = self.status.lock().unwrap().clone()?;
        Ok(StatusResult {
            status,
            raw: serde_json::json!({
                "order_id": order_id,
                "transaction_status": status.as_str(),
            }),
        })
    }

    fn name(&self) -> &'static str {
        "fake-midtrans"
    }

    fn environment(&self) -> GatewayEnvironment {
        GatewayEnvironment::Sandbox
    }
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<FakeMidtrans>,
    pub store: Arc<InMemoryOrderStore>,
}

pub fn build_app() -> TestApp {
    build_app_with(OrchestratorConfig::default())
}

pub fn build_app_with(config: OrchestratorConfig) -> TestApp {
    let gateway = Arc::new(FakeMidtrans::new());
    let store = Arc::new(InMemoryOrderStore::new());
    let orchestrator = Arc::new(TransactionOrchestrator::new(
        store.clone(),
        gateway.clone(),
        SignatureVerifier::new(SERVER_KEY),
        config.clone(),
    ));
    let state = Arc::new(CheckoutState {
        orchestrator,
        views: ViewContext {
            min_amount: config.min_amount,
            client_key: Some("SB-Mid-client-integration".to_string()),
            snap_js_url: "https://app.sandbox.midtrans.com/snap/snap.js".to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
        },
        health_checker: HealthChecker::new(store.clone(), gateway.clone()),
    });

    TestApp {
        router: api::router(state),
        gateway,
        store,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, JsonValue) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn signed_notification(order_id: &str, status_code: &str, gross_amount: &str) -> JsonValue {
    let signature = SignatureVerifier::new(SERVER_KEY).sign(order_id, status_code, gross_amount);
    serde_json::json!({
        "order_id": order_id,
        "status_code": status_code,
        "gross_amount": gross_amount,
        "signature_key": signature,
        "transaction_status": "settlement",
    })
}
