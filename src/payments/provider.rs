use crate::payments::error::PaymentResult;
use crate::payments::types::{ChargeResult, ChargeSpec, GatewayEnvironment, StatusResult};
use async_trait::async_trait;

/// Outbound operations against the payment gateway.
///
/// Implementations normalize the gateway's wire format; callers only ever see
/// [`ChargeResult`] and [`StatusResult`].
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_charge(&self, spec: ChargeSpec) -> PaymentResult<ChargeResult>;

    async fn query_status(&self, order_id: &str) -> PaymentResult<StatusResult>;

    fn name(&self) -> &'static str;

    fn environment(&self) -> GatewayEnvironment;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::error::PaymentError;
    use crate::payments::types::{ExpiryPolicy, PaymentArtifact, PaymentFlow, TransactionStatus};

    struct MockGateway;

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_charge(&self, spec: ChargeSpec) -> PaymentResult<ChargeResult> {
            Ok(ChargeResult {
                artifact: Some(PaymentArtifact::QrUrl {
                    url: format!("https://example.com/qr/{}", spec.order_id),
                }),
                raw: serde_json::json!({"status_code": "201"}),
            })
        }

        async fn query_status(&self, order_id: &str) -> PaymentResult<StatusResult> {
            if order_id == "missing" {
                return Err(PaymentError::NotFound {
                    order_id: order_id.to_string(),
                });
            }
            Ok(StatusResult {
                status: TransactionStatus::Pending,
                raw: serde_json::json!({"transaction_status": "pending"}),
            })
        }

        fn name(&self) -> &'static str {
            "mock"
        }

        fn environment(&self) -> GatewayEnvironment {
            GatewayEnvironment::Sandbox
        }
    }

    #[tokio::test]
    async fn trait_can_be_implemented_by_mock_gateway() {
        let gateway: Box<dyn PaymentGateway> = Box::new(MockGateway);
        let charge = gateway
            .create_charge(ChargeSpec {
                order_id: "ORDER-1".to_string(),
                gross_amount: 10000,
                item_details: vec![],
                expiry: ExpiryPolicy::starting_now(15),
                flow: PaymentFlow::Qris,
                acquirer: None,
            })
            .await
            .expect("charge should succeed");
        assert_eq!(
            charge.artifact,
            Some(PaymentArtifact::QrUrl {
                url: "https://example.com/qr/ORDER-1".to_string()
            })
        );

        let status = gateway
            .query_status("ORDER-1")
            .await
            .expect("status should succeed");
        assert_eq!(status.status, TransactionStatus::Pending);
        assert!(matches!(
            gateway.query_status("missing").await,
            Err(PaymentError::NotFound { .. })
        ));
    }
}
