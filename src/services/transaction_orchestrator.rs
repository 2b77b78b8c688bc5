//! Transaction Orchestrator
//!
//! Owns every code path that writes an order's status: creation, client
//! polling and verified gateway notifications. Gateway calls are made without
//! holding any store lock; each write replaces a complete order record.

use crate::config::CheckoutConfig;
use crate::database::order_store::{Order, OrderStore};
use crate::error::{CheckoutError, CheckoutResult};
use crate::payments::provider::PaymentGateway;
use crate::payments::signature::SignatureVerifier;
use crate::payments::types::{
    ChargeSpec, ExpiryPolicy, ItemDetail, PaymentFlow, StatusResult, TransactionStatus,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const DEFAULT_ITEM_NAME: &str = "Produk";
pub const ITEM_NAME_MAX_LEN: usize = 50;
const MAX_GROSS_AMOUNT: f64 = 1_000_000_000_000_000.0;

// ============================================================================
// Configuration Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Smallest accepted unit amount, in whole currency units
    pub min_amount: i64,
    /// Payment window handed to the gateway
    pub expiry_minutes: u32,
    /// Keep a final status even when a later signal reports something else
    pub reject_terminal_regression: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_amount: 1000,
            expiry_minutes: 15,
            reject_terminal_regression: false,
        }
    }
}

impl From<&CheckoutConfig> for OrchestratorConfig {
    fn from(config: &CheckoutConfig) -> Self {
        Self {
            min_amount: config.min_amount,
            expiry_minutes: config.expiry_minutes,
            reject_terminal_regression: config.reject_terminal_regression,
        }
    }
}

// ============================================================================
// Request / Result Types
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CreateOrderInput {
    pub item_name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_amount: Option<f64>,
    /// QRIS acquirer hint forwarded to the gateway
    pub acquirer: Option<String>,
}

/// Fields of a gateway notification that take part in the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub order_id: String,
    pub status: TransactionStatus,
    pub is_final: bool,
}

impl StatusSnapshot {
    fn of(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            status: order.status,
            is_final: order.is_final(),
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

pub struct TransactionOrchestrator {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    verifier: SignatureVerifier,
    config: OrchestratorConfig,
}

impl TransactionOrchestrator {
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        verifier: SignatureVerifier,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            verifier,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// `ORDER-{unix millis}-{12 hex chars of a v4 UUID}`
    pub fn generate_order_id() -> String {
        let entropy = Uuid::new_v4().simple().to_string();
        format!("ORDER-{}-{}", Utc::now().timestamp_millis(), &entropy[..12])
    }

    /// Creates the gateway transaction and records the order as `pending`.
    ///
    /// If a verified notification for the new id was recorded while the
    /// charge was in flight, its status is kept.
    ///
    /// Nothing is stored unless the gateway returned a usable payment
    /// artifact. Gateway errors are returned as-is, without retry.
    pub async fn create_order(
        &self,
        flow: PaymentFlow,
        input: CreateOrderInput,
    ) -> CheckoutResult<Order> {
        if flow == PaymentFlow::Unknown {
            return Err(CheckoutError::UnsupportedFlow {
                flow: flow.to_string(),
            });
        }

        let unit_amount = self.validate_amount(input.unit_amount)?;
        let quantity = coerce_quantity(input.quantity);
        let gross = (unit_amount * f64::from(quantity)).round();
        if gross > MAX_GROSS_AMOUNT {
            return Err(CheckoutError::InvalidAmount {
                message: "Amount is too large".to_string(),
            });
        }
        let gross_amount = gross as i64;
        let item_name = sanitize_item_name(input.item_name.as_deref());

        let order_id = Self::generate_order_id();
        let spec = ChargeSpec {
            order_id: order_id.clone(),
            gross_amount,
            item_details: item_details(&item_name, quantity, unit_amount, gross_amount),
            expiry: ExpiryPolicy::starting_now(self.config.expiry_minutes),
            flow,
            acquirer: input.acquirer,
        };

        let charge = self.gateway.create_charge(spec).await.map_err(|e| {
            error!(
                order_id = %order_id,
                flow = %flow,
                gross_amount,
                error = %e,
                "gateway charge failed"
            );
            CheckoutError::from(e)
        })?;

        let artifact = charge.artifact.ok_or_else(|| {
            error!(
                order_id = %order_id,
                flow = %flow,
                response = %charge.raw,
                "gateway charge succeeded without a payment artifact"
            );
            CheckoutError::ArtifactMissing {
                order_id: order_id.clone(),
            }
        })?;

        let created = Order::pending(
            order_id,
            flow,
            item_name,
            quantity,
            unit_amount,
            gross_amount,
            artifact,
        );
        // A notification may have landed while the charge was in flight.
        let order = match self.store.get(&created.order_id).await? {
            Some(existing) => {
                info!(
                    order_id = %created.order_id,
                    status = %existing.status,
                    "keeping status recorded before creation finished"
                );
                Order {
                    status: existing.status,
                    last_status_detail: existing.last_status_detail,
                    updated_at: existing.updated_at,
                    ..created
                }
            }
            None => created,
        };
        self.store.put(order.clone()).await?;

        info!(
            order_id = %order.order_id,
            flow = %flow,
            quantity = order.quantity,
            gross_amount = order.gross_amount,
            "order created"
        );
        Ok(order)
    }

    /// Polls the gateway for the authoritative status and records it.
    pub async fn refresh_status(&self, order_id: &str) -> CheckoutResult<StatusSnapshot> {
        if !self.store.exists(order_id).await? {
            return Err(CheckoutError::NotFound {
                order_id: order_id.to_string(),
            });
        }

        let result = self.query_gateway(order_id).await?;

        let current = self
            .store
            .get(order_id)
            .await?
            .ok_or_else(|| CheckoutError::NotFound {
                order_id: order_id.to_string(),
            })?;
        let updated = self.apply_status(current, result);
        self.store.put(updated.clone()).await?;

        Ok(StatusSnapshot::of(&updated))
    }

    /// Handles a gateway notification.
    ///
    /// The payload's own status is never trusted: after the signature check
    /// the status is re-queried from the gateway. Notifications for orders
    /// this process does not know about produce a placeholder record.
    pub async fn apply_notification(
        &self,
        notification: Notification,
    ) -> CheckoutResult<StatusSnapshot> {
        let Notification {
            order_id,
            status_code,
            gross_amount,
            signature_key,
        } = notification;

        if !self
            .verifier
            .verify(&order_id, &status_code, &gross_amount, &signature_key)
        {
            warn!(order_id = %order_id, status_code = %status_code, "notification signature mismatch");
            return Err(CheckoutError::Unauthorized { order_id });
        }

        let result = self.query_gateway(&order_id).await?;

        let current = match self.store.get(&order_id).await? {
            Some(order) => order,
            None => {
                info!(order_id = %order_id, "notification for unknown order, recording placeholder");
                Order::placeholder(order_id.clone(), parse_gross_amount(&gross_amount))
            }
        };
        let updated = self.apply_status(current, result);
        self.store.put(updated.clone()).await?;

        info!(
            order_id = %updated.order_id,
            status = %updated.status,
            is_final = updated.is_final(),
            "notification applied"
        );
        Ok(StatusSnapshot::of(&updated))
    }

    pub async fn get_order(&self, order_id: &str) -> CheckoutResult<Order> {
        self.store
            .get(order_id)
            .await?
            .ok_or_else(|| CheckoutError::NotFound {
                order_id: order_id.to_string(),
            })
    }

    fn validate_amount(&self, unit_amount: Option<f64>) -> CheckoutResult<f64> {
        let min = self.config.min_amount;
        match unit_amount {
            Some(amount) if amount.is_finite() && amount >= min as f64 => Ok(amount),
            _ => Err(CheckoutError::InvalidAmount {
                message: format!("Amount must be at least {}", min),
            }),
        }
    }

    async fn query_gateway(&self, order_id: &str) -> CheckoutResult<StatusResult> {
        self.gateway.query_status(order_id).await.map_err(|e| {
            error!(order_id = %order_id, error = %e, "gateway status query failed");
            CheckoutError::from(e)
        })
    }

    fn apply_status(&self, mut order: Order, result: StatusResult) -> Order {
        let previous = order.status;
        order.last_status_detail = Some(result.raw);
        order.updated_at = Utc::now();

        if self.config.reject_terminal_regression
            && previous.is_final()
            && result.status != previous
        {
            warn!(
                order_id = %order.order_id,
                stored = %previous,
                incoming = %result.status,
                "ignoring status change on a final order"
            );
            return order;
        }

        if previous != result.status {
            info!(
                order_id = %order.order_id,
                from = %previous,
                to = %result.status,
                "order status changed"
            );
        }
        order.status = result.status;
        order
    }
}

fn coerce_quantity(quantity: Option<f64>) -> u32 {
    match quantity {
        Some(q) if q.is_finite() && q >= 1.0 => q.floor().min(f64::from(u32::MAX)) as u32,
        _ => 1,
    }
}

fn sanitize_item_name(name: Option<&str>) -> String {
    let trimmed = name.map(str::trim).unwrap_or("");
    let name = if trimmed.is_empty() {
        DEFAULT_ITEM_NAME
    } else {
        trimmed
    };
    name.chars().take(ITEM_NAME_MAX_LEN).collect()
}

/// The gateway requires `sum(price * quantity) == gross_amount`. A fractional
/// unit amount cannot satisfy that per unit, so it is sent as one line.
fn item_details(name: &str, quantity: u32, unit_amount: f64, gross_amount: i64) -> Vec<ItemDetail> {
    let unit_price = unit_amount.round() as i64;
    if unit_price.checked_mul(i64::from(quantity)) == Some(gross_amount) {
        return vec![ItemDetail {
            id: "item-1".to_string(),
            price: unit_price,
            quantity,
            name: name.to_string(),
        }];
    }
    vec![ItemDetail {
        id: "item-1".to_string(),
        price: gross_amount,
        quantity: 1,
        name: format!("{} x{}", name, quantity)
            .chars()
            .take(ITEM_NAME_MAX_LEN)
            .collect(),
    }]
}

/// Notifications carry amounts such as `"10000.00"`.
fn parse_gross_amount(raw: &str) -> i64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= MAX_GROSS_AMOUNT)
        .map(|v| v.round() as i64)
        .unwrap_or(0)
}
