use crate::payments::types::{PaymentArtifact, PaymentFlow, TransactionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub flow: PaymentFlow,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub gross_amount: i64,
    pub status: TransactionStatus,
    /// `None` only for placeholders recorded from a notification.
    pub payment_artifact: Option<PaymentArtifact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_status_detail: Option<JsonValue>,
}

impl Order {
    pub fn pending(
        order_id: String,
        flow: PaymentFlow,
        item_name: String,
        quantity: u32,
        unit_price: f64,
        gross_amount: i64,
        payment_artifact: PaymentArtifact,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            flow,
            item_name,
            quantity,
            unit_price,
            gross_amount,
            status: TransactionStatus::Pending,
            payment_artifact: Some(payment_artifact),
            created_at: now,
            updated_at: now,
            last_status_detail: None,
        }
    }

    /// Minimal record for a notification about an order this process never created.
    pub fn placeholder(order_id: String, gross_amount: i64) -> Self {
        let now = Utc::now();
        Self {
            order_id,
            flow: PaymentFlow::Unknown,
            item_name: String::new(),
            quantity: 0,
            unit_price: 0.0,
            gross_amount,
            status: TransactionStatus::Unknown,
            payment_artifact: None,
            created_at: now,
            updated_at: now,
            last_status_detail: None,
        }
    }

    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("order store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed registry of orders. Writes always replace the whole record.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>>;

    async fn put(&self, order: Order) -> StoreResult<()>;

    async fn exists(&self, order_id: &str) -> StoreResult<bool>;
}

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn put(&self, order: Order) -> StoreResult<()> {
        self.orders
            .write()
            .await
            .insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn exists(&self, order_id: &str) -> StoreResult<bool> {
        Ok(self.orders.read().await.contains_key(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn order(id: &str) -> Order {
        Order::pending(
            id.to_string(),
            PaymentFlow::Qris,
            "Produk".to_string(),
            2,
            5000.0,
            10000,
            PaymentArtifact::QrUrl {
                url: "https://qr".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn put_then_get_returns_same_record() {
        let store = InMemoryOrderStore::new();
        assert!(!store.exists("ORDER-1").await.unwrap());

        store.put(order("ORDER-1")).await.unwrap();

        assert!(store.exists("ORDER-1").await.unwrap());
        let stored = store.get("ORDER-1").await.unwrap().expect("order stored");
        assert_eq!(stored.gross_amount, 10000);
        assert_eq!(stored.item_name, "Produk");
        assert_eq!(stored.status, TransactionStatus::Pending);
        assert!(store.get("ORDER-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_whole_record() {
        let store = InMemoryOrderStore::new();
        store.put(order("ORDER-1")).await.unwrap();

        let mut updated = store.get("ORDER-1").await.unwrap().unwrap();
        updated.status = TransactionStatus::Settlement;
        updated.last_status_detail = Some(serde_json::json!({"transaction_status": "settlement"}));
        store.put(updated.clone()).await.unwrap();

        assert_eq!(store.get("ORDER-1").await.unwrap(), Some(updated));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_writers_on_different_keys_all_land() {
        let store = Arc::new(InMemoryOrderStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.put(order(&format!("ORDER-{}", i))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 32);
    }

    #[test]
    fn placeholder_has_no_artifact_and_unknown_status() {
        let placeholder = Order::placeholder("ORDER-X".to_string(), 10000);
        assert_eq!(placeholder.flow, PaymentFlow::Unknown);
        assert!(placeholder.payment_artifact.is_none());
        assert!(!placeholder.is_final());
    }
}
