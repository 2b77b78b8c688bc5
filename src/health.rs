//! Health check module
//! Provides health status for the application and its dependencies

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{error, info};

use crate::database::order_store::OrderStore;
use crate::payments::provider::PaymentGateway;
use crate::payments::types::GatewayEnvironment;

const STORE_PROBE_KEY: &str = "__health_probe__";

/// Health status response
#[derive(Debug, Serialize, Clone)]
pub struct HealthStatus {
    pub status: HealthState,
    pub checks: HashMap<String, ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Overall health state
#[derive(Debug, Serialize, Clone)]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health status
#[derive(Debug, Serialize, Clone)]
pub struct ComponentHealth {
    pub status: ComponentState,
    pub response_time_ms: Option<u128>,
    pub details: Option<String>,
}

/// Component state
#[derive(Debug, Serialize, Clone)]
pub enum ComponentState {
    Up,
    Down,
    Warning,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            status: HealthState::Healthy,
            checks: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        !matches!(self.status, HealthState::Unhealthy)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentHealth {
    pub fn up(response_time_ms: Option<u128>) -> Self {
        Self {
            status: ComponentState::Up,
            response_time_ms,
            details: None,
        }
    }

    pub fn down(details: Option<String>) -> Self {
        Self {
            status: ComponentState::Down,
            response_time_ms: None,
            details,
        }
    }

    pub fn warning(response_time_ms: Option<u128>, details: Option<String>) -> Self {
        Self {
            status: ComponentState::Warning,
            response_time_ms,
            details,
        }
    }
}

/// Health checker for the application
///
/// The gateway is not called on every probe; its entry reports which
/// environment requests are routed to.
#[derive(Clone)]
pub struct HealthChecker {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    store_timeout: Duration,
}

impl HealthChecker {
    pub fn new(store: Arc<dyn OrderStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            store,
            gateway,
            store_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Perform comprehensive health check
    pub async fn check_health(&self) -> HealthStatus {
        let mut health_status = HealthStatus::new();
        let mut overall_healthy = true;

        match timeout(self.store_timeout, check_store_health(self.store.as_ref())).await {
            Ok(Ok(response_time)) => {
                health_status.checks.insert(
                    "order_store".to_string(),
                    ComponentHealth::up(Some(response_time)),
                );
                info!("Order store health check: OK ({}ms)", response_time);
            }
            Ok(Err(e)) => {
                overall_healthy = false;
                health_status.checks.insert(
                    "order_store".to_string(),
                    ComponentHealth::down(Some(e.to_string())),
                );
                error!("Order store health check failed: {}", e);
            }
            Err(_) => {
                overall_healthy = false;
                health_status.checks.insert(
                    "order_store".to_string(),
                    ComponentHealth::down(Some("Timeout".to_string())),
                );
                error!("Order store health check timed out");
            }
        }

        let gateway = match self.gateway.environment() {
            GatewayEnvironment::Production => ComponentHealth::up(None),
            GatewayEnvironment::Sandbox => ComponentHealth::warning(
                None,
                Some(format!("{} sandbox environment", self.gateway.name())),
            ),
        };
        health_status.checks.insert("gateway".to_string(), gateway);

        health_status.status = if !overall_healthy {
            HealthState::Unhealthy
        } else if health_status
            .checks
            .values()
            .any(|c| matches!(c.status, ComponentState::Warning))
        {
            HealthState::Degraded
        } else {
            HealthState::Healthy
        };

        health_status
    }
}

pub async fn check_store_health(
    store: &dyn OrderStore,
) -> Result<u128, Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();

    match store.exists(STORE_PROBE_KEY).await {
        Ok(_) => Ok(start.elapsed().as_millis()),
        Err(e) => Err(Box::new(e)),
    }
}
