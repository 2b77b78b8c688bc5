//! Services module for checkout business logic

pub mod transaction_orchestrator;
pub mod views;

// Re-export orchestrator types
pub use crate::services::transaction_orchestrator::{
    CreateOrderInput, Notification, OrchestratorConfig, StatusSnapshot, TransactionOrchestrator,
};
pub use crate::services::views::{render_fragment, ViewContext, ViewFragment};
