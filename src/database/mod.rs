//! Order persistence

pub mod order_store;

pub use order_store::{InMemoryOrderStore, Order, OrderStore, StoreError, StoreResult};
