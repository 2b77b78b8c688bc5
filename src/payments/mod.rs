//! Payment gateway integration: adapter trait, Midtrans implementation and
//! notification signature checks.

pub mod error;
pub mod provider;
pub mod providers;
pub mod qr;
pub mod signature;
pub mod types;
pub mod utils;
