pub mod midtrans;

pub use midtrans::{MidtransConfig, MidtransProvider};
