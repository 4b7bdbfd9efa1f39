//! Shared types and checkout logic for the GreenBasket marketplace
//!
//! This crate contains the domain records and the order pricing core shared
//! between the backend, the client (via WASM), and other components.

pub mod checkout;
pub mod coupon;
pub mod decode;
pub mod models;
pub mod pricing;
pub mod types;
pub mod validation;

pub use checkout::*;
pub use coupon::*;
pub use decode::*;
pub use models::*;
pub use pricing::*;
pub use types::*;
pub use validation::*;
