//! HTTP handlers for the GreenBasket API

pub mod checkout;
pub mod crop;
pub mod health;
pub mod offer;
pub mod order;

pub use checkout::*;
pub use crop::*;
pub use health::*;
pub use offer::*;
pub use order::*;
