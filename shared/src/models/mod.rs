//! Domain models for the GreenBasket marketplace

mod crop;
mod offer;
mod order;

pub use crop::*;
pub use offer::*;
pub use order::*;
