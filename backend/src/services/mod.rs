//! Business logic services for the GreenBasket server

pub mod checkout;
pub mod crop;
pub mod invoice;
pub mod offer;
pub mod order;

pub use checkout::CheckoutService;
pub use crop::CropService;
pub use offer::OfferService;
pub use order::OrderService;
