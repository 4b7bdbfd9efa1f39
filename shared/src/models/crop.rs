//! Crop catalogue models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A crop listed for sale by a producer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crop {
    pub id: String,
    pub producer_id: String,
    pub name: String,
    pub price_per_unit: Decimal,
    /// Sale unit, e.g. "kg" or "dozen"
    pub unit: String,
    pub quantity_available: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Crop {
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        i64::from(self.quantity_available) >= i64::from(quantity)
    }
}
