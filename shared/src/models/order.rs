//! Order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::pricing::{out_of_range, ChargeBreakdown, PricingError};
use crate::types::PaymentMethod;

/// A single cart or order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Result<Decimal, PricingError> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(out_of_range)
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Placed,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "placed" => Ok(OrderStatus::Placed),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// A placed order with the totals charged at placement time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub consumer_id: String,
    pub producer_id: String,
    pub items: Vec<OrderItem>,
    pub payment_method: PaymentMethod,
    pub applied_offer_ids: Vec<String>,
    pub subtotal: Decimal,
    pub platform_fee: Decimal,
    pub gst_on_platform_fee: Decimal,
    pub total_discount: Decimal,
    pub final_payable_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn breakdown(&self) -> ChargeBreakdown {
        ChargeBreakdown {
            subtotal: self.subtotal,
            platform_fee: self.platform_fee,
            gst_on_platform_fee: self.gst_on_platform_fee,
            total_before_discount: self.subtotal + self.platform_fee + self.gst_on_platform_fee,
            total_discount: self.total_discount,
            final_payable_amount: self.final_payable_amount,
        }
    }
}

/// Checkout request used both for quoting and for placing an order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub producer_id: String,
    #[validate(length(min = 1, message = "Cart is empty"))]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Offers picked from the applicable list
    #[serde(default)]
    pub offer_ids: Vec<String>,
    /// Code typed in manually by the consumer
    pub promo_code: Option<String>,
}
