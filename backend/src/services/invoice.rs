//! Invoice rendering for placed orders

use rust_decimal::{Decimal, RoundingStrategy};
use shared::Order;

use crate::error::{AppError, AppResult};

fn money(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Render an order as a CSV invoice: one row per line, then the totals
pub fn render_invoice_csv(order: &Order, currency: &str) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let write_err = |e: csv::Error| AppError::Internal(format!("Invoice rendering failed: {}", e));

    let order_id = order.id.to_string();
    let order_date = order.created_at.format("%Y-%m-%d").to_string();

    writer
        .write_record(["Invoice", order_id.as_str()])
        .map_err(write_err)?;
    writer
        .write_record(["Date", order_date.as_str()])
        .map_err(write_err)?;
    writer
        .write_record(["Payment", order.payment_method.label()])
        .map_err(write_err)?;
    writer
        .write_record(["Line", "Product", "Quantity", "Unit price", "Amount"])
        .map_err(write_err)?;

    for (index, item) in order.items.iter().enumerate() {
        writer
            .write_record([
                (index + 1).to_string(),
                item.product_name.clone(),
                item.quantity.to_string(),
                money(item.unit_price),
                money(item.line_total()?),
            ])
            .map_err(write_err)?;
    }

    let breakdown = order.breakdown();
    let mut totals = vec![("Subtotal", breakdown.subtotal)];
    if order.payment_method.is_online() {
        totals.push(("Platform fee", breakdown.platform_fee));
        totals.push(("GST on platform fee", breakdown.gst_on_platform_fee));
    }
    if !breakdown.total_discount.is_zero() {
        totals.push(("Discount", -breakdown.total_discount));
    }
    totals.push(("Total payable", breakdown.final_payable_amount));

    for (label, amount) in totals {
        writer
            .write_record([label, money(amount).as_str(), currency])
            .map_err(write_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Invoice rendering failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}
