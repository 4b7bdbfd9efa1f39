//! Crop catalogue service

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{Crop, OrderItem};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};

/// Crop service for catalogue lookups
#[derive(Clone)]
pub struct CropService {
    db: PgPool,
}

/// Row for crop queries
#[derive(Debug, FromRow)]
struct CropRow {
    id: String,
    producer_id: String,
    name: String,
    price_per_unit: Decimal,
    unit: String,
    quantity_available: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CropRow> for Crop {
    fn from(row: CropRow) -> Self {
        Crop {
            id: row.id,
            producer_id: row.producer_id,
            name: row.name,
            price_per_unit: row.price_per_unit,
            unit: row.unit,
            quantity_available: row.quantity_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CROP_COLUMNS: &str =
    "id, producer_id, name, price_per_unit, unit, quantity_available, created_at, updated_at";

impl CropService {
    /// Create a new CropService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Crops listed by a producer
    pub async fn list_for_producer(&self, producer_id: &str) -> AppResult<Vec<Crop>> {
        let rows = sqlx::query_as::<_, CropRow>(&format!(
            "SELECT {} FROM crops WHERE producer_id = $1 ORDER BY name",
            CROP_COLUMNS
        ))
        .bind(producer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Crop::from).collect())
    }

    /// Crops referenced by a cart, keyed by id
    pub async fn find_for_cart(
        &self,
        producer_id: &str,
        items: &[OrderItem],
    ) -> AppResult<HashMap<String, Crop>> {
        let ids = product_ids(items);
        let rows = sqlx::query_as::<_, CropRow>(&format!(
            "SELECT {} FROM crops WHERE producer_id = $1 AND id = ANY($2)",
            CROP_COLUMNS
        ))
        .bind(producer_id)
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        Ok(into_map(rows))
    }

    /// Same as [`CropService::find_for_cart`] but locks the rows for the transaction
    pub async fn lock_for_cart(
        tx: &mut Transaction<'_, Postgres>,
        producer_id: &str,
        items: &[OrderItem],
    ) -> AppResult<HashMap<String, Crop>> {
        let ids = product_ids(items);
        let rows = sqlx::query_as::<_, CropRow>(&format!(
            "SELECT {} FROM crops WHERE producer_id = $1 AND id = ANY($2) ORDER BY id FOR UPDATE",
            CROP_COLUMNS
        ))
        .bind(producer_id)
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(into_map(rows))
    }

    /// Decrement stock for a crop inside the order transaction
    pub async fn take_stock(
        tx: &mut Transaction<'_, Postgres>,
        crop_id: &str,
        quantity: u32,
    ) -> AppResult<()> {
        let quantity = i32::try_from(quantity)
            .map_err(|_| AppError::ValidationError("Quantity too large".to_string()))?;
        sqlx::query(
            "UPDATE crops SET quantity_available = quantity_available - $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(crop_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn product_ids(items: &[OrderItem]) -> Vec<String> {
    let mut ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
    ids.sort();
    ids.dedup();
    ids
}

fn into_map(rows: Vec<CropRow>) -> HashMap<String, Crop> {
    rows.into_iter()
        .map(|row| (row.id.clone(), Crop::from(row)))
        .collect()
}

/// Replace client-supplied names and prices with catalogue values
pub fn price_items(items: &[OrderItem], crops: &HashMap<String, Crop>) -> AppResult<Vec<OrderItem>> {
    items
        .iter()
        .map(|item| {
            let crop = crops
                .get(&item.product_id)
                .ok_or_else(|| AppError::NotFound(format!("Crop {}", item.product_id)))?;
            Ok(OrderItem {
                product_id: crop.id.clone(),
                product_name: crop.name.clone(),
                quantity: item.quantity,
                unit_price: crop.price_per_unit,
            })
        })
        .collect()
}

/// Total requested quantity per crop; the same crop may appear on several lines
pub fn requested_quantities(items: &[OrderItem]) -> HashMap<&str, u32> {
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for item in items {
        let entry = totals.entry(item.product_id.as_str()).or_insert(0);
        *entry = entry.saturating_add(item.quantity);
    }
    totals
}

/// Fail on the first crop without enough stock
pub fn check_stock(items: &[OrderItem], crops: &HashMap<String, Crop>) -> AppResult<()> {
    for (crop_id, quantity) in requested_quantities(items) {
        let crop = crops
            .get(crop_id)
            .ok_or_else(|| AppError::NotFound(format!("Crop {}", crop_id)))?;
        if !crop.has_stock_for(quantity) {
            return Err(AppError::InsufficientStock(format!(
                "{}: requested {}, available {}",
                crop.name, quantity, crop.quantity_available
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(id: &str, name: &str, price: i64, stock: i32) -> Crop {
        Crop {
            id: id.to_string(),
            producer_id: "farm-1".to_string(),
            name: name.to_string(),
            price_per_unit: Decimal::from(price),
            unit: "kg".to_string(),
            quantity_available: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(id: &str, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: id.to_string(),
            product_name: "client name".to_string(),
            quantity,
            unit_price: Decimal::ONE,
        }
    }

    fn catalogue() -> HashMap<String, Crop> {
        [crop("c1", "Tomato", 40, 10), crop("c2", "Onion", 30, 3)]
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect()
    }

    #[test]
    fn test_price_items_uses_catalogue() {
        let priced = price_items(&[item("c1", 2)], &catalogue()).unwrap();
        assert_eq!(priced[0].product_name, "Tomato");
        assert_eq!(priced[0].unit_price, Decimal::from(40));
    }

    #[test]
    fn test_price_items_unknown_crop() {
        assert!(matches!(
            price_items(&[item("c9", 1)], &catalogue()),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_check_stock_sums_repeated_lines() {
        assert!(check_stock(&[item("c2", 2)], &catalogue()).is_ok());
        assert!(matches!(
            check_stock(&[item("c2", 2), item("c2", 2)], &catalogue()),
            Err(AppError::InsufficientStock(_))
        ));
    }
}
