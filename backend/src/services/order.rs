//! Order placement and history
//!
//! Placement runs as one sequence that stops at the first failure:
//! validate -> load offers -> lock and price crops -> check stock ->
//! resolve totals -> write stock and order -> commit -> signal the client.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    CheckoutRequest, Order, OrderItem, OrderStatus, PaginatedResponse, Pagination,
    PaginationMeta, PaymentMethod,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::events::{OrderEvent, OrderEventSender};
use crate::services::checkout::{build_session, validate_request};
use crate::services::crop::{check_stock, price_items, CropService};
use crate::services::offer::OfferService;

/// Order service for placing and reading orders
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
    offers: OfferService,
    events: OrderEventSender,
}

/// Row for order queries
#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    consumer_id: String,
    producer_id: String,
    payment_method: String,
    applied_offer_ids: Vec<String>,
    subtotal: Decimal,
    platform_fee: Decimal,
    gst_on_platform_fee: Decimal,
    total_discount: Decimal,
    final_payable_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

/// Row for order line queries
#[derive(Debug, FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: String,
    product_name: String,
    quantity: i32,
    unit_price: Decimal,
}

const ORDER_COLUMNS: &str = "id, consumer_id, producer_id, payment_method, applied_offer_ids, \
                             subtotal, platform_fee, gst_on_platform_fee, total_discount, \
                             final_payable_amount, status, created_at";

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> AppResult<Order> {
        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(AppError::Internal)?;

        Ok(Order {
            id: self.id,
            consumer_id: self.consumer_id,
            producer_id: self.producer_id,
            items,
            payment_method,
            applied_offer_ids: self.applied_offer_ids,
            subtotal: self.subtotal,
            platform_fee: self.platform_fee,
            gst_on_platform_fee: self.gst_on_platform_fee,
            total_discount: self.total_discount,
            final_payable_amount: self.final_payable_amount,
            status,
            created_at: self.created_at,
        })
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: u32::try_from(row.quantity).unwrap_or(0),
            unit_price: row.unit_price,
        }
    }
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool, events: OrderEventSender) -> Self {
        Self {
            offers: OfferService::new(db.clone()),
            db,
            events,
        }
    }

    /// Place an order for `consumer_id`
    pub async fn place_order(
        &self,
        consumer_id: &str,
        request: CheckoutRequest,
        today: NaiveDate,
    ) -> AppResult<Order> {
        match self.try_place_order(consumer_id, &request, today).await {
            Ok(order) => {
                self.signal(OrderEvent::Placed {
                    order_id: order.id,
                    consumer_id: order.consumer_id.clone(),
                    producer_id: order.producer_id.clone(),
                })
                .await;
                Ok(order)
            }
            Err(err) => {
                self.signal(OrderEvent::Rejected {
                    consumer_id: consumer_id.to_string(),
                    reason: err.to_string(),
                })
                .await;
                Err(err)
            }
        }
    }

    async fn try_place_order(
        &self,
        consumer_id: &str,
        request: &CheckoutRequest,
        today: NaiveDate,
    ) -> AppResult<Order> {
        validate_request(request)?;

        let offers = self.offers.list_for_producer(&request.producer_id).await?;

        let mut tx = self.db.begin().await?;

        let crops = CropService::lock_for_cart(&mut tx, &request.producer_id, &request.items).await?;
        let items = price_items(&request.items, &crops)?;
        check_stock(&items, &crops)?;

        let session = build_session(items, request, offers, today)?;
        let breakdown = session.breakdown()?;
        let applied_offer_ids: Vec<String> =
            session.selected_offers().iter().map(|o| o.id.clone()).collect();

        for item in session.items() {
            CropService::take_stock(&mut tx, &item.product_id, item.quantity).await?;
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (
                consumer_id, producer_id, payment_method, applied_offer_ids, subtotal,
                platform_fee, gst_on_platform_fee, total_discount, final_payable_amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(consumer_id)
        .bind(&request.producer_id)
        .bind(session.payment_method().as_str())
        .bind(&applied_offer_ids)
        .bind(breakdown.subtotal)
        .bind(breakdown.platform_fee)
        .bind(breakdown.gst_on_platform_fee)
        .bind(breakdown.total_discount)
        .bind(breakdown.rounded().final_payable_amount)
        .bind(OrderStatus::Placed.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for (line_no, item) in session.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, line_no, product_id, product_name, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.id)
            .bind(line_no as i32)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity as i32)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let order = row.into_order(session.items().to_vec())?;

        tracing::info!(
            order_id = %order.id,
            consumer_id = %consumer_id,
            final_payable = %order.final_payable_amount,
            offers = order.applied_offer_ids.len(),
            "Order stored"
        );

        Ok(order)
    }

    async fn signal(&self, event: OrderEvent) {
        if self.events.send(event).await.is_err() {
            tracing::warn!("Order event channel closed; event dropped");
        }
    }

    /// Orders of a consumer, newest first
    pub async fn list_orders(
        &self,
        consumer_id: &str,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Order>> {
        let total_items = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE consumer_id = $1",
        )
        .bind(consumer_id)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE consumer_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            ORDER_COLUMNS
        ))
        .bind(consumer_id)
        .bind(i64::from(pagination.per_page))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;

        let data = rows
            .into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, total_items.max(0) as u64),
        })
    }

    /// An order visible to `user_id` as its consumer or its producer
    pub async fn get_order(&self, user_id: &str, order_id: Uuid) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1 AND (consumer_id = $2 OR producer_id = $2)",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let mut items = self.load_items(&[order_id]).await?;
        row.into_order(items.remove(&order_id).unwrap_or_default())
    }

    async fn load_items(
        &self,
        order_ids: &[Uuid],
    ) -> AppResult<std::collections::HashMap<Uuid, Vec<OrderItem>>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, product_name, quantity, unit_price \
             FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, line_no",
        )
        .bind(order_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: std::collections::HashMap<Uuid, Vec<OrderItem>> = Default::default();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}
