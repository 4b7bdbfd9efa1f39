//! Offer registry service: producer-scoped discount offers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{filter_applicable_offers, validate_crop_name, CreateOfferInput, DiscountOffer};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Offer service for reading and managing producer offers
#[derive(Clone)]
pub struct OfferService {
    db: PgPool,
}

/// Row for offer queries
#[derive(Debug, FromRow)]
struct OfferRow {
    id: String,
    producer_id: String,
    title: String,
    discount_value: Decimal,
    valid_till: NaiveDate,
    promo_code: String,
    applies_to_all_crops: bool,
    crop_names: Vec<String>,
}

impl From<OfferRow> for DiscountOffer {
    fn from(row: OfferRow) -> Self {
        DiscountOffer {
            id: row.id,
            producer_id: row.producer_id,
            title: row.title,
            discount_value: row.discount_value,
            valid_till: row.valid_till,
            promo_code: row.promo_code,
            applies_to_all_crops: row.applies_to_all_crops,
            crop_names: row.crop_names.into_iter().collect(),
        }
    }
}

const OFFER_COLUMNS: &str = "id, producer_id, title, discount_value, valid_till, promo_code, \
                             applies_to_all_crops, crop_names";

impl OfferService {
    /// Create a new OfferService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All offers of a producer, expired ones included
    pub async fn list_for_producer(&self, producer_id: &str) -> AppResult<Vec<DiscountOffer>> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            "SELECT {} FROM discount_offers WHERE producer_id = $1 ORDER BY valid_till, id",
            OFFER_COLUMNS
        ))
        .bind(producer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(DiscountOffer::from).collect())
    }

    /// Offers of a producer usable today for a cart with `crop_names`
    pub async fn list_applicable(
        &self,
        producer_id: &str,
        crop_names: &[String],
        today: NaiveDate,
    ) -> AppResult<Vec<DiscountOffer>> {
        let offers = self.list_for_producer(producer_id).await?;
        Ok(filter_applicable_offers(&offers, crop_names, today)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Create an offer for the calling producer
    pub async fn create_offer(
        &self,
        producer_id: &str,
        input: CreateOfferInput,
    ) -> AppResult<DiscountOffer> {
        input.validate()?;
        for name in &input.crop_names {
            validate_crop_name(name).map_err(|msg| AppError::Validation {
                field: "crop_names".to_string(),
                message: msg.to_string(),
            })?;
        }

        // Id is assigned by the database default
        let offer = input.into_offer(String::new(), producer_id.to_string());
        let crop_names: Vec<String> = offer.crop_names.iter().cloned().collect();

        let row = sqlx::query_as::<_, OfferRow>(&format!(
            r#"
            INSERT INTO discount_offers (
                producer_id, title, discount_value, valid_till, promo_code,
                applies_to_all_crops, crop_names
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            OFFER_COLUMNS
        ))
        .bind(&offer.producer_id)
        .bind(&offer.title)
        .bind(offer.discount_value)
        .bind(offer.valid_till)
        .bind(&offer.promo_code)
        .bind(offer.applies_to_all_crops)
        .bind(&crop_names)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateEntry("promo_code".to_string())
            }
            other => AppError::DatabaseError(other),
        })?;

        tracing::info!(
            offer_id = %row.id,
            producer_id = %producer_id,
            promo_code = %row.promo_code,
            "Offer created"
        );

        Ok(row.into())
    }

    /// Delete one of the calling producer's offers
    pub async fn delete_offer(&self, producer_id: &str, offer_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM discount_offers WHERE id = $1 AND producer_id = $2")
            .bind(offer_id)
            .bind(producer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Offer".to_string()));
        }

        tracing::info!(offer_id = %offer_id, producer_id = %producer_id, "Offer deleted");
        Ok(())
    }
}
