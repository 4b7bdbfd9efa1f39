//! WebAssembly module for the GreenBasket marketplace
//!
//! Provides client-side computation for:
//! - Platform fee and GST
//! - Offer applicability and promo code resolution
//! - Final payable amount at checkout

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::coupon::*;
pub use shared::decode::*;
pub use shared::models::*;
pub use shared::pricing::*;
pub use shared::types::*;

fn js_error(message: String) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_offers(offers_json: &str) -> Result<Vec<DiscountOffer>, String> {
    if offers_json.trim().is_empty() {
        // Offers not loaded yet
        return Ok(Vec::new());
    }
    let offers: Vec<DiscountOffer> =
        serde_json::from_str(offers_json).map_err(|e| format!("Invalid offers JSON: {}", e))?;
    for offer in &offers {
        shared::validation::validate_discount_percentage(offer.discount_value)
            .map_err(|msg| format!("Offer {}: {}", offer.id, msg))?;
    }
    Ok(offers)
}

fn parse_crops(crops_json: &str) -> Result<Vec<String>, String> {
    serde_json::from_str(crops_json).map_err(|e| format!("Invalid crop names JSON: {}", e))
}

fn parse_date(today: &str) -> Result<NaiveDate, String> {
    shared::validation::parse_offer_date(today).map_err(str::to_string)
}

fn decode_array<T>(
    docs_json: &str,
    decode: impl Fn(&serde_json::Value) -> Result<T, DecodeError>,
) -> Result<Vec<T>, String> {
    let docs: Vec<serde_json::Value> =
        serde_json::from_str(docs_json).map_err(|e| format!("Invalid JSON: {}", e))?;
    docs.iter()
        .enumerate()
        .map(|(index, doc)| decode(doc).map_err(|e| format!("Document {}: {}", index, e)))
        .collect()
}

fn offer_documents_json(producer_id: &str, docs_json: &str) -> Result<String, String> {
    let offers = decode_array(docs_json, |doc| decode_offer(producer_id, doc))?;
    serde_json::to_string(&offers).map_err(|e| e.to_string())
}

fn cart_documents_json(docs_json: &str) -> Result<String, String> {
    let items = decode_array(docs_json, decode_order_item)?;
    serde_json::to_string(&items).map_err(|e| e.to_string())
}

fn charges_json(amount: f64) -> Result<String, String> {
    let amount = amount_from_f64(amount).map_err(|e| e.to_string())?;
    let charges = compute_charges(amount).map_err(|e| e.to_string())?;
    serde_json::to_string(&charges).map_err(|e| e.to_string())
}

fn final_total(subtotal: f64, payment_method: &str, offers_json: &str) -> Result<f64, String> {
    let subtotal = amount_from_f64(subtotal).map_err(|e| e.to_string())?;
    let method: PaymentMethod = payment_method.parse().map_err(|e: UnknownPaymentMethod| e.to_string())?;
    let offers = parse_offers(offers_json)?;
    let breakdown = resolve_breakdown(subtotal, method, &offers).map_err(|e| e.to_string())?;
    breakdown
        .rounded()
        .final_payable_amount
        .to_f64()
        .ok_or_else(|| "Total out of range".to_string())
}

fn breakdown_json(items_json: &str, payment_method: &str, offers_json: &str) -> Result<String, String> {
    let items: Vec<OrderItem> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))?;
    let method: PaymentMethod = payment_method.parse().map_err(|e: UnknownPaymentMethod| e.to_string())?;
    let offers = parse_offers(offers_json)?;
    let subtotal = subtotal(&items).map_err(|e| e.to_string())?;
    let breakdown = resolve_breakdown(subtotal, method, &offers).map_err(|e| e.to_string())?;
    serde_json::to_string(&breakdown.rounded()).map_err(|e| e.to_string())
}

fn applicable_json(offers_json: &str, crops_json: &str, today: &str) -> Result<String, String> {
    let offers = parse_offers(offers_json)?;
    let crops = parse_crops(crops_json)?;
    let applicable = filter_applicable_offers(&offers, &crops, parse_date(today)?);
    serde_json::to_string(&applicable).map_err(|e| e.to_string())
}

fn promo_code_json(
    offers_json: &str,
    selected_json: &str,
    input: &str,
    crops_json: &str,
    today: &str,
) -> Result<String, String> {
    let offers = parse_offers(offers_json)?;
    let selected = parse_offers(selected_json)?;
    let crops = parse_crops(crops_json)?;
    let offer = resolve_code(&offers, &selected, input, &crops, parse_date(today)?)
        .map_err(|e| e.code().to_string())?;
    serde_json::to_string(offer).map_err(|e| e.to_string())
}

/// Convert raw offer documents from the remote store into typed offers.
/// Any malformed document rejects the whole batch.
#[wasm_bindgen]
pub fn decode_offer_documents(producer_id: &str, docs_json: &str) -> Result<String, JsValue> {
    offer_documents_json(producer_id, docs_json).map_err(js_error)
}

/// Convert raw cart documents into typed order items
#[wasm_bindgen]
pub fn decode_cart_documents(docs_json: &str) -> Result<String, JsValue> {
    cart_documents_json(docs_json).map_err(js_error)
}

/// Platform fee, GST and total for an online payment, as JSON
#[wasm_bindgen]
pub fn compute_platform_charges(amount: f64) -> Result<String, JsValue> {
    charges_json(amount).map_err(js_error)
}

/// Final payable amount rounded to two decimals
#[wasm_bindgen]
pub fn resolve_final_total(
    subtotal: f64,
    payment_method: &str,
    offers_json: &str,
) -> Result<f64, JsValue> {
    final_total(subtotal, payment_method, offers_json).map_err(js_error)
}

/// Full checkout breakdown for cart lines, as JSON
#[wasm_bindgen]
pub fn checkout_breakdown(
    items_json: &str,
    payment_method: &str,
    offers_json: &str,
) -> Result<String, JsValue> {
    breakdown_json(items_json, payment_method, offers_json).map_err(js_error)
}

/// Offers applicable to the cart today, as JSON
#[wasm_bindgen]
pub fn filter_offers_json(
    offers_json: &str,
    crops_json: &str,
    today: &str,
) -> Result<String, JsValue> {
    applicable_json(offers_json, crops_json, today).map_err(js_error)
}

/// Resolve a typed promo code; rejects with a code such as `CODE_NOT_FOUND`
#[wasm_bindgen]
pub fn apply_promo_code(
    offers_json: &str,
    selected_json: &str,
    input: &str,
    crops_json: &str,
    today: &str,
) -> Result<String, JsValue> {
    promo_code_json(offers_json, selected_json, input, crops_json, today).map_err(js_error)
}

/// Normalize a promo code the way lookups do
#[wasm_bindgen]
pub fn normalize_promo_code(input: &str) -> String {
    normalize_code(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFERS: &str = r#"[
        {
            "id": "o1",
            "producer_id": "farm-1",
            "title": "Ten off",
            "discount_value": "10",
            "valid_till": "2025-12-31",
            "promo_code": "SAVE10",
            "applies_to_all_crops": true,
            "crop_names": []
        },
        {
            "id": "o2",
            "producer_id": "farm-1",
            "title": "Mango week",
            "discount_value": "20",
            "valid_till": "2025-12-31",
            "promo_code": "MANGO20",
            "applies_to_all_crops": false,
            "crop_names": ["Mango"]
        }
    ]"#;

    #[test]
    fn test_compute_platform_charges() {
        let json = compute_platform_charges(1000.0).unwrap();
        let charges: Charges = serde_json::from_str(&json).unwrap();
        assert_eq!(charges.total_payable, "1029.5".parse::<rust_decimal::Decimal>().unwrap());
    }

    #[test]
    fn test_resolve_final_total() {
        let total = resolve_final_total(1000.0, "Pay Online", OFFERS).unwrap();
        // Both offers stack when passed as the selection: 30% of 1029.5
        assert!((total - 720.65).abs() < 0.001);

        let total = resolve_final_total(1000.0, "Cash on Delivery", "").unwrap();
        assert!((total - 1000.0).abs() < 0.001);
    }

    #[test]
    fn test_invalid_inputs_reported() {
        assert!(final_total(-1.0, "online", "").is_err());
        assert!(final_total(f64::NAN, "online", "").is_err());
        assert!(final_total(10.0, "barter", "").is_err());
    }

    #[test]
    fn test_filter_offers_json() {
        let json = filter_offers_json(OFFERS, r#"["Banana"]"#, "2025-06-01").unwrap();
        let offers: Vec<DiscountOffer> = serde_json::from_str(&json).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].id, "o1");
    }

    #[test]
    fn test_apply_promo_code() {
        let json = apply_promo_code(OFFERS, "[]", "mango20", r#"["Mango"]"#, "2025-06-01").unwrap();
        let offer: DiscountOffer = serde_json::from_str(&json).unwrap();
        assert_eq!(offer.id, "o2");

        assert_eq!(
            promo_code_json(OFFERS, "[]", "mango20", r#"["Banana"]"#, "2025-06-01"),
            Err("CODE_NOT_APPLICABLE".to_string())
        );
    }

    #[test]
    fn test_checkout_breakdown() {
        let items = r#"[{"product_id":"c1","product_name":"Mango","quantity":2,"unit_price":"150"}]"#;
        let json = checkout_breakdown(items, "online", "[]").unwrap();
        let breakdown: ChargeBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(breakdown.final_payable_amount, "308.85".parse::<rust_decimal::Decimal>().unwrap());
    }

    #[test]
    fn test_decode_offer_documents() {
        let docs = r#"[{
            "id": "o9",
            "title": "Monsoon sale",
            "discountValue": 15,
            "validTill": "2025-07-31",
            "promoCode": "rain15",
            "appliesToAllCrops": true,
            "cropNames": []
        }]"#;
        let json = offer_documents_json("farm-3", docs).unwrap();
        let offers: Vec<DiscountOffer> = serde_json::from_str(&json).unwrap();
        assert_eq!(offers[0].producer_id, "farm-3");
        assert_eq!(offers[0].promo_code, "RAIN15");
    }

    #[test]
    fn test_decode_rejects_malformed_batch() {
        let docs = r#"[{"productId": "c1", "productName": "Okra", "quantity": 2}]"#;
        let err = cart_documents_json(docs).unwrap_err();
        assert!(err.contains("unitPrice"));
    }

    #[test]
    fn test_total_and_breakdown_round_alike() {
        // 10.125 sits on the midpoint and rounds away from zero
        let total = final_total(10.125, "cash_on_delivery", "").unwrap();
        assert!((total - 10.13).abs() < 1e-9);

        let items = r#"[{"product_id":"c1","product_name":"Okra","quantity":1,"unit_price":"10.125"}]"#;
        let json = breakdown_json(items, "cash_on_delivery", "").unwrap();
        let breakdown: ChargeBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(breakdown.final_payable_amount.to_f64().unwrap(), total);
    }

    #[test]
    fn test_huge_amounts_reported_not_trapped() {
        assert!(final_total(7.0e28, "online", "").is_err());
        assert!(charges_json(7.0e28).is_err());

        let items = r#"[{"product_id":"c1","product_name":"Saffron","quantity":3,"unit_price":"79228162514264337593543950335"}]"#;
        assert!(breakdown_json(items, "cash_on_delivery", "").is_err());
    }

    #[test]
    fn test_out_of_range_discount_rejected() {
        let negative = r#"[{
            "id": "bad",
            "producer_id": "farm-1",
            "title": "Surcharge",
            "discount_value": "-50",
            "valid_till": "2025-12-31",
            "promo_code": "BAD50",
            "applies_to_all_crops": true,
            "crop_names": []
        }]"#;
        assert!(final_total(100.0, "cash_on_delivery", negative).is_err());
        assert!(applicable_json(negative, r#"["Okra"]"#, "2025-06-01").is_err());
        assert!(promo_code_json(OFFERS, negative, "SAVE10", r#"["Okra"]"#, "2025-06-01").is_err());

        let above_hundred = negative.replace("-50", "150");
        assert!(final_total(100.0, "online", &above_hundred).is_err());
    }

    #[test]
    fn test_normalize_promo_code() {
        assert_eq!(normalize_promo_code("  save10 "), "SAVE10");
    }
}
