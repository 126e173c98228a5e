//! WebAssembly module for the School Inventory platform
//!
//! Provides client-side computation for:
//! - Expiration bucketing and labels
//! - Stock-critical flags and unit-aware quantity formatting
//! - The navigation guard for pending and inactive accounts
//!
//! Dates cross the boundary as `YYYY-MM-DD` strings and quantities as
//! decimal strings, so nothing is lost to floating point.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{AuthState, Page, Unit};

/// Derived display fields for one product
#[derive(Debug, Serialize)]
pub struct StockBadge {
    pub is_critical: bool,
    pub formatted_quantity: String,
    pub days_remaining: Option<i64>,
    pub expiration_status: shared::ExpirationStatus,
    pub expiration_label: String,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    value
        .trim()
        .parse::<NaiveDate>()
        .map_err(|e| format!("Invalid date '{}': {}", value, e))
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some),
    }
}

fn parse_decimal(value: &str) -> Result<Decimal, String> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("Invalid quantity '{}': {}", value, e))
}

fn parse_unit(value: &str) -> Result<Unit, String> {
    value.parse::<Unit>().map_err(|e| e.to_string())
}

fn days_until(expiration_date: Option<String>, today: &str) -> Result<Option<i64>, String> {
    Ok(shared::days_remaining(
        parse_optional_date(expiration_date)?,
        parse_date(today)?,
    ))
}

fn stock_badge(
    quantity: &str,
    min_stock: &str,
    unit: &str,
    expiration_date: Option<String>,
    today: &str,
) -> Result<StockBadge, String> {
    let quantity = parse_decimal(quantity)?;
    let unit = parse_unit(unit)?;
    let days = days_until(expiration_date, today)?;
    Ok(StockBadge {
        is_critical: shared::is_stock_critical(quantity, parse_decimal(min_stock)?),
        formatted_quantity: unit.format_quantity(quantity),
        days_remaining: days,
        expiration_status: shared::classify_days(days),
        expiration_label: shared::expiration_label(days),
    })
}

fn guard(state_json: &str, is_admin: bool, page: &str) -> Result<String, String> {
    let state: AuthState =
        serde_json::from_str(state_json).map_err(|e| format!("Invalid auth state: {}", e))?;
    let page: Page = page.parse().map_err(|e: shared::ParseEnumError| e.to_string())?;
    let outcome = shared::guard_navigation(state, is_admin, page);
    serde_json::to_string(&outcome).map_err(|e| e.to_string())
}

/// Whole days from `today` until `expiration_date`; `undefined` without a date
#[wasm_bindgen]
pub fn days_remaining(expiration_date: Option<String>, today: &str) -> Result<Option<i32>, JsValue> {
    days_until(expiration_date, today)
        .map(|days| days.map(|d| d.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32))
        .map_err(|e| JsValue::from_str(&e))
}

/// Expiration bucket: `expired`, `near`, `ok` or `indeterminate`
#[wasm_bindgen]
pub fn expiration_status(expiration_date: Option<String>, today: &str) -> Result<String, JsValue> {
    days_until(expiration_date, today)
        .map(|days| shared::classify_days(days).as_str().to_string())
        .map_err(|e| JsValue::from_str(&e))
}

/// Portuguese label for a day count (`Vencido`, `Vence em N dias`, `N/A`)
#[wasm_bindgen]
pub fn expiration_label(days: Option<i32>) -> String {
    shared::expiration_label(days.map(i64::from))
}

/// Stock is critical at or below its minimum
#[wasm_bindgen]
pub fn is_stock_critical(quantity: &str, min_stock: &str) -> Result<bool, JsValue> {
    let quantity = parse_decimal(quantity).map_err(|e| JsValue::from_str(&e))?;
    let min_stock = parse_decimal(min_stock).map_err(|e| JsValue::from_str(&e))?;
    Ok(shared::is_stock_critical(quantity, min_stock))
}

/// Quantity with the precision of its unit (`piece`, `liter`, `kilogram`)
#[wasm_bindgen]
pub fn format_quantity(quantity: &str, unit: &str) -> Result<String, JsValue> {
    let quantity = parse_decimal(quantity).map_err(|e| JsValue::from_str(&e))?;
    let unit = parse_unit(unit).map_err(|e| JsValue::from_str(&e))?;
    Ok(unit.format_quantity(quantity))
}

/// Every derived product field at once, as JSON
#[wasm_bindgen]
pub fn describe_stock(
    quantity: &str,
    min_stock: &str,
    unit: &str,
    expiration_date: Option<String>,
    today: &str,
) -> Result<String, JsValue> {
    stock_badge(quantity, min_stock, unit, expiration_date, today)
        .and_then(|badge| serde_json::to_string(&badge).map_err(|e| e.to_string()))
        .map_err(|e| JsValue::from_str(&e))
}

/// Decide a navigation.
///
/// `state_json` is an auth state such as
/// `{"state":"authenticated","status":"pending"}`; the result is a
/// navigation outcome such as `{"outcome":"redirect","page":"dashboard"}`.
#[wasm_bindgen]
pub fn guard_page(state_json: &str, is_admin: bool, page: &str) -> Result<String, JsValue> {
    guard(state_json, is_admin, page).map_err(|e| JsValue::from_str(&e))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_bad_input_becomes_js_error() {
        assert!(format_quantity("abc", "piece").is_err());
        assert!(guard_page("{}", false, "dashboard").is_err());
    }
}
