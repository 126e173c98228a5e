//! Product catalog models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::expiration::{days_remaining, expiration_status, ExpirationStatus};

/// A stocked item in the school inventory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: Unit,
    /// Current stock; never negative
    pub quantity: Decimal,
    pub min_stock: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Stock at or below the minimum needs replenishing
    pub fn is_critical(&self) -> bool {
        is_stock_critical(self.quantity, self.min_stock)
    }

    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        days_remaining(self.expiration_date, today)
    }

    pub fn expiration_status(&self, today: NaiveDate) -> ExpirationStatus {
        expiration_status(self.expiration_date, today)
    }

    /// Quantity rendered with the precision of its unit
    pub fn formatted_quantity(&self) -> String {
        self.unit.format_quantity(self.quantity)
    }
}

/// Stock-critical flag: quantity at or below the minimum
pub fn is_stock_critical(quantity: Decimal, min_stock: Decimal) -> bool {
    quantity <= min_stock
}

/// Unit of measure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Piece,
    Liter,
    Kilogram,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Piece => "piece",
            Unit::Liter => "liter",
            Unit::Kilogram => "kilogram",
        }
    }

    /// Label used in reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Piece => "Unidade",
            Unit::Liter => "Litro",
            Unit::Kilogram => "Quilo",
        }
    }

    /// Pieces are counted whole, liters and kilograms keep two decimals
    pub fn decimal_places(&self) -> u32 {
        match self {
            Unit::Piece => 0,
            Unit::Liter | Unit::Kilogram => 2,
        }
    }

    pub fn format_quantity(&self, quantity: Decimal) -> String {
        let mut rounded = quantity.round_dp_with_strategy(
            self.decimal_places(),
            RoundingStrategy::MidpointAwayFromZero,
        );
        rounded.rescale(self.decimal_places());
        rounded.to_string()
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Unit {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "piece" => Ok(Unit::Piece),
            "liter" => Ok(Unit::Liter),
            "kilogram" => Ok(Unit::Kilogram),
            other => Err(super::ParseEnumError::new("unit", other)),
        }
    }
}

/// Catalog status of a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            other => Err(super::ParseEnumError::new("product status", other)),
        }
    }
}

/// `ILIKE` pattern matching names or categories that contain `term`.
///
/// Blank terms match everything and yield `None`. Wildcards typed by the
/// user are escaped so they match literally.
pub fn search_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product(name: &str, category: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            unit: Unit::Kilogram,
            quantity: dec("4.00"),
            min_stock: dec("10"),
            expiration_date: None,
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_critical_flag_includes_minimum() {
        assert!(is_stock_critical(dec("10"), dec("10")));
        assert!(is_stock_critical(dec("0"), dec("0")));
        assert!(!is_stock_critical(dec("10.01"), dec("10")));
        assert!(product("Feijão", "Alimento").is_critical());
    }

    #[test]
    fn test_unit_formatting() {
        assert_eq!(Unit::Piece.format_quantity(dec("12")), "12");
        assert_eq!(Unit::Kilogram.format_quantity(dec("4")), "4.00");
        assert_eq!(Unit::Liter.format_quantity(dec("2.345")), "2.35");
    }

    #[test]
    fn test_unit_round_trip_names() {
        for unit in [Unit::Piece, Unit::Liter, Unit::Kilogram] {
            assert_eq!(Unit::from_str(unit.as_str()).unwrap(), unit);
        }
        assert!(Unit::from_str("Quilo").is_err());
    }

    #[test]
    fn test_search_pattern() {
        assert_eq!(search_pattern(" água "), Some("%água%".to_string()));
        assert_eq!(search_pattern("  "), None);
        assert_eq!(search_pattern("100%"), Some(r"%100\%%".to_string()));
        assert_eq!(search_pattern("a_b"), Some(r"%a\_b%".to_string()));
        assert_eq!(search_pattern(r"c:\x"), Some(r"%c:\\x%".to_string()));
    }
}
