//! Database rows for the School Inventory platform
//!
//! Enum columns are stored as constrained TEXT and parsed into the shared
//! domain types when a row leaves the database.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;

use crate::error::AppError;

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub quantity: Decimal,
    pub min_stock: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            category: row.category,
            unit: row.unit.parse()?,
            quantity: row.quantity,
            min_stock: row.min_stock,
            expiration_date: row.expiration_date,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            id: row.id,
            name: row.name,
            role: row.role,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct MovementRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub movement_type: String,
    pub description: Option<String>,
    pub responsible_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for Movement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        Ok(Movement {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            movement_type: row.movement_type.parse()?,
            description: row.description,
            responsible_id: row.responsible_id,
            created_at: row.created_at,
        })
    }
}

/// Movement joined with its product and responsible profile
#[derive(Debug, FromRow)]
pub struct MovementEntryRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub movement_type: String,
    pub description: Option<String>,
    pub responsible_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub product_unit: String,
    pub product_category: String,
    pub responsible_name: Option<String>,
}

impl TryFrom<MovementEntryRow> for MovementEntry {
    type Error = AppError;

    fn try_from(row: MovementEntryRow) -> Result<Self, Self::Error> {
        Ok(MovementEntry {
            movement: Movement {
                id: row.id,
                product_id: row.product_id,
                quantity: row.quantity,
                movement_type: row.movement_type.parse()?,
                description: row.description,
                responsible_id: row.responsible_id,
                created_at: row.created_at,
            },
            product_name: row.product_name,
            product_unit: row.product_unit.parse()?,
            product_category: row.product_category,
            responsible_name: row.responsible_name,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one
pub fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_row(unit: &str, status: &str) -> ProductRow {
        ProductRow {
            id: Uuid::new_v4(),
            name: "Feijão Carioca".to_string(),
            category: "Grãos".to_string(),
            unit: unit.to_string(),
            quantity: Decimal::from(12),
            min_stock: Decimal::from(5),
            expiration_date: None,
            status: status.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_row_conversion() {
        let product = Product::try_from(product_row("kilogram", "active")).unwrap();
        assert_eq!(product.unit, Unit::Kilogram);
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[test]
    fn test_corrupt_enum_column_is_internal_error() {
        let err = Product::try_from(product_row("bushel", "active")).unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_convert_rows_stops_on_corrupt_row() {
        let rows = vec![product_row("piece", "active"), product_row("piece", "archived")];
        assert!(convert_rows::<ProductRow, Product>(rows).is_err());
    }
}
