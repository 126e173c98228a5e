//! Product catalog service

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use shared::{
    expiration_label, search_pattern, validate_category, validate_product_name,
    validate_stock_level, ExpirationStatus, Product, ProductStatus, Unit,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{convert_rows, ProductRow};

const PRODUCT_COLUMNS: &str = "id, name, category, unit, quantity, min_stock, expiration_date, \
                               status, created_at, updated_at";

/// Product service for catalog management
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product plus the fields derived from it for display
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub is_critical: bool,
    pub days_remaining: Option<i64>,
    pub expiration_status: ExpirationStatus,
    pub expiration_label: String,
    pub formatted_quantity: String,
}

impl ProductView {
    pub fn new(product: Product, today: NaiveDate) -> Self {
        let days_remaining = product.days_remaining(today);
        Self {
            is_critical: product.is_critical(),
            expiration_status: product.expiration_status(today),
            expiration_label: expiration_label(days_remaining),
            formatted_quantity: product.formatted_quantity(),
            days_remaining,
            product,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub category: String,
    pub unit: Unit,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub status: Option<ProductStatus>,
}

/// Partial product update; `expiration_date: null` clears the date
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<Unit>,
    pub quantity: Option<Decimal>,
    pub min_stock: Option<Decimal>,
    #[serde(default, deserialize_with = "present")]
    pub expiration_date: Option<Option<NaiveDate>>,
    pub status: Option<ProductStatus>,
}

/// Distinguish an explicit `null` from a missing field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProductInput {
    /// Apply the update on top of the stored product
    fn merge_into(self, mut product: Product) -> Product {
        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(category) = self.category {
            product.category = category.trim().to_string();
        }
        if let Some(unit) = self.unit {
            product.unit = unit;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(min_stock) = self.min_stock {
            product.min_stock = min_stock;
        }
        if let Some(expiration_date) = self.expiration_date {
            product.expiration_date = expiration_date;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        product
    }
}

fn validate_product_fields(
    name: &str,
    category: &str,
    quantity: Decimal,
    min_stock: Decimal,
) -> AppResult<()> {
    validate_product_name(name).map_err(|m| AppError::validation("name", m))?;
    validate_category(category).map_err(|m| AppError::validation("category", m))?;
    validate_stock_level(quantity).map_err(|m| AppError::validation("quantity", m))?;
    validate_stock_level(min_stock).map_err(|m| AppError::validation("min_stock", m))?;
    Ok(())
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Every product, ordered by name
    pub async fn list_all(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name, created_at",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        convert_rows(rows)
    }

    /// Products whose name or category contains `search` (case-insensitive)
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Product>> {
        let Some(pattern) = search.and_then(search_pattern) else {
            return self.list_all().await;
        };

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE name ILIKE $1 OR category ILIKE $1 \
             ORDER BY name, created_at",
            PRODUCT_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;

        convert_rows(rows)
    }

    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Product::try_from(row)
    }

    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        let name = input.name.trim();
        let category = input.category.trim();
        validate_product_fields(name, category, input.quantity, input.min_stock)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (name, category, unit, quantity, min_stock, expiration_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(name)
        .bind(category)
        .bind(input.unit.as_str())
        .bind(input.quantity)
        .bind(input.min_stock)
        .bind(input.expiration_date)
        .bind(input.status.unwrap_or_default().as_str())
        .fetch_one(&self.db)
        .await?;

        let product = Product::try_from(row)?;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let current = self.get(product_id).await?;
        let product = input.merge_into(current);
        validate_product_fields(
            &product.name,
            &product.category,
            product.quantity,
            product.min_stock,
        )?;

        // Concurrent edits are last-write-wins
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $2, category = $3, unit = $4, quantity = $5, min_stock = $6,
                expiration_date = $7, status = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.unit.as_str())
        .bind(product.quantity)
        .bind(product.min_stock)
        .bind(product.expiration_date)
        .bind(product.status.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Product::try_from(row)
    }

    /// Delete a product that has no recorded movements
    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        let movement_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movements WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if movement_count > 0 {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Product has recorded movements; deactivate it instead".to_string(),
                message_pt: "O produto possui movimentações; desative-o em vez de excluir"
                    .to_string(),
            });
        }

        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        tracing::info!(%product_id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Leite Integral".to_string(),
            category: "Laticínios".to_string(),
            unit: Unit::Liter,
            quantity: Decimal::from(10),
            min_stock: Decimal::from(12),
            expiration_date: NaiveDate::from_ymd_opt(2024, 3, 20),
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_derives_fields() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let view = ProductView::new(product(), today);
        assert!(view.is_critical);
        assert_eq!(view.days_remaining, Some(10));
        assert_eq!(view.expiration_status, ExpirationStatus::Near);
        assert_eq!(view.expiration_label, "Vence em 10 dias");
        assert_eq!(view.formatted_quantity, "10.00");
    }

    #[test]
    fn test_update_null_clears_expiration() {
        let input: UpdateProductInput =
            serde_json::from_str(r#"{"expiration_date": null}"#).unwrap();
        assert_eq!(input.expiration_date, Some(None));
        let merged = input.merge_into(product());
        assert_eq!(merged.expiration_date, None);

        let input: UpdateProductInput = serde_json::from_str(r#"{"name": " Leite "}"#).unwrap();
        assert_eq!(input.expiration_date, None);
        let merged = input.merge_into(product());
        assert_eq!(merged.name, "Leite");
        assert!(merged.expiration_date.is_some());
    }

    #[test]
    fn test_negative_stock_rejected() {
        let err = validate_product_fields(
            "Arroz",
            "Grãos",
            Decimal::from_str("-1").unwrap(),
            Decimal::ZERO,
        )
        .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(validate_product_fields("Arroz", "Grãos", Decimal::ZERO, Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_stock_beyond_column_precision_rejected() {
        let err = validate_product_fields(
            "Arroz",
            "Grãos",
            Decimal::from_str("2.345").unwrap(),
            Decimal::ZERO,
        )
        .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let err = validate_product_fields(
            "Arroz",
            "Grãos",
            Decimal::ZERO,
            Decimal::from_str("1000000000000").unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
