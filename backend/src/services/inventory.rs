//! Inventory movement service: the stock ledger and its running balances

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    apply_movement, validate_movement_quantity, Movement, MovementEntry, MovementType,
    PaginatedResponse, Pagination, Product, ProductStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{convert_rows, MovementEntryRow, MovementRow, ProductRow};

/// Inventory service for recording and listing stock movements
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for recording a movement
#[derive(Debug, Deserialize)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Positive magnitude
    pub quantity: Decimal,
    pub description: Option<String>,
}

/// A recorded movement and the product's balance after it
#[derive(Debug, Serialize)]
pub struct RecordedMovement {
    pub movement: Movement,
    pub product: Product,
}

/// Filters for movement listings
#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
}

const ENTRY_SELECT: &str = r#"
    SELECT m.id, m.product_id, m.quantity, m.movement_type, m.description,
           m.responsible_id, m.created_at,
           p.name AS product_name, p.unit AS product_unit, p.category AS product_category,
           pr.name AS responsible_name
    FROM movements m
    JOIN products p ON p.id = m.product_id
    LEFT JOIN profiles pr ON pr.id = m.responsible_id
    WHERE ($1::uuid IS NULL OR m.product_id = $1)
      AND ($2::text IS NULL OR m.movement_type = $2)
"#;

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record an inflow or outflow and update the product balance.
    ///
    /// The product row stays locked until commit, so concurrent movements
    /// on the same product apply one after the other. A rejected movement
    /// writes nothing.
    pub async fn record_movement(
        &self,
        responsible_id: Uuid,
        input: RecordMovementInput,
    ) -> AppResult<RecordedMovement> {
        validate_movement_quantity(input.quantity)
            .map_err(|m| AppError::validation("quantity", m))?;

        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let mut tx = self.db.begin().await?;

        let (current, status) = sqlx::query_as::<_, (Decimal, String)>(
            "SELECT quantity, status FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(input.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if status.parse::<ProductStatus>()? == ProductStatus::Inactive {
            return Err(AppError::validation(
                "product_id",
                "Inactive products accept no movements",
            ));
        }

        let new_quantity = apply_movement(current, input.movement_type, input.quantity)?;

        let movement_row = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO movements (product_id, quantity, movement_type, description, responsible_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, quantity, movement_type, description, responsible_id, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.movement_type.as_str())
        .bind(description)
        .bind(responsible_id)
        .fetch_one(&mut *tx)
        .await?;

        let product_row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products SET quantity = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, category, unit, quantity, min_stock, expiration_date,
                      status, created_at, updated_at
            "#,
        )
        .bind(input.product_id)
        .bind(new_quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let movement = Movement::try_from(movement_row)?;
        let product = Product::try_from(product_row)?;

        tracing::info!(
            product_id = %product.id,
            movement_type = movement.movement_type.as_str(),
            quantity = %movement.quantity,
            new_quantity = %product.quantity,
            "Movement recorded"
        );

        if product.is_critical() {
            tracing::debug!(product_id = %product.id, "Product at or below minimum stock");
        }

        Ok(RecordedMovement { movement, product })
    }

    /// Movements, newest first
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<MovementEntry>> {
        let pagination = pagination.normalized();
        let movement_type = filter.movement_type.map(|t| t.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM movements m
            WHERE ($1::uuid IS NULL OR m.product_id = $1)
              AND ($2::text IS NULL OR m.movement_type = $2)
            "#,
        )
        .bind(filter.product_id)
        .bind(movement_type)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, MovementEntryRow>(&format!(
            "{} ORDER BY m.created_at DESC, m.id LIMIT $3 OFFSET $4",
            ENTRY_SELECT
        ))
        .bind(filter.product_id)
        .bind(movement_type)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: convert_rows(rows)?,
            pagination: pagination.meta(total.max(0) as u64),
        })
    }

    /// Latest movements of one direction
    pub async fn recent(&self, movement_type: MovementType, limit: i64) -> AppResult<Vec<MovementEntry>> {
        let rows = sqlx::query_as::<_, MovementEntryRow>(&format!(
            "{} ORDER BY m.created_at DESC, m.id LIMIT $3",
            ENTRY_SELECT
        ))
        .bind(None::<Uuid>)
        .bind(movement_type.as_str())
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        convert_rows(rows)
    }

    /// Total outflow per category since `since`
    pub async fn outflow_by_category(&self, since: DateTime<Utc>) -> AppResult<Vec<(String, Decimal)>> {
        let totals = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT p.category, COALESCE(SUM(m.quantity), 0)
            FROM movements m
            JOIN products p ON p.id = m.product_id
            WHERE m.movement_type = 'out' AND m.created_at >= $1
            GROUP BY p.category
            "#,
        )
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_input_parses_direction() {
        let input: RecordMovementInput = serde_json::from_str(
            r#"{"product_id":"7c9e6679-7425-40de-944b-e07fc1f90ae7","movement_type":"out","quantity":"2.5"}"#,
        )
        .unwrap();
        assert_eq!(input.movement_type, MovementType::Out);
        assert_eq!(input.quantity, Decimal::new(25, 1));
        assert!(input.description.is_none());
    }

    #[test]
    fn test_filter_defaults_to_everything() {
        let filter: MovementFilter = serde_json::from_str("{}").unwrap();
        assert!(filter.product_id.is_none());
        assert!(filter.movement_type.is_none());
    }
}
