//! Inventory movement ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::product::Unit;
use crate::validation::MAX_QUANTITY;

/// A single inflow or outflow ledger entry. Never modified once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Positive magnitude; the direction comes from `movement_type`
    pub quantity: Decimal,
    pub movement_type: MovementType,
    pub description: Option<String>,
    pub responsible_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A movement joined with the product and responsible names for listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementEntry {
    #[serde(flatten)]
    pub movement: Movement,
    pub product_name: String,
    pub product_unit: Unit,
    pub product_category: String,
    pub responsible_name: Option<String>,
}

/// Direction of a movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
        }
    }

    /// Label shown in movement listings
    pub fn label(&self) -> &'static str {
        match self {
            MovementType::In => "Entrada",
            MovementType::Out => "Saída",
        }
    }

    /// Signed stock delta for a positive magnitude
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            MovementType::In => quantity,
            MovementType::Out => -quantity,
        }
    }

    /// Split a signed delta into direction and magnitude
    pub fn from_delta(delta: Decimal) -> (MovementType, Decimal) {
        if delta.is_sign_negative() {
            (MovementType::Out, -delta)
        } else {
            (MovementType::In, delta)
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            other => Err(super::ParseEnumError::new("movement type", other)),
        }
    }
}

/// Reasons a stock change is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,

    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Quantity is too large")]
    QuantityOutOfRange,
}

/// Compute the stock level after a movement.
///
/// Rejects non-positive magnitudes, any outflow that would take the
/// stock below zero and any total above `MAX_QUANTITY`; callers must not
/// write anything when this fails.
pub fn apply_movement(
    current: Decimal,
    movement_type: MovementType,
    quantity: Decimal,
) -> Result<Decimal, StockError> {
    if quantity <= Decimal::ZERO {
        return Err(StockError::NonPositiveQuantity);
    }

    let new_total = current
        .checked_add(movement_type.signed(quantity))
        .filter(|total| *total <= MAX_QUANTITY)
        .ok_or(StockError::QuantityOutOfRange)?;
    if new_total < Decimal::ZERO {
        return Err(StockError::InsufficientStock {
            available: current,
            requested: quantity,
        });
    }

    Ok(new_total)
}

/// Replay a ledger from zero, stopping at the first rejected entry
pub fn replay_ledger<'a, I>(entries: I) -> Result<Decimal, StockError>
where
    I: IntoIterator<Item = &'a (MovementType, Decimal)>,
{
    entries
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (kind, qty)| apply_movement(acc, *kind, *qty))
}
