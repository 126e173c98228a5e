//! Validation utilities for the School Inventory platform

use rust_decimal::Decimal;

/// Minimum password length accepted at sign-up and password change
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum length of names, categories and roles
pub const MAX_TEXT_LENGTH: usize = 200;

/// Largest quantity a `NUMERIC(12, 2)` column holds: 9 999 999 999.99
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Decimal places kept for stored quantities
pub const QUANTITY_SCALE: u32 = 2;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err("Invalid email format"),
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// New password and its confirmation must match
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), &'static str> {
    if password != confirmation {
        return Err("Passwords do not match");
    }
    validate_password(password)
}

/// Validate a free-text role (job title)
pub fn validate_role(role: &str) -> Result<(), &'static str> {
    validate_text(role, "Role is required", "Role is too long")
}

/// Validate a person's display name
pub fn validate_person_name(name: &str) -> Result<(), &'static str> {
    validate_text(name, "Name is required", "Name is too long")
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a product name
pub fn validate_product_name(name: &str) -> Result<(), &'static str> {
    validate_text(name, "Product name is required", "Product name is too long")
}

/// Validate a product category
pub fn validate_category(category: &str) -> Result<(), &'static str> {
    validate_text(category, "Category is required", "Category is too long")
}

/// Quantities must fit the stored precision exactly
pub fn validate_quantity_precision(quantity: Decimal) -> Result<(), &'static str> {
    if quantity.normalize().scale() > QUANTITY_SCALE {
        return Err("Quantity allows at most 2 decimal places");
    }
    if quantity.abs() > MAX_QUANTITY {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Stock levels (current or minimum) cannot be negative
pub fn validate_stock_level(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Stock quantity cannot be negative");
    }
    validate_quantity_precision(quantity)
}

/// Movement magnitudes must be strictly positive
pub fn validate_movement_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    validate_quantity_precision(quantity)
}

fn validate_text(
    value: &str,
    empty_msg: &'static str,
    long_msg: &'static str,
) -> Result<(), &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(empty_msg);
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(long_msg);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("joao.silva@escola.gov.br").is_ok());
        assert!(validate_email("maria.o@escola.gov.br").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@escola.gov.br").is_err());
        assert!(validate_email("a@.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password_confirmation("segredo1", "segredo1").is_ok());
        assert_eq!(
            validate_password_confirmation("segredo1", "segredo2"),
            Err("Passwords do not match")
        );
    }

    #[test]
    fn test_validate_text_fields() {
        assert!(validate_product_name("Arroz Agulhinha").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_category(&"x".repeat(MAX_TEXT_LENGTH)).is_ok());
        assert!(validate_category(&"x".repeat(MAX_TEXT_LENGTH + 1)).is_err());
        assert!(validate_role("Almoxarife").is_ok());
        assert!(validate_person_name("").is_err());
    }

    #[test]
    fn test_validate_quantities() {
        assert!(validate_stock_level(Decimal::ZERO).is_ok());
        assert!(validate_stock_level(Decimal::from_str("-0.01").unwrap()).is_err());
        assert!(validate_movement_quantity(Decimal::ZERO).is_err());
        assert!(validate_movement_quantity(Decimal::from_str("0.5").unwrap()).is_ok());
    }

    #[test]
    fn test_max_quantity_matches_column() {
        assert_eq!(MAX_QUANTITY.to_string(), "9999999999.99");
        assert!(validate_stock_level(MAX_QUANTITY).is_ok());
    }

    #[test]
    fn test_quantity_precision() {
        let dec = |s: &str| Decimal::from_str(s).unwrap();

        assert_eq!(
            validate_movement_quantity(dec("0.004")),
            Err("Quantity allows at most 2 decimal places")
        );
        assert_eq!(
            validate_stock_level(dec("2.345")),
            Err("Quantity allows at most 2 decimal places")
        );
        // trailing zeros do not count as precision
        assert!(validate_stock_level(dec("2.3500")).is_ok());

        assert_eq!(
            validate_movement_quantity(dec("1000000000000")),
            Err("Quantity is too large")
        );
        assert_eq!(validate_movement_quantity(Decimal::MAX), Err("Quantity is too large"));
        assert_eq!(
            validate_stock_level(MAX_QUANTITY + dec("0.01")),
            Err("Quantity is too large")
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Every accepted quantity survives a NUMERIC(12, 2) column unchanged
            #[test]
            fn prop_accepted_quantities_fit_column(mantissa in 0i64..i64::MAX, scale in 0u32..6) {
                let quantity = Decimal::new(mantissa, scale);
                if validate_stock_level(quantity).is_ok() {
                    prop_assert!(quantity <= MAX_QUANTITY);
                    let mut stored = quantity;
                    stored.rescale(QUANTITY_SCALE);
                    prop_assert_eq!(stored, quantity);
                }
            }

            /// Cents within range are always accepted
            #[test]
            fn prop_cents_in_range_accepted(cents in 1i64..=999_999_999_999) {
                let quantity = Decimal::new(cents, 2);
                prop_assert!(validate_movement_quantity(quantity).is_ok());
                prop_assert!(validate_stock_level(quantity).is_ok());
            }
        }
    }
}
