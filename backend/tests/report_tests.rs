//! Stock report tests
//!
//! Tests for reporting including:
//! - CSV row count equals the filtered product list
//! - Expiration ordering of report rows
//! - Category options

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    build_stock_report, categories, csv_filename, filter_and_sort, Product, ProductStatus, Unit,
    ALL_CATEGORIES, CSV_HEADERS,
};
use uuid::Uuid;

const CATEGORY_NAMES: [&str; 4] = ["Grãos", "Laticínios", "Limpeza", "Papelaria"];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
}

fn product(category: &str, offset: Option<i64>, quantity: i64) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: format!("Item {}", quantity),
        category: category.to_string(),
        unit: Unit::Kilogram,
        quantity: Decimal::from(quantity),
        min_stock: Decimal::from(5),
        expiration_date: offset.map(|d| today() + Duration::days(d)),
        status: ProductStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Render rows the way the CSV export does
fn render(products: &[Product], category: &str) -> String {
    let report = build_stock_report(products, category, today());
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADERS).unwrap();
    for row in &report.rows {
        wtr.write_record(row.csv_record()).unwrap();
    }
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_category_options_keep_first_seen_order() {
        let products = vec![
            product("Limpeza", None, 1),
            product("Grãos", None, 2),
            product("Limpeza", None, 3),
        ];
        assert_eq!(categories(&products), vec!["Todas", "Limpeza", "Grãos"]);
    }

    #[test]
    fn test_filename() {
        assert_eq!(
            csv_filename("Laticínios", today()),
            "relatorio_estoque_laticínios_2024-08-01.csv"
        );
        assert_eq!(
            csv_filename(ALL_CATEGORIES, today()),
            "relatorio_estoque_todas_2024-08-01.csv"
        );
    }

    #[test]
    fn test_csv_validade_column() {
        let csv = render(&[product("Grãos", Some(-2), 4), product("Grãos", None, 9)], "Grãos");
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][5], "2024-07-30");
        assert_eq!(&rows[0][6], "Vencido");
        assert_eq!(&rows[1][5], "N/A");
        assert_eq!(&rows[1][6], "N/A");
        assert_eq!(&rows[1][4], "Quilo");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn products_strategy() -> impl Strategy<Value = Vec<Product>> {
        prop::collection::vec(
            (
                prop::sample::select(CATEGORY_NAMES.to_vec()),
                prop::option::of(-60i64..400),
                0i64..500,
            ),
            0..40,
        )
        .prop_map(|items| {
            items
                .into_iter()
                .map(|(category, offset, qty)| product(category, offset, qty))
                .collect()
        })
    }

    fn category_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(ALL_CATEGORIES.to_string()),
            prop::sample::select(CATEGORY_NAMES.to_vec()).prop_map(String::from),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// CSV export has one data line per filtered product
        #[test]
        fn prop_csv_row_count_matches_filter(
            products in products_strategy(),
            category in category_strategy()
        ) {
            let expected = filter_and_sort(&products, &category).len();
            let csv = render(&products, &category);

            let mut reader = csv::Reader::from_reader(csv.as_bytes());
            prop_assert_eq!(reader.records().count(), expected);
        }

        /// Dated rows come first, in ascending date order
        #[test]
        fn prop_rows_sorted_by_expiration(
            products in products_strategy(),
            category in category_strategy()
        ) {
            let sorted = filter_and_sort(&products, &category);
            let first_undated = sorted
                .iter()
                .position(|p| p.expiration_date.is_none())
                .unwrap_or(sorted.len());

            prop_assert!(sorted[first_undated..].iter().all(|p| p.expiration_date.is_none()));
            prop_assert!(sorted[..first_undated]
                .windows(2)
                .all(|w| w[0].expiration_date <= w[1].expiration_date));
        }

        /// Filtering by category keeps only that category
        #[test]
        fn prop_filter_keeps_category(
            products in products_strategy(),
            category in prop::sample::select(CATEGORY_NAMES.to_vec())
        ) {
            let sorted = filter_and_sort(&products, category);
            prop_assert!(sorted.iter().all(|p| p.category == category));
            prop_assert_eq!(
                sorted.len(),
                products.iter().filter(|p| p.category == category).count()
            );
        }
    }
}
