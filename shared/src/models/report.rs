//! Stock report aggregation
//!
//! Everything here is a pure function of the product list and a reference
//! date, so the same numbers come out of the server and the browser.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::expiration::{classify_days, expiration_label, ExpirationStatus};
use super::product::{Product, Unit};

/// Category filter value meaning "no filter"
pub const ALL_CATEGORIES: &str = "Todas";

/// CSV export header, in column order
pub const CSV_HEADERS: [&str; 7] = [
    "ID",
    "Produto",
    "Categoria",
    "Estoque Atual",
    "Unidade",
    "Validade",
    "Status",
];

/// One line of the stock report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockReportRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub expiration_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
    pub expiration_status: ExpirationStatus,
    pub status_label: String,
    pub is_critical: bool,
    /// Expires within the near-expiry window or already expired
    pub is_urgent: bool,
}

impl StockReportRow {
    pub fn from_product(product: &Product, today: NaiveDate) -> Self {
        let days = product.days_remaining(today);
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            quantity: product.quantity,
            unit: product.unit,
            expiration_date: product.expiration_date,
            days_remaining: days,
            expiration_status: classify_days(days),
            status_label: expiration_label(days),
            is_critical: product.is_critical(),
            is_urgent: matches!(
                classify_days(days),
                ExpirationStatus::Expired | ExpirationStatus::Near
            ),
        }
    }

    /// Fields of the CSV line, matching `CSV_HEADERS`
    pub fn csv_record(&self) -> [String; 7] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.quantity.normalize().to_string(),
            self.unit.label().to_string(),
            self.expiration_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.status_label.clone(),
        ]
    }
}

/// Alert counters shown above the report table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StockSummary {
    pub product_count: usize,
    pub expired_count: usize,
    pub near_expiry_count: usize,
    pub critical_count: usize,
    pub total_quantity: Decimal,
}

/// Stock report for one category filter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockReport {
    pub category: String,
    pub generated_on: NaiveDate,
    pub summary: StockSummary,
    pub rows: Vec<StockReportRow>,
}

/// `Todas` followed by the distinct categories in first-seen order
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        if !out.iter().skip(1).any(|c| c == &product.category) {
            out.push(product.category.clone());
        }
    }
    out
}

fn is_all(category: &str) -> bool {
    category.is_empty() || category == ALL_CATEGORIES
}

/// Keep the products of `category` (all of them for `Todas`) and order by
/// expiration: dated items first, soonest first; undated items last.
/// The sort is stable, so ties keep their input order.
pub fn filter_and_sort<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    let mut list: Vec<&Product> = products
        .iter()
        .filter(|p| is_all(category) || p.category == category)
        .collect();

    list.sort_by(|a, b| match (a.expiration_date, b.expiration_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    list
}

/// Counters over a product list
pub fn summarize<'a, I>(products: I, today: NaiveDate) -> StockSummary
where
    I: IntoIterator<Item = &'a Product>,
{
    products.into_iter().fold(StockSummary::default(), |mut acc, p| {
        acc.product_count += 1;
        match p.expiration_status(today) {
            ExpirationStatus::Expired => acc.expired_count += 1,
            ExpirationStatus::Near => acc.near_expiry_count += 1,
            _ => {}
        }
        if p.is_critical() {
            acc.critical_count += 1;
        }
        acc.total_quantity += p.quantity;
        acc
    })
}

/// Build the report for `category`; the summary covers the whole catalog
pub fn build_stock_report(products: &[Product], category: &str, today: NaiveDate) -> StockReport {
    let category = if is_all(category) {
        ALL_CATEGORIES.to_string()
    } else {
        category.to_string()
    };

    let rows = filter_and_sort(products, &category)
        .into_iter()
        .map(|p| StockReportRow::from_product(p, today))
        .collect();

    StockReport {
        summary: summarize(products, today),
        category,
        generated_on: today,
        rows,
    }
}

/// Download name: `relatorio_estoque_<category>_<date>.csv`
pub fn csv_filename(category: &str, today: NaiveDate) -> String {
    let category = if is_all(category) { ALL_CATEGORIES } else { category };
    let slug: String = category
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | '/' | '\r' | '\n'))
        .collect();
    format!("relatorio_estoque_{}_{}.csv", slug, today.format("%Y-%m-%d"))
}

/// Outflow total of one category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryConsumption {
    pub category: String,
    pub total_out: Decimal,
    /// Average per day over the window
    pub daily_average: Decimal,
}

/// Turn per-category outflow totals into daily averages, largest first
pub fn consumption_by_category(
    totals: Vec<(String, Decimal)>,
    window_days: u32,
) -> Vec<CategoryConsumption> {
    let days = Decimal::from(window_days.max(1));
    let mut out: Vec<CategoryConsumption> = totals
        .into_iter()
        .map(|(category, total_out)| CategoryConsumption {
            daily_average: (total_out / days).round_dp(2),
            category,
            total_out,
        })
        .collect();
    out.sort_by(|a, b| b.total_out.cmp(&a.total_out).then_with(|| a.category.cmp(&b.category)));
    out
}
