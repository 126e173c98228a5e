//! Reporting service for the dashboard, stock reports and CSV export

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use shared::{
    build_stock_report, categories, consumption_by_category, summarize, CategoryConsumption,
    ExpirationStatus, MovementEntry, MovementType, StockReport, StockReportRow, StockSummary,
    CSV_HEADERS,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::inventory::InventoryService;
use crate::services::product::{ProductService, ProductView};

/// Movements of each direction shown on the dashboard
const RECENT_MOVEMENTS: i64 = 3;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub generated_on: NaiveDate,
    pub summary: StockSummary,
    /// Products at or below their minimum stock
    pub low_stock: Vec<ProductView>,
    /// Products expiring within the next 30 days, soonest first
    pub expiring_soon: Vec<ProductView>,
    pub recent_inflows: Vec<MovementEntry>,
    pub recent_outflows: Vec<MovementEntry>,
    pub consumption: ConsumptionReport,
}

/// Average outflow per category over a look-back window
#[derive(Debug, Serialize)]
pub struct ConsumptionReport {
    pub window_days: u32,
    pub since: DateTime<Utc>,
    pub categories: Vec<CategoryConsumption>,
}

/// Rendered CSV export
#[derive(Debug)]
pub struct StockCsv {
    pub filename: String,
    pub content: String,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get dashboard metrics
    pub async fn dashboard(&self, today: NaiveDate, window_days: u32) -> AppResult<Dashboard> {
        let products = ProductService::new(self.db.clone()).list_all().await?;
        let inventory = InventoryService::new(self.db.clone());

        let summary = summarize(&products, today);

        let low_stock = products
            .iter()
            .filter(|p| p.is_critical())
            .cloned()
            .map(|p| ProductView::new(p, today))
            .collect();

        let mut expiring_soon: Vec<ProductView> = products
            .into_iter()
            .map(|p| ProductView::new(p, today))
            .filter(|v| v.expiration_status == ExpirationStatus::Near)
            .collect();
        expiring_soon.sort_by_key(|v| v.days_remaining);

        let recent_inflows = inventory.recent(MovementType::In, RECENT_MOVEMENTS).await?;
        let recent_outflows = inventory.recent(MovementType::Out, RECENT_MOVEMENTS).await?;
        let consumption = self.consumption(window_days, Utc::now()).await?;

        Ok(Dashboard {
            generated_on: today,
            summary,
            low_stock,
            expiring_soon,
            recent_inflows,
            recent_outflows,
            consumption,
        })
    }

    /// Category filter options, `Todas` first
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let products = ProductService::new(self.db.clone()).list_all().await?;
        Ok(categories(&products))
    }

    /// Stock report filtered by category and sorted by expiration
    pub async fn stock_report(&self, category: &str, today: NaiveDate) -> AppResult<StockReport> {
        let products = ProductService::new(self.db.clone()).list_all().await?;
        Ok(build_stock_report(&products, category, today))
    }

    /// Stock report rendered as a CSV download
    pub async fn stock_csv(&self, category: &str, today: NaiveDate) -> AppResult<StockCsv> {
        let report = self.stock_report(category, today).await?;
        let content = render_stock_csv(&report.rows)?;

        tracing::debug!(category, rows = report.rows.len(), "Stock CSV exported");

        Ok(StockCsv {
            filename: shared::csv_filename(category, today),
            content,
        })
    }

    /// Outflow per category over the last `window_days` days
    pub async fn consumption(
        &self,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> AppResult<ConsumptionReport> {
        let since = now - Duration::days(i64::from(window_days));
        let totals = InventoryService::new(self.db.clone())
            .outflow_by_category(since)
            .await?;

        Ok(ConsumptionReport {
            window_days,
            since,
            categories: consumption_by_category(totals, window_days),
        })
    }
}

/// Write report rows as CSV, header first
pub fn render_stock_csv(rows: &[StockReportRow]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADERS)
        .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    for row in rows {
        wtr.write_record(row.csv_record())
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::{Product, ProductStatus, Unit};
    use uuid::Uuid;

    fn product(name: &str, category: &str, exp: Option<NaiveDate>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            unit: Unit::Piece,
            quantity: Decimal::from(4),
            min_stock: Decimal::from(2),
            expiration_date: exp,
            status: ProductStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_csv_has_header_and_one_line_per_row() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let products = vec![
            product("Caderno, 96 folhas", "Papelaria", None),
            product("Iogurte", "Laticínios", NaiveDate::from_ymd_opt(2024, 5, 4)),
        ];
        let report = build_stock_report(&products, "Todas", today);
        let csv = render_stock_csv(&report.rows).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_HEADERS);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), report.rows.len());
        // Dated products sort first
        assert_eq!(&records[0][1], "Iogurte");
        assert_eq!(&records[0][6], "Vence em 3 dias");
        // Embedded comma survives quoting
        assert_eq!(&records[1][1], "Caderno, 96 folhas");
        assert_eq!(&records[1][5], "N/A");
    }

    #[test]
    fn test_empty_report_is_header_only() {
        let csv = render_stock_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("ID,Produto,Categoria"));
    }
}
