//! Reporting handlers for the dashboard, stock reports and CSV export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::{StockReport, ALL_CATEGORIES};

use super::today;
use crate::error::AppResult;
use crate::services::reporting::{ConsumptionReport, Dashboard};
use crate::services::{with_timeout, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StockReportQuery {
    /// Category name; `Todas` or absent for every category
    pub category: Option<String>,
}

impl StockReportQuery {
    fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(ALL_CATEGORIES)
    }
}

#[derive(Debug, Deserialize)]
pub struct ConsumptionQuery {
    pub days: Option<u32>,
}

/// Get dashboard metrics
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    let service = ReportingService::new(state.db.clone());
    let dashboard = with_timeout(
        state.config.request_timeout(),
        "reports.dashboard",
        service.dashboard(today(), state.config.reports.consumption_window_days),
    )
    .await?;
    Ok(Json(dashboard))
}

/// Category filter options
pub async fn get_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let service = ReportingService::new(state.db.clone());
    let categories =
        with_timeout(state.config.request_timeout(), "reports.categories", service.categories())
            .await?;
    Ok(Json(categories))
}

/// Get the stock report
pub async fn get_stock_report(
    State(state): State<AppState>,
    Query(query): Query<StockReportQuery>,
) -> AppResult<Json<StockReport>> {
    let service = ReportingService::new(state.db.clone());
    let report = with_timeout(
        state.config.request_timeout(),
        "reports.stock",
        service.stock_report(query.category(), today()),
    )
    .await?;
    Ok(Json(report))
}

/// Download the stock report as CSV
pub async fn export_stock_csv(
    State(state): State<AppState>,
    Query(query): Query<StockReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let export = with_timeout(
        state.config.request_timeout(),
        "reports.stock_csv",
        service.stock_csv(query.category(), today()),
    )
    .await?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

/// Average outflow per category
pub async fn get_consumption(
    State(state): State<AppState>,
    Query(query): Query<ConsumptionQuery>,
) -> AppResult<Json<ConsumptionReport>> {
    let window_days = query
        .days
        .unwrap_or(state.config.reports.consumption_window_days)
        .clamp(1, 365);

    let service = ReportingService::new(state.db.clone());
    let report = with_timeout(
        state.config.request_timeout(),
        "reports.consumption",
        service.consumption(window_days, Utc::now()),
    )
    .await?;
    Ok(Json(report))
}
