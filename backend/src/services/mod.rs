//! Business logic services for the School Inventory platform

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub mod auth;
pub mod inventory;
pub mod product;
pub mod profile;
pub mod reporting;

pub use auth::AuthService;
pub use inventory::InventoryService;
pub use product::ProductService;
pub use profile::ProfileService;
pub use reporting::ReportingService;

/// Race a service call against `limit`, failing with `AppError::Timeout`
pub async fn with_timeout<T, F>(limit: Duration, operation: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} timed out after {:?}", operation, limit);
            Err(AppError::Timeout(operation.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let value = with_timeout(Duration::from_secs(1), "fast", async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_with_timeout_maps_elapsed_to_timeout() {
        let err = with_timeout(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), "TIMEOUT");
    }
}
