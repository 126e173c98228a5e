//! HTTP handlers for the School Inventory API

use chrono::{NaiveDate, Utc};

pub mod auth;
pub mod health;
pub mod inventory;
pub mod product;
pub mod profile;
pub mod reporting;

pub use auth::*;
pub use health::*;
pub use inventory::*;
pub use product::*;
pub use profile::*;
pub use reporting::*;

/// Calendar date used for expiration math
fn today() -> NaiveDate {
    Utc::now().date_naive()
}
