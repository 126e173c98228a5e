//! Shared types and models for the School Inventory platform
//!
//! This crate contains the domain rules shared between the backend, the
//! browser client (via WASM), and the test suites. It performs no I/O.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
