//! Domain models for the School Inventory platform

mod expiration;
mod movement;
mod product;
mod profile;
mod report;

pub use expiration::*;
pub use movement::*;
pub use product::*;
pub use profile::*;
pub use report::*;

use thiserror::Error;

/// A stored or submitted enum value that is not one of the known variants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
