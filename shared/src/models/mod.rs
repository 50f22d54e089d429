//! Domain models for the Stockbook platform

mod expense;
mod report;
mod stock;
mod user;

pub use expense::*;
pub use report::*;
pub use stock::*;
pub use user::*;

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
