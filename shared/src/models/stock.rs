//! Stock counter models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// Direction of a manual stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

impl AdjustmentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentDirection::Increase => "increase",
            AdjustmentDirection::Decrease => "decrease",
        }
    }
}

impl fmt::Display for AdjustmentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase" => Ok(AdjustmentDirection::Increase),
            "decrease" => Ok(AdjustmentDirection::Decrease),
            other => Err(ParseEnumError::new("adjustment direction", other)),
        }
    }
}

impl TryFrom<String> for AdjustmentDirection {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Availability label shown in stock summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    pub fn from_quantity(quantity: i32) -> Self {
        if quantity > 0 {
            StockStatus::Available
        } else {
            StockStatus::OutOfStock
        }
    }
}

/// Counter movement reported back to clients after a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub product_id: Uuid,
    pub previous_quantity: i32,
    pub new_quantity: i32,
}

impl StockMovement {
    pub fn new(product_id: Uuid, change: crate::stock::StockChange) -> Self {
        Self {
            product_id,
            previous_quantity: change.previous,
            new_quantity: change.new,
        }
    }
}
