//! Expense models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ParseEnumError;

/// Whether an expense is attributed to one product or to the business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Specific,
    General,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Specific => "specific",
            ExpenseType::General => "general",
        }
    }

    /// Specific expenses must name a product; general ones never do
    pub fn requires_product(&self) -> bool {
        matches!(self, ExpenseType::Specific)
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "specific" => Ok(ExpenseType::Specific),
            "general" => Ok(ExpenseType::General),
            other => Err(ParseEnumError::new("expense type", other)),
        }
    }
}

impl TryFrom<String> for ExpenseType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
