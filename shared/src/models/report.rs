//! Reporting classifications

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ParseEnumError;

/// Bucket size for time-series reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
        }
    }

    /// Label format for the bucket start date
    pub fn label_format(&self) -> &'static str {
        match self {
            GroupBy::Day => "YYYY-MM-DD",
            GroupBy::Week => "IYYY-\"W\"IW",
            GroupBy::Month => "YYYY-MM",
        }
    }
}

impl FromStr for GroupBy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(GroupBy::Day),
            "week" => Ok(GroupBy::Week),
            "month" => Ok(GroupBy::Month),
            other => Err(ParseEnumError::new("group_by", other)),
        }
    }
}

/// Inventory level of a single product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Normal,
    Overstocked,
}

/// Thresholds used by the inventory report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockThresholds {
    pub low_stock: i32,
    pub overstock: i32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            low_stock: 10,
            overstock: 100,
        }
    }
}

impl StockThresholds {
    pub fn classify(&self, quantity: i32) -> StockLevel {
        if quantity <= 0 {
            StockLevel::OutOfStock
        } else if quantity <= self.low_stock {
            StockLevel::Low
        } else if quantity > self.overstock {
            StockLevel::Overstocked
        } else {
            StockLevel::Normal
        }
    }

    /// Zero counts as low stock as well as out of stock
    pub fn is_low(&self, quantity: i32) -> bool {
        (0..=self.low_stock).contains(&quantity)
    }

    pub fn is_out_of_stock(&self, quantity: i32) -> bool {
        quantity <= 0
    }

    pub fn is_overstocked(&self, quantity: i32) -> bool {
        quantity > self.overstock
    }
}

/// Sales volume tier in the product performance report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    High,
    Medium,
    Low,
}

impl PerformanceTier {
    pub fn from_units_sold(units: i64) -> Self {
        if units > 50 {
            PerformanceTier::High
        } else if units > 20 {
            PerformanceTier::Medium
        } else {
            PerformanceTier::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_both_thresholds() {
        let t = StockThresholds::default();
        assert_eq!(t.classify(-1), StockLevel::OutOfStock);
        assert_eq!(t.classify(0), StockLevel::OutOfStock);
        assert_eq!(t.classify(10), StockLevel::Low);
        assert_eq!(t.classify(11), StockLevel::Normal);
        assert_eq!(t.classify(100), StockLevel::Normal);
        assert_eq!(t.classify(101), StockLevel::Overstocked);
    }

    #[test]
    fn zero_is_both_low_and_out_of_stock() {
        let t = StockThresholds::default();
        assert!(t.is_low(0));
        assert!(t.is_out_of_stock(0));
        assert!(!t.is_low(-2));
    }

    #[test]
    fn performance_tiers() {
        assert_eq!(PerformanceTier::from_units_sold(51), PerformanceTier::High);
        assert_eq!(PerformanceTier::from_units_sold(50), PerformanceTier::Medium);
        assert_eq!(PerformanceTier::from_units_sold(21), PerformanceTier::Medium);
        assert_eq!(PerformanceTier::from_units_sold(20), PerformanceTier::Low);
        assert_eq!(PerformanceTier::from_units_sold(0), PerformanceTier::Low);
    }

    #[test]
    fn group_by_parses_known_buckets_only() {
        assert_eq!("week".parse::<GroupBy>(), Ok(GroupBy::Week));
        assert_eq!(GroupBy::default(), GroupBy::Day);
        assert!("year".parse::<GroupBy>().is_err());
    }
}
