//! Common types used across the platform

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Envelope for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub count: usize,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        let count = items.len();
        Self { items, count }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// Optional date window echoed back by summaries and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Period {
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_response_counts_items() {
        let list = ListResponse::new(vec!["a", "b", "c"]);
        assert_eq!(list.count, 3);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn open_period_contains_everything() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(Period::default().contains(day));
        let after = Period::new(NaiveDate::from_ymd_opt(2024, 6, 2), None);
        assert!(!after.contains(day));
    }
}
