//! Stock counter transition rules
//!
//! Every mutating inventory operation (purchase, sale, edit, delete, manual
//! adjustment) is expressed here as a pure function of the current counter
//! value. The backend locks the counter row, calls one of these rules, and
//! writes the result back inside the same transaction.
//!
//! `current` is `None` when the product has no counter row yet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AdjustmentDirection;

/// Rejections produced by the transition rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be a positive whole number, got {0}")]
    InvalidQuantity(i32),

    #[error("No stock available for this product")]
    NoStock,

    #[error("Insufficient stock available: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Cannot decrease stock by {requested}, current stock is {}", current.unwrap_or(0))]
    InvalidAdjustment { current: Option<i32>, requested: i32 },

    #[error("Stock quantity out of range")]
    QuantityOverflow,
}

impl StockError {
    /// Units missing to satisfy the request, if this is a shortage
    pub fn shortage(&self) -> Option<i32> {
        match self {
            StockError::InsufficientStock {
                available,
                requested,
            } => Some(requested - available),
            StockError::InvalidAdjustment { current, requested } => {
                Some(requested - current.unwrap_or(0))
            }
            _ => None,
        }
    }
}

/// Counter value before and after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub previous: i32,
    pub new: i32,
}

impl StockChange {
    pub fn delta(&self) -> i32 {
        self.new - self.previous
    }
}

/// Result of a reversal that was floored at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedChange {
    pub change: StockChange,
    /// Units that could not be removed because the counter hit zero
    pub shortfall: i32,
}

impl ClampedChange {
    pub fn was_clamped(&self) -> bool {
        self.shortfall > 0
    }
}

/// Reject zero and negative quantities
pub fn ensure_positive(quantity: i32) -> Result<(), StockError> {
    if quantity <= 0 {
        return Err(StockError::InvalidQuantity(quantity));
    }
    Ok(())
}

fn checked_add(a: i32, b: i32) -> Result<i32, StockError> {
    a.checked_add(b).ok_or(StockError::QuantityOverflow)
}

fn checked_sub(a: i32, b: i32) -> Result<i32, StockError> {
    a.checked_sub(b).ok_or(StockError::QuantityOverflow)
}

/// Stock entering inventory through a purchase
pub fn apply_purchase(current: Option<i32>, quantity: i32) -> Result<StockChange, StockError> {
    ensure_positive(quantity)?;
    let previous = current.unwrap_or(0);
    Ok(StockChange {
        previous,
        new: checked_add(previous, quantity)?,
    })
}

/// Stock leaving inventory through a sale
pub fn apply_sale(current: Option<i32>, quantity: i32) -> Result<StockChange, StockError> {
    ensure_positive(quantity)?;
    let available = current.ok_or(StockError::NoStock)?;
    if available < quantity {
        return Err(StockError::InsufficientStock {
            available,
            requested: quantity,
        });
    }
    Ok(StockChange {
        previous: available,
        new: available - quantity,
    })
}

/// Undo a sale: its units return to inventory
pub fn reverse_sale(current: Option<i32>, quantity: i32) -> Result<StockChange, StockError> {
    ensure_positive(quantity)?;
    let previous = current.unwrap_or(0);
    Ok(StockChange {
        previous,
        new: checked_add(previous, quantity)?,
    })
}

/// Re-quantify a sale of the same product.
///
/// The old sale is treated as returned before the new quantity is checked,
/// so a sale can always be edited down, and edited up by at most the
/// current counter value.
pub fn apply_sale_update(
    current: Option<i32>,
    old_quantity: i32,
    new_quantity: i32,
) -> Result<StockChange, StockError> {
    ensure_positive(new_quantity)?;
    let previous = current.unwrap_or(0);
    let available_if_reversed = checked_add(previous, old_quantity)?;
    if available_if_reversed < new_quantity {
        return Err(StockError::InsufficientStock {
            available: available_if_reversed,
            requested: new_quantity,
        });
    }
    Ok(StockChange {
        previous,
        new: available_if_reversed - new_quantity,
    })
}

/// Re-quantify a purchase of the same product.
///
/// Rejected when shrinking the purchase would remove units that were
/// already sold.
pub fn apply_purchase_update(
    current: Option<i32>,
    old_quantity: i32,
    new_quantity: i32,
) -> Result<StockChange, StockError> {
    ensure_positive(new_quantity)?;
    let previous = current.unwrap_or(0);
    let new = checked_add(checked_sub(previous, old_quantity)?, new_quantity)?;
    if new < 0 {
        return Err(StockError::InsufficientStock {
            available: previous,
            requested: old_quantity - new_quantity,
        });
    }
    Ok(StockChange { previous, new })
}

/// Withdraw a purchase's units, rejecting if the counter would go negative
pub fn reverse_purchase(current: Option<i32>, quantity: i32) -> Result<StockChange, StockError> {
    ensure_positive(quantity)?;
    let previous = current.unwrap_or(0);
    if previous < quantity {
        return Err(StockError::InsufficientStock {
            available: previous,
            requested: quantity,
        });
    }
    Ok(StockChange {
        previous,
        new: previous - quantity,
    })
}

/// Withdraw a purchase's units, flooring the counter at zero
pub fn reverse_purchase_clamped(
    current: Option<i32>,
    quantity: i32,
) -> Result<ClampedChange, StockError> {
    ensure_positive(quantity)?;
    let previous = current.unwrap_or(0);
    let new = (previous - quantity).max(0);
    Ok(ClampedChange {
        change: StockChange { previous, new },
        shortfall: quantity - (previous - new),
    })
}

/// Manual correction of the counter
pub fn apply_adjustment(
    current: Option<i32>,
    amount: i32,
    direction: AdjustmentDirection,
) -> Result<StockChange, StockError> {
    ensure_positive(amount)?;
    match direction {
        AdjustmentDirection::Increase => {
            let previous = current.unwrap_or(0);
            Ok(StockChange {
                previous,
                new: checked_add(previous, amount)?,
            })
        }
        AdjustmentDirection::Decrease => match current {
            Some(previous) if previous >= amount => Ok(StockChange {
                previous,
                new: previous - amount,
            }),
            _ => Err(StockError::InvalidAdjustment {
                current,
                requested: amount,
            }),
        },
    }
}

/// Counter value implied by the ledgers
pub fn ledger_quantity(purchased: i64, sold: i64, adjusted: i64) -> i64 {
    purchased - sold + adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_creates_counter_from_nothing() {
        let change = apply_purchase(None, 100).unwrap();
        assert_eq!(change, StockChange { previous: 0, new: 100 });
        assert_eq!(change.delta(), 100);
    }

    #[test]
    fn purchase_rejects_non_positive_quantity() {
        assert_eq!(apply_purchase(Some(5), 0), Err(StockError::InvalidQuantity(0)));
        assert_eq!(apply_purchase(Some(5), -3), Err(StockError::InvalidQuantity(-3)));
    }

    #[test]
    fn purchase_overflow_is_rejected() {
        assert_eq!(apply_purchase(Some(i32::MAX), 1), Err(StockError::QuantityOverflow));
    }

    #[test]
    fn sale_without_counter_is_no_stock() {
        assert_eq!(apply_sale(None, 1), Err(StockError::NoStock));
    }

    #[test]
    fn sale_reports_shortage() {
        let err = apply_sale(Some(70), 80).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                available: 70,
                requested: 80
            }
        );
        assert_eq!(err.shortage(), Some(10));
    }

    #[test]
    fn sale_can_empty_the_counter() {
        assert_eq!(apply_sale(Some(5), 5).unwrap().new, 0);
    }

    #[test]
    fn sale_update_counts_the_old_quantity_as_returned() {
        // purchase 5, sale 3 -> 2, edit sale to 4 -> 1
        let change = apply_sale_update(Some(2), 3, 4).unwrap();
        assert_eq!(change, StockChange { previous: 2, new: 1 });

        let err = apply_sale_update(Some(2), 3, 6).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                available: 5,
                requested: 6
            }
        );
    }

    #[test]
    fn purchase_update_cannot_remove_sold_units() {
        // bought 10, sold 8 -> 2 left; shrinking the purchase to 5 would need 5 units back
        let err = apply_purchase_update(Some(2), 10, 5).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                available: 2,
                requested: 5
            }
        );
        assert_eq!(err.shortage(), Some(3));

        assert_eq!(apply_purchase_update(Some(2), 10, 12).unwrap().new, 4);
        assert_eq!(apply_purchase_update(Some(2), 10, 8).unwrap().new, 0);
    }

    #[test]
    fn strict_purchase_reversal_rejects_negative() {
        assert!(reverse_purchase(Some(3), 5).is_err());
        assert_eq!(reverse_purchase(Some(5), 5).unwrap().new, 0);
    }

    #[test]
    fn clamped_purchase_reversal_floors_at_zero() {
        let clamped = reverse_purchase_clamped(Some(3), 5).unwrap();
        assert_eq!(clamped.change, StockChange { previous: 3, new: 0 });
        assert_eq!(clamped.shortfall, 2);
        assert!(clamped.was_clamped());

        let exact = reverse_purchase_clamped(Some(10), 4).unwrap();
        assert_eq!(exact.change.new, 6);
        assert!(!exact.was_clamped());
    }

    #[test]
    fn adjustment_decrease_checks_current_stock() {
        let change = apply_adjustment(Some(70), 10, AdjustmentDirection::Decrease).unwrap();
        assert_eq!(change, StockChange { previous: 70, new: 60 });

        let err = apply_adjustment(Some(60), 1000, AdjustmentDirection::Decrease).unwrap_err();
        assert_eq!(
            err,
            StockError::InvalidAdjustment {
                current: Some(60),
                requested: 1000
            }
        );
        assert_eq!(err.shortage(), Some(940));
    }

    #[test]
    fn adjustment_decrease_without_counter_is_rejected() {
        assert!(matches!(
            apply_adjustment(None, 1, AdjustmentDirection::Decrease),
            Err(StockError::InvalidAdjustment { current: None, .. })
        ));
    }

    #[test]
    fn adjustment_increase_creates_counter() {
        let change = apply_adjustment(None, 4, AdjustmentDirection::Increase).unwrap();
        assert_eq!(change, StockChange { previous: 0, new: 4 });
    }

    #[test]
    fn ledger_quantity_nets_all_movements() {
        assert_eq!(ledger_quantity(100, 30, -10), 60);
    }
}
