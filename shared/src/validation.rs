//! Input validation shared by every ledger
//!
//! Each check returns a static message so callers can attach the field name.

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Ledger Validations
// ============================================================================

/// Validate a unit count (purchase, sale, adjustment quantities)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be a positive whole number");
    }
    Ok(())
}

/// Validate a price or amount of money
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than zero");
    }
    if amount.scale() > 2 && amount != amount.round_dp(2) {
        return Err("Amount cannot have more than two decimal places");
    }
    if amount > crate::finance::MAX_MONEY {
        return Err("Amount must not exceed 999999999999.99");
    }
    Ok(())
}

/// Validate a mandatory free-text field
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value is required");
    }
    Ok(())
}

/// Validate an optional start/end filter pair
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), &'static str> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err("start_date must not be after end_date");
        }
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate phone number: 7-15 digits, optional leading '+', spaces and dashes allowed
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err("Phone number may only contain digits, spaces and dashes");
    }
    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err("Phone number must have between 7 and 15 digits");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}
