//! Money arithmetic for sales, profit snapshots and reports

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest amount a money column (`NUMERIC(14, 2)`) can hold: 999999999999.99
pub const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// A computed amount does not fit in a money column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Amount exceeds the maximum of 999999999999.99")]
pub struct AmountOverflow;

/// Round to cents, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Reject values whose magnitude exceeds [`MAX_MONEY`]
pub fn ensure_money(value: Decimal) -> Result<Decimal, AmountOverflow> {
    if value.abs() > MAX_MONEY {
        return Err(AmountOverflow);
    }
    Ok(value)
}

/// `quantity * unit_price`, bounded by [`MAX_MONEY`]
pub fn line_total(quantity: i32, unit_price: Decimal) -> Result<Decimal, AmountOverflow> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or(AmountOverflow)
        .and_then(ensure_money)
}

/// `part / whole * 100` to two decimals, zero when `whole` is zero
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_money(part / whole * Decimal::ONE_HUNDRED)
}

/// Average that tolerates an empty set
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        round_money(numerator / denominator)
    }
}

/// Derived fields of a profit snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitMetrics {
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub gross_profit: Decimal,
    pub profit_margin: Decimal,
    pub profit_per_unit: Decimal,
}

impl ProfitMetrics {
    /// Revenue is taken at the market price, cost at the cost price.
    ///
    /// Every derived field must fit a money column, the margin included.
    pub fn compute(
        quantity_sold: i32,
        cost_price: Decimal,
        market_price: Decimal,
    ) -> Result<Self, AmountOverflow> {
        let total_cost = line_total(quantity_sold, cost_price)?;
        let total_revenue = line_total(quantity_sold, market_price)?;
        let gross_profit = ensure_money(total_revenue - total_cost)?;

        Ok(Self {
            total_cost,
            total_revenue,
            gross_profit,
            profit_margin: ensure_money(percentage(gross_profit, total_revenue))?,
            profit_per_unit: ensure_money(market_price - cost_price)?,
        })
    }
}

/// Gross and net profit with margins against revenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profitability {
    pub revenue: Decimal,
    pub cost_of_goods_sold: Decimal,
    pub expenses: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    pub gross_margin: Decimal,
    pub net_margin: Decimal,
}

impl Profitability {
    pub fn compute(revenue: Decimal, cost_of_goods_sold: Decimal, expenses: Decimal) -> Self {
        let gross_profit = revenue - cost_of_goods_sold;
        let net_profit = gross_profit - expenses;

        Self {
            revenue,
            cost_of_goods_sold,
            expenses,
            gross_profit,
            net_profit,
            gross_margin: percentage(gross_profit, revenue),
            net_margin: percentage(net_profit, revenue),
        }
    }
}
