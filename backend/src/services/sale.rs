//! Sales ("stock-out") ledger queries
//!
//! Sales are written through [`crate::services::StockEngine`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Sales ledger service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// A sale as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub selling_price: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sale joined with its product name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SaleDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub user_id: Uuid,
    pub quantity: i32,
    pub selling_price: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording or editing a sale
#[derive(Debug, Clone, Deserialize)]
pub struct SaleInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub selling_price: Decimal,
}

impl SaleInput {
    pub fn validate(&self) -> AppResult<()> {
        shared::validate_quantity(self.quantity).map_err(|m| AppError::validation("quantity", m))?;
        shared::validate_amount(self.selling_price)
            .map_err(|m| AppError::validation("selling_price", m))?;
        self.total_amount()?;
        Ok(())
    }

    /// Always derived, never taken from the client
    pub fn total_amount(&self) -> AppResult<Decimal> {
        shared::line_total(self.quantity, self.selling_price)
            .map_err(|e| AppError::validation("total_amount", e.to_string()))
    }
}

/// Query filters for listing sales
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product_id: Option<Uuid>,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List the user's sales, newest first
    pub async fn list_sales(&self, user_id: Uuid, filter: &SaleFilter) -> AppResult<Vec<SaleDetail>> {
        shared::validate_date_range(filter.start_date, filter.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;

        let sales = sqlx::query_as::<_, SaleDetail>(
            r#"
            SELECT so.id, so.product_id, p.name AS product_name, so.user_id, so.quantity,
                   so.selling_price, so.total_amount, so.created_at, so.updated_at
            FROM stock_out so
            JOIN products p ON p.id = so.product_id
            WHERE so.user_id = $1
              AND ($2::date IS NULL OR so.created_at::date >= $2)
              AND ($3::date IS NULL OR so.created_at::date <= $3)
              AND ($4::uuid IS NULL OR so.product_id = $4)
            ORDER BY so.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }

    /// Get one of the user's sales
    pub async fn get_sale(&self, user_id: Uuid, sale_id: Uuid) -> AppResult<SaleDetail> {
        sqlx::query_as::<_, SaleDetail>(
            r#"
            SELECT so.id, so.product_id, p.name AS product_name, so.user_id, so.quantity,
                   so.selling_price, so.total_amount, so.created_at, so.updated_at
            FROM stock_out so
            JOIN products p ON p.id = so.product_id
            WHERE so.id = $1 AND so.user_id = $2
            "#,
        )
        .bind(sale_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock out record".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_amount_is_derived() {
        let input = SaleInput {
            product_id: Uuid::new_v4(),
            quantity: 30,
            selling_price: "3.50".parse().unwrap(),
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.total_amount().unwrap(), "105.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_sale_input_rejects_non_positive_values() {
        let input = SaleInput {
            product_id: Uuid::new_v4(),
            quantity: -1,
            selling_price: "3.50".parse().unwrap(),
        };
        assert!(input.validate().is_err());

        let input = SaleInput {
            quantity: 1,
            selling_price: Decimal::ZERO,
            ..input
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_total_beyond_money_column_is_rejected() {
        let input = SaleInput {
            product_id: Uuid::new_v4(),
            quantity: 1_000_000,
            selling_price: "2000000.00".parse().unwrap(),
        };
        assert!(matches!(
            input.validate(),
            Err(AppError::Validation { ref field, .. }) if field == "total_amount"
        ));

        // Would overflow the decimal type before reaching the column cap
        let input = SaleInput {
            quantity: 1_000_000_000,
            selling_price: "100000000000000000000".parse().unwrap(),
            ..input
        };
        assert!(input.validate().is_err());
        assert!(input.total_amount().is_err());
    }
}
