//! Purchase ledger queries
//!
//! Purchases are written through [`crate::services::StockEngine`]; this
//! service only reads them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::Period;

/// Purchase ledger service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// A purchase as stored
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchase joined with product and buyer names
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub quantity: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording or editing a purchase
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
}

impl PurchaseInput {
    pub fn validate(&self) -> AppResult<()> {
        shared::validate_quantity(self.quantity).map_err(|m| AppError::validation("quantity", m))?;
        shared::validate_amount(self.cost_price)
            .map_err(|m| AppError::validation("cost_price", m))?;
        shared::validate_amount(self.selling_price)
            .map_err(|m| AppError::validation("selling_price", m))?;
        Ok(())
    }
}

/// Query filters for listing purchases
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl PurchaseFilter {
    fn validate(&self) -> AppResult<()> {
        shared::validate_date_range(self.start_date, self.end_date)
            .map_err(|m| AppError::validation("start_date", m))
    }
}

/// Aggregate purchase figures
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseSummary {
    pub total_purchases: i64,
    pub total_quantity: i64,
    pub total_cost: Decimal,
    pub potential_revenue: Decimal,
    pub avg_cost_price: Decimal,
    pub avg_selling_price: Decimal,
    pub unique_products: i64,
    pub top_products: Vec<TopPurchasedProduct>,
    pub period: Period,
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    total_purchases: i64,
    total_quantity: i64,
    total_cost: Decimal,
    potential_revenue: Decimal,
    avg_cost_price: Decimal,
    avg_selling_price: Decimal,
    unique_products: i64,
}

/// Most purchased products by quantity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopPurchasedProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_quantity: i64,
    pub total_cost: Decimal,
}

const DETAIL_COLUMNS: &str = r#"
    p.id, p.product_id, pr.name AS product_name, p.user_id, u.name AS user_name,
    p.quantity, p.cost_price, p.selling_price, p.quantity * p.cost_price AS total_cost,
    p.created_at, p.updated_at
"#;

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List purchases from every user, newest first
    pub async fn list_purchases(&self, filter: &PurchaseFilter) -> AppResult<Vec<PurchaseDetail>> {
        filter.validate()?;

        let query = format!(
            r#"
            SELECT {DETAIL_COLUMNS}
            FROM purchases p
            JOIN products pr ON pr.id = p.product_id
            JOIN users u ON u.id = p.user_id
            WHERE ($1::date IS NULL OR p.created_at::date >= $1)
              AND ($2::date IS NULL OR p.created_at::date <= $2)
              AND ($3::uuid IS NULL OR p.product_id = $3)
              AND ($4::uuid IS NULL OR p.user_id = $4)
            ORDER BY p.created_at DESC
            "#
        );

        let purchases = sqlx::query_as::<_, PurchaseDetail>(&query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .bind(filter.user_id)
            .fetch_all(&self.db)
            .await?;

        Ok(purchases)
    }

    /// Get one purchase by ID
    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<PurchaseDetail> {
        let query = format!(
            r#"
            SELECT {DETAIL_COLUMNS}
            FROM purchases p
            JOIN products pr ON pr.id = p.product_id
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#
        );

        sqlx::query_as::<_, PurchaseDetail>(&query)
            .bind(purchase_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase".to_string()))
    }

    /// Totals and top products for the filtered purchases
    pub async fn get_summary(&self, filter: &PurchaseFilter) -> AppResult<PurchaseSummary> {
        filter.validate()?;

        let totals = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                COUNT(*) AS total_purchases,
                COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
                COALESCE(SUM(quantity * cost_price), 0) AS total_cost,
                COALESCE(SUM(quantity * selling_price), 0) AS potential_revenue,
                COALESCE(ROUND(AVG(cost_price), 2), 0) AS avg_cost_price,
                COALESCE(ROUND(AVG(selling_price), 2), 0) AS avg_selling_price,
                COUNT(DISTINCT product_id) AS unique_products
            FROM purchases
            WHERE ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
              AND ($3::uuid IS NULL OR product_id = $3)
              AND ($4::uuid IS NULL OR user_id = $4)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.product_id)
        .bind(filter.user_id)
        .fetch_one(&self.db)
        .await?;

        let top_products = sqlx::query_as::<_, TopPurchasedProduct>(
            r#"
            SELECT p.product_id, pr.name AS product_name,
                   SUM(p.quantity)::BIGINT AS total_quantity,
                   SUM(p.quantity * p.cost_price) AS total_cost
            FROM purchases p
            JOIN products pr ON pr.id = p.product_id
            WHERE ($1::date IS NULL OR p.created_at::date >= $1)
              AND ($2::date IS NULL OR p.created_at::date <= $2)
              AND ($3::uuid IS NULL OR p.product_id = $3)
              AND ($4::uuid IS NULL OR p.user_id = $4)
            GROUP BY p.product_id, pr.name
            ORDER BY total_quantity DESC
            LIMIT 5
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.product_id)
        .bind(filter.user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseSummary {
            total_purchases: totals.total_purchases,
            total_quantity: totals.total_quantity,
            total_cost: totals.total_cost,
            potential_revenue: totals.potential_revenue,
            avg_cost_price: totals.avg_cost_price,
            avg_selling_price: totals.avg_selling_price,
            unique_products: totals.unique_products,
            top_products,
            period: Period::new(filter.start_date, filter.end_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(quantity: i32, cost: &str, selling: &str) -> PurchaseInput {
        PurchaseInput {
            product_id: Uuid::new_v4(),
            quantity,
            cost_price: cost.parse().unwrap(),
            selling_price: selling.parse().unwrap(),
        }
    }

    #[test]
    fn test_purchase_input_validation() {
        assert!(input(100, "2.00", "3.00").validate().is_ok());
        assert!(matches!(
            input(0, "2.00", "3.00").validate(),
            Err(AppError::Validation { ref field, .. }) if field == "quantity"
        ));
        assert!(matches!(
            input(5, "0", "3.00").validate(),
            Err(AppError::Validation { ref field, .. }) if field == "cost_price"
        ));
        assert!(matches!(
            input(5, "2.00", "-1").validate(),
            Err(AppError::Validation { ref field, .. }) if field == "selling_price"
        ));
    }
}
