//! Per-sale profit records
//!
//! Profit records are kept independently of the sales ledger: the optional
//! `stock_out_id` is checked for existence but never drives stock.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{Period, ProfitMetrics};

/// Profit service
#[derive(Clone)]
pub struct ProfitService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProfitRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub stock_out_id: Option<Uuid>,
    pub quantity_sold: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub market_price: Decimal,
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub gross_profit: Decimal,
    pub profit_margin: Decimal,
    pub profit_per_unit: Decimal,
    pub sale_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording or editing a profit record
#[derive(Debug, Deserialize)]
pub struct ProfitInput {
    pub product_id: Uuid,
    pub stock_out_id: Option<Uuid>,
    pub quantity_sold: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub market_price: Decimal,
    pub sale_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ProfitInput {
    fn validate(&self) -> AppResult<()> {
        shared::validate_quantity(self.quantity_sold)
            .map_err(|m| AppError::validation("quantity_sold", m))?;
        shared::validate_amount(self.cost_price).map_err(|m| AppError::validation("cost_price", m))?;
        shared::validate_amount(self.selling_price)
            .map_err(|m| AppError::validation("selling_price", m))?;
        shared::validate_amount(self.market_price)
            .map_err(|m| AppError::validation("market_price", m))?;
        self.metrics()?;
        Ok(())
    }

    /// Revenue is measured at market price
    fn metrics(&self) -> AppResult<ProfitMetrics> {
        ProfitMetrics::compute(self.quantity_sold, self.cost_price, self.market_price)
            .map_err(|e| AppError::validation("quantity_sold", e.to_string()))
    }

    fn notes(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfitFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProfitSummary {
    pub overall: ProfitTotals,
    pub top_products: Vec<TopProfitProduct>,
    pub monthly_trends: Vec<MonthlyProfit>,
    pub period: Period,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ProfitTotals {
    pub total_sales: i64,
    pub total_quantity_sold: i64,
    pub total_cost: Decimal,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub avg_profit_margin: Decimal,
    pub min_profit_margin: Decimal,
    pub max_profit_margin: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopProfitProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub sales_count: i64,
    pub total_quantity: i64,
    pub total_profit: Decimal,
    pub avg_margin: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyProfit {
    pub month: String,
    pub sales_count: i64,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
}

const SELECT_PROFIT: &str = r#"
    SELECT pf.id, pf.user_id, u.name AS user_name, pf.product_id, p.name AS product_name,
           pf.stock_out_id, pf.quantity_sold, pf.cost_price, pf.selling_price, pf.market_price,
           pf.total_cost, pf.total_revenue, pf.gross_profit, pf.profit_margin, pf.profit_per_unit,
           pf.sale_date, pf.notes, pf.created_at, pf.updated_at
    FROM profits pf
    JOIN products p ON p.id = pf.product_id
    JOIN users u ON u.id = pf.user_id
"#;

// Shared by every summary query: $1 user, $2/$3 sale date bounds, $4 product
const PROFIT_SCOPE: &str = r#"
    pf.user_id = $1
    AND ($2::date IS NULL OR pf.sale_date >= $2)
    AND ($3::date IS NULL OR pf.sale_date <= $3)
    AND ($4::uuid IS NULL OR pf.product_id = $4)
"#;

impl ProfitService {
    /// Create a new ProfitService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_references(&self, input: &ProfitInput) -> AppResult<()> {
        let product_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(input.product_id)
                .fetch_one(&self.db)
                .await?;
        if !product_exists {
            return Err(AppError::NotFound("Product".to_string()));
        }

        if let Some(stock_out_id) = input.stock_out_id {
            let sale_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM stock_out WHERE id = $1)")
                    .bind(stock_out_id)
                    .fetch_one(&self.db)
                    .await?;
            if !sale_exists {
                return Err(AppError::NotFound("Stock out record".to_string()));
            }
        }

        Ok(())
    }

    pub async fn create_profit(&self, user_id: Uuid, input: ProfitInput) -> AppResult<ProfitRecord> {
        input.validate()?;
        self.ensure_references(&input).await?;

        let metrics = input.metrics()?;
        let sale_date = input.sale_date.unwrap_or_else(|| Utc::now().date_naive());

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO profits (
                user_id, product_id, stock_out_id, quantity_sold, cost_price, selling_price,
                market_price, total_cost, total_revenue, gross_profit, profit_margin,
                profit_per_unit, sale_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(input.product_id)
        .bind(input.stock_out_id)
        .bind(input.quantity_sold)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.market_price)
        .bind(metrics.total_cost)
        .bind(metrics.total_revenue)
        .bind(metrics.gross_profit)
        .bind(metrics.profit_margin)
        .bind(metrics.profit_per_unit)
        .bind(sale_date)
        .bind(input.notes())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            profit_id = %id,
            product_id = %input.product_id,
            gross_profit = %metrics.gross_profit,
            "Profit recorded"
        );

        self.get_profit(user_id, id).await
    }

    /// List the user's profit records by sale date, newest first
    pub async fn list_profits(&self, user_id: Uuid, filter: &ProfitFilter) -> AppResult<Vec<ProfitRecord>> {
        shared::validate_date_range(filter.start_date, filter.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;

        let query = format!(
            "{SELECT_PROFIT} WHERE {PROFIT_SCOPE} ORDER BY pf.sale_date DESC, pf.created_at DESC"
        );

        let profits = sqlx::query_as::<_, ProfitRecord>(&query)
            .bind(user_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .fetch_all(&self.db)
            .await?;

        Ok(profits)
    }

    pub async fn get_profit(&self, user_id: Uuid, profit_id: Uuid) -> AppResult<ProfitRecord> {
        let query = format!("{SELECT_PROFIT} WHERE pf.id = $1 AND pf.user_id = $2");

        sqlx::query_as::<_, ProfitRecord>(&query)
            .bind(profit_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profit record".to_string()))
    }

    /// Replace a profit record's inputs and recompute its metrics
    pub async fn update_profit(
        &self,
        user_id: Uuid,
        profit_id: Uuid,
        input: ProfitInput,
    ) -> AppResult<ProfitRecord> {
        input.validate()?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM profits WHERE id = $1 AND user_id = $2)",
        )
        .bind(profit_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Profit record".to_string()));
        }

        self.ensure_references(&input).await?;
        let metrics = input.metrics()?;

        let result = sqlx::query(
            r#"
            UPDATE profits
            SET product_id = $3, stock_out_id = $4, quantity_sold = $5, cost_price = $6,
                selling_price = $7, market_price = $8, total_cost = $9, total_revenue = $10,
                gross_profit = $11, profit_margin = $12, profit_per_unit = $13,
                sale_date = COALESCE($14, sale_date), notes = $15, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(profit_id)
        .bind(user_id)
        .bind(input.product_id)
        .bind(input.stock_out_id)
        .bind(input.quantity_sold)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.market_price)
        .bind(metrics.total_cost)
        .bind(metrics.total_revenue)
        .bind(metrics.gross_profit)
        .bind(metrics.profit_margin)
        .bind(metrics.profit_per_unit)
        .bind(input.sale_date)
        .bind(input.notes())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Profit record".to_string()));
        }

        self.get_profit(user_id, profit_id).await
    }

    pub async fn delete_profit(&self, user_id: Uuid, profit_id: Uuid) -> AppResult<ProfitRecord> {
        let profit = self.get_profit(user_id, profit_id).await?;

        let result = sqlx::query("DELETE FROM profits WHERE id = $1 AND user_id = $2")
            .bind(profit_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Profit record".to_string()));
        }

        tracing::info!(profit_id = %profit_id, "Profit record deleted");
        Ok(profit)
    }

    /// Overall totals, the five most profitable products and the last twelve months
    pub async fn get_summary(&self, user_id: Uuid, filter: &ProfitFilter) -> AppResult<ProfitSummary> {
        shared::validate_date_range(filter.start_date, filter.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;

        let overall_query = format!(
            r#"
            SELECT COUNT(*) AS total_sales,
                   COALESCE(SUM(pf.quantity_sold), 0)::BIGINT AS total_quantity_sold,
                   COALESCE(SUM(pf.total_cost), 0) AS total_cost,
                   COALESCE(SUM(pf.total_revenue), 0) AS total_revenue,
                   COALESCE(SUM(pf.gross_profit), 0) AS total_profit,
                   ROUND(COALESCE(AVG(pf.profit_margin), 0), 2) AS avg_profit_margin,
                   COALESCE(MIN(pf.profit_margin), 0) AS min_profit_margin,
                   COALESCE(MAX(pf.profit_margin), 0) AS max_profit_margin
            FROM profits pf
            WHERE {PROFIT_SCOPE}
            "#
        );

        let overall = sqlx::query_as::<_, ProfitTotals>(&overall_query)
            .bind(user_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .fetch_one(&self.db)
            .await?;

        let top_query = format!(
            r#"
            SELECT pf.product_id, p.name AS product_name, COUNT(*) AS sales_count,
                   SUM(pf.quantity_sold)::BIGINT AS total_quantity,
                   SUM(pf.gross_profit) AS total_profit,
                   ROUND(AVG(pf.profit_margin), 2) AS avg_margin
            FROM profits pf
            JOIN products p ON p.id = pf.product_id
            WHERE {PROFIT_SCOPE}
            GROUP BY pf.product_id, p.name
            ORDER BY total_profit DESC
            LIMIT 5
            "#
        );

        let top_products = sqlx::query_as::<_, TopProfitProduct>(&top_query)
            .bind(user_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .fetch_all(&self.db)
            .await?;

        let monthly_query = format!(
            r#"
            SELECT TO_CHAR(DATE_TRUNC('month', pf.sale_date), 'YYYY-MM') AS month,
                   COUNT(*) AS sales_count,
                   SUM(pf.total_revenue) AS total_revenue,
                   SUM(pf.gross_profit) AS total_profit
            FROM profits pf
            WHERE {PROFIT_SCOPE}
            GROUP BY DATE_TRUNC('month', pf.sale_date)
            ORDER BY DATE_TRUNC('month', pf.sale_date) DESC
            LIMIT 12
            "#
        );

        let monthly_trends = sqlx::query_as::<_, MonthlyProfit>(&monthly_query)
            .bind(user_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .fetch_all(&self.db)
            .await?;

        Ok(ProfitSummary {
            overall,
            top_products,
            monthly_trends,
            period: Period::new(filter.start_date, filter.end_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn input() -> ProfitInput {
        ProfitInput {
            product_id: Uuid::new_v4(),
            stock_out_id: None,
            quantity_sold: 10,
            cost_price: dec("2.00"),
            selling_price: dec("3.00"),
            market_price: dec("3.50"),
            sale_date: None,
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_metrics_use_market_price() {
        let metrics = input().metrics().unwrap();
        assert_eq!(metrics.total_cost, dec("20.00"));
        assert_eq!(metrics.total_revenue, dec("35.00"));
        assert_eq!(metrics.gross_profit, dec("15.00"));
        assert_eq!(metrics.profit_per_unit, dec("1.50"));
    }

    #[test]
    fn test_profit_input_requires_positive_values() {
        assert!(input().validate().is_ok());

        let mut bad = input();
        bad.market_price = Decimal::ZERO;
        assert!(matches!(
            bad.validate(),
            Err(AppError::Validation { ref field, .. }) if field == "market_price"
        ));

        let mut bad = input();
        bad.quantity_sold = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_totals_beyond_money_columns_are_rejected() {
        let mut huge = input();
        huge.quantity_sold = 1_000_000;
        huge.cost_price = dec("2000000.00");
        assert!(matches!(
            huge.validate(),
            Err(AppError::Validation { ref field, .. }) if field == "quantity_sold"
        ));
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        assert_eq!(input().notes(), None);

        let mut noted = input();
        noted.notes = Some(" bulk order ".to_string());
        assert_eq!(noted.notes(), Some("bulk order"));
    }
}
