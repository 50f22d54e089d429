//! Capital investment ledger

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::Period;

const DEFAULT_INVESTMENT_TYPE: &str = "cash";

/// Capital investment service
#[derive(Clone)]
pub struct CapitalService {
    db: PgPool,
}

/// A capital investment with its investor
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CapitalInvestment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub investor_name: String,
    pub investor_phone: String,
    pub amount: Decimal,
    pub investment_date: NaiveDate,
    pub investment_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording or editing an investment
#[derive(Debug, Deserialize)]
pub struct CapitalInput {
    pub amount: Decimal,
    pub investment_date: Option<NaiveDate>,
    pub investment_type: Option<String>,
    pub notes: Option<String>,
}

impl CapitalInput {
    fn validate(&self) -> AppResult<()> {
        shared::validate_amount(self.amount).map_err(|m| AppError::validation("amount", m))
    }

    fn investment_type(&self) -> Option<String> {
        self.investment_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapitalFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub investment_type: Option<String>,
    pub user_id: Option<Uuid>,
}

/// The user's own investments with totals
#[derive(Debug, Serialize)]
pub struct MyInvestments {
    pub investments: Vec<CapitalInvestment>,
    pub total_investment: Decimal,
    pub total_transactions: i64,
}

#[derive(Debug, Serialize)]
pub struct CapitalSummary {
    pub overall: CapitalTotals,
    pub by_type: Vec<CapitalByType>,
    pub top_investors: Vec<TopInvestor>,
    pub monthly_trends: Vec<MonthlyCapital>,
    pub period: Period,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CapitalTotals {
    pub total_investments: i64,
    pub total_capital: Decimal,
    pub avg_investment: Decimal,
    pub min_investment: Decimal,
    pub max_investment: Decimal,
    pub unique_investors: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CapitalByType {
    pub investment_type: String,
    pub count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopInvestor {
    pub user_id: Uuid,
    pub investor_name: String,
    pub investment_count: i64,
    pub total_invested: Decimal,
    pub avg_investment: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyCapital {
    pub month: String,
    pub investment_count: i64,
    pub total_amount: Decimal,
}

const SELECT_INVESTMENT: &str = r#"
    SELECT ci.id, ci.user_id, u.name AS investor_name, u.phone AS investor_phone,
           ci.amount, ci.investment_date, ci.investment_type, ci.notes,
           ci.created_at, ci.updated_at
    FROM capital_investments ci
    JOIN users u ON u.id = ci.user_id
"#;

const SUMMARY_FILTER: &str = r#"
    WHERE ($1::date IS NULL OR ci.investment_date >= $1)
      AND ($2::date IS NULL OR ci.investment_date <= $2)
      AND ($3::uuid IS NULL OR ci.user_id = $3)
"#;

impl CapitalService {
    /// Create a new CapitalService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record an investment; date defaults to today and type to "cash"
    pub async fn create_investment(&self, user_id: Uuid, input: CapitalInput) -> AppResult<CapitalInvestment> {
        input.validate()?;

        let investment_date = input
            .investment_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let investment_type = input
            .investment_type()
            .unwrap_or_else(|| DEFAULT_INVESTMENT_TYPE.to_string());

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO capital_investments (user_id, amount, investment_date, investment_type, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(input.amount)
        .bind(investment_date)
        .bind(&investment_type)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(investment_id = %id, amount = %input.amount, "Capital investment recorded");
        self.get_investment(user_id, id).await
    }

    /// List every user's investments, newest first
    pub async fn list_investments(&self, filter: &CapitalFilter) -> AppResult<Vec<CapitalInvestment>> {
        shared::validate_date_range(filter.start_date, filter.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;

        let query = format!(
            r#"
            {SELECT_INVESTMENT}
            WHERE ($1::date IS NULL OR ci.investment_date >= $1)
              AND ($2::date IS NULL OR ci.investment_date <= $2)
              AND ($3::text IS NULL OR ci.investment_type = $3)
              AND ($4::uuid IS NULL OR ci.user_id = $4)
            ORDER BY ci.investment_date DESC, ci.created_at DESC
            "#
        );

        let investments = sqlx::query_as::<_, CapitalInvestment>(&query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(&filter.investment_type)
            .bind(filter.user_id)
            .fetch_all(&self.db)
            .await?;

        Ok(investments)
    }

    pub async fn my_investments(&self, user_id: Uuid) -> AppResult<MyInvestments> {
        let query = format!(
            "{SELECT_INVESTMENT} WHERE ci.user_id = $1 ORDER BY ci.investment_date DESC, ci.created_at DESC"
        );

        let investments = sqlx::query_as::<_, CapitalInvestment>(&query)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;

        let total_investment = investments.iter().map(|i| i.amount).sum();
        let total_transactions = investments.len() as i64;

        Ok(MyInvestments {
            investments,
            total_investment,
            total_transactions,
        })
    }

    pub async fn get_investment(&self, user_id: Uuid, investment_id: Uuid) -> AppResult<CapitalInvestment> {
        let query = format!("{SELECT_INVESTMENT} WHERE ci.id = $1 AND ci.user_id = $2");

        sqlx::query_as::<_, CapitalInvestment>(&query)
            .bind(investment_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Capital investment".to_string()))
    }

    /// Edit an investment; omitted date and type keep their stored values
    pub async fn update_investment(
        &self,
        user_id: Uuid,
        investment_id: Uuid,
        input: CapitalInput,
    ) -> AppResult<CapitalInvestment> {
        input.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE capital_investments
            SET amount = $3,
                investment_date = COALESCE($4, investment_date),
                investment_type = COALESCE($5, investment_type),
                notes = $6,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(investment_id)
        .bind(user_id)
        .bind(input.amount)
        .bind(input.investment_date)
        .bind(input.investment_type())
        .bind(&input.notes)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Capital investment".to_string()));
        }

        self.get_investment(user_id, investment_id).await
    }

    pub async fn delete_investment(&self, user_id: Uuid, investment_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM capital_investments WHERE id = $1 AND user_id = $2")
            .bind(investment_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Capital investment".to_string()));
        }

        tracing::info!(investment_id = %investment_id, "Capital investment deleted");
        Ok(())
    }

    /// Totals, breakdown by type, top investors and the last twelve months
    pub async fn get_summary(&self, filter: &CapitalFilter) -> AppResult<CapitalSummary> {
        shared::validate_date_range(filter.start_date, filter.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;

        let overall_query = format!(
            r#"
            SELECT COUNT(*) AS total_investments,
                   COALESCE(SUM(ci.amount), 0) AS total_capital,
                   COALESCE(ROUND(AVG(ci.amount), 2), 0) AS avg_investment,
                   COALESCE(MIN(ci.amount), 0) AS min_investment,
                   COALESCE(MAX(ci.amount), 0) AS max_investment,
                   COUNT(DISTINCT ci.user_id) AS unique_investors
            FROM capital_investments ci
            {SUMMARY_FILTER}
            "#
        );
        let overall = sqlx::query_as::<_, CapitalTotals>(&overall_query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.user_id)
            .fetch_one(&self.db)
            .await?;

        let by_type_query = format!(
            r#"
            SELECT ci.investment_type, COUNT(*) AS count, SUM(ci.amount) AS total_amount
            FROM capital_investments ci
            {SUMMARY_FILTER}
            GROUP BY ci.investment_type
            ORDER BY total_amount DESC
            "#
        );
        let by_type = sqlx::query_as::<_, CapitalByType>(&by_type_query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.user_id)
            .fetch_all(&self.db)
            .await?;

        let top_query = format!(
            r#"
            SELECT ci.user_id, u.name AS investor_name,
                   COUNT(*) AS investment_count,
                   SUM(ci.amount) AS total_invested,
                   ROUND(AVG(ci.amount), 2) AS avg_investment
            FROM capital_investments ci
            JOIN users u ON u.id = ci.user_id
            {SUMMARY_FILTER}
            GROUP BY ci.user_id, u.name
            ORDER BY total_invested DESC
            LIMIT 10
            "#
        );
        let top_investors = sqlx::query_as::<_, TopInvestor>(&top_query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.user_id)
            .fetch_all(&self.db)
            .await?;

        let trends_query = format!(
            r#"
            SELECT TO_CHAR(DATE_TRUNC('month', ci.investment_date), 'YYYY-MM') AS month,
                   COUNT(*) AS investment_count,
                   SUM(ci.amount) AS total_amount
            FROM capital_investments ci
            {SUMMARY_FILTER}
            GROUP BY DATE_TRUNC('month', ci.investment_date)
            ORDER BY DATE_TRUNC('month', ci.investment_date) DESC
            LIMIT 12
            "#
        );
        let monthly_trends = sqlx::query_as::<_, MonthlyCapital>(&trends_query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.user_id)
            .fetch_all(&self.db)
            .await?;

        Ok(CapitalSummary {
            overall,
            by_type,
            top_investors,
            monthly_trends,
            period: Period::new(filter.start_date, filter.end_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_investment_type_falls_back() {
        let input = CapitalInput {
            amount: "1000".parse().unwrap(),
            investment_date: None,
            investment_type: Some("  ".to_string()),
            notes: None,
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.investment_type(), None);
    }

    #[test]
    fn test_amount_must_be_positive() {
        let input = CapitalInput {
            amount: Decimal::ZERO,
            investment_date: None,
            investment_type: Some("equipment".to_string()),
            notes: None,
        };
        assert!(input.validate().is_err());
        assert_eq!(input.investment_type().as_deref(), Some("equipment"));
    }
}
