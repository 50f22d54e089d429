//! Operating expense ledger

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{ExpenseType, Period};

/// Expense service
#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

/// An expense with product and user names
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    #[sqlx(try_from = "String")]
    pub expense_type: ExpenseType,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording or editing an expense
#[derive(Debug, Deserialize)]
pub struct ExpenseInput {
    pub expense_type: ExpenseType,
    pub product_id: Option<Uuid>,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: Option<NaiveDate>,
}

impl ExpenseInput {
    /// Checks field presence and returns the product the expense is attributed to
    fn validate(&self) -> AppResult<Option<Uuid>> {
        shared::validate_required(&self.category).map_err(|m| AppError::validation("category", m))?;
        shared::validate_required(&self.description)
            .map_err(|m| AppError::validation("description", m))?;
        shared::validate_amount(self.amount).map_err(|m| AppError::validation("amount", m))?;

        if self.expense_type.requires_product() {
            match self.product_id {
                Some(product_id) => Ok(Some(product_id)),
                None => Err(AppError::validation(
                    "product_id",
                    "Product ID is required for specific expenses",
                )),
            }
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseFilter {
    pub expense_type: Option<ExpenseType>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseSummary {
    pub totals: Vec<ExpenseTotal>,
    pub by_category: Vec<CategoryTotal>,
    pub product_expenses: Option<ProductExpenses>,
    pub period: Period,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ExpenseTotal {
    pub expense_type: String,
    pub count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CategoryTotal {
    pub category: String,
    pub expense_type: String,
    pub count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ProductExpenses {
    pub product_id: Uuid,
    pub count: i64,
    pub total_amount: Decimal,
}

const SELECT_EXPENSE: &str = r#"
    SELECT e.id, e.user_id, u.name AS user_name, e.expense_type, e.product_id,
           p.name AS product_name, e.category, e.description, e.amount, e.expense_date,
           e.created_at, e.updated_at
    FROM expenses e
    LEFT JOIN products p ON p.id = e.product_id
    JOIN users u ON u.id = e.user_id
"#;

impl ExpenseService {
    /// Create a new ExpenseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn ensure_product(&self, product_id: Option<Uuid>) -> AppResult<()> {
        if let Some(product_id) = product_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            )
            .bind(product_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound("Product".to_string()));
            }
        }
        Ok(())
    }

    pub async fn create_expense(&self, user_id: Uuid, input: ExpenseInput) -> AppResult<Expense> {
        let product_id = input.validate()?;
        self.ensure_product(product_id).await?;

        let expense_date = input.expense_date.unwrap_or_else(|| Utc::now().date_naive());

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO expenses (user_id, expense_type, product_id, category, description, amount, expense_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(input.expense_type.as_str())
        .bind(product_id)
        .bind(input.category.trim())
        .bind(input.description.trim())
        .bind(input.amount)
        .bind(expense_date)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(expense_id = %id, expense_type = %input.expense_type, "Expense recorded");
        self.get_expense(user_id, id).await
    }

    /// List the user's expenses, newest first
    pub async fn list_expenses(&self, user_id: Uuid, filter: &ExpenseFilter) -> AppResult<Vec<Expense>> {
        shared::validate_date_range(filter.start_date, filter.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;

        let query = format!(
            r#"
            {SELECT_EXPENSE}
            WHERE e.user_id = $1
              AND ($2::text IS NULL OR e.expense_type = $2)
              AND ($3::text IS NULL OR e.category = $3)
              AND ($4::date IS NULL OR e.expense_date >= $4)
              AND ($5::date IS NULL OR e.expense_date <= $5)
              AND ($6::uuid IS NULL OR e.product_id = $6)
            ORDER BY e.expense_date DESC, e.created_at DESC
            "#
        );

        let expenses = sqlx::query_as::<_, Expense>(&query)
            .bind(user_id)
            .bind(filter.expense_type.map(|t| t.as_str()))
            .bind(&filter.category)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .fetch_all(&self.db)
            .await?;

        Ok(expenses)
    }

    pub async fn get_expense(&self, user_id: Uuid, expense_id: Uuid) -> AppResult<Expense> {
        let query = format!("{SELECT_EXPENSE} WHERE e.id = $1 AND e.user_id = $2");

        sqlx::query_as::<_, Expense>(&query)
            .bind(expense_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense".to_string()))
    }

    /// Edit an expense; an omitted date keeps the stored one
    pub async fn update_expense(
        &self,
        user_id: Uuid,
        expense_id: Uuid,
        input: ExpenseInput,
    ) -> AppResult<Expense> {
        let product_id = input.validate()?;
        self.ensure_product(product_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET expense_type = $3, product_id = $4, category = $5, description = $6,
                amount = $7, expense_date = COALESCE($8, expense_date), updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(expense_id)
        .bind(user_id)
        .bind(input.expense_type.as_str())
        .bind(product_id)
        .bind(input.category.trim())
        .bind(input.description.trim())
        .bind(input.amount)
        .bind(input.expense_date)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }

        self.get_expense(user_id, expense_id).await
    }

    pub async fn delete_expense(&self, user_id: Uuid, expense_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(expense_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }

        tracing::info!(expense_id = %expense_id, "Expense deleted");
        Ok(())
    }

    /// Totals by type and category, plus one product's share when requested
    pub async fn get_summary(&self, user_id: Uuid, filter: &ExpenseFilter) -> AppResult<ExpenseSummary> {
        shared::validate_date_range(filter.start_date, filter.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;

        let totals = sqlx::query_as::<_, ExpenseTotal>(
            r#"
            SELECT expense_type, COUNT(*) AS count, SUM(amount) AS total_amount
            FROM expenses
            WHERE user_id = $1
              AND ($2::date IS NULL OR expense_date >= $2)
              AND ($3::date IS NULL OR expense_date <= $3)
            GROUP BY expense_type
            ORDER BY expense_type
            "#,
        )
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        let by_category = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category, expense_type, COUNT(*) AS count, SUM(amount) AS total_amount
            FROM expenses
            WHERE user_id = $1
              AND ($2::date IS NULL OR expense_date >= $2)
              AND ($3::date IS NULL OR expense_date <= $3)
            GROUP BY category, expense_type
            ORDER BY total_amount DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        let product_expenses = match filter.product_id {
            Some(product_id) => Some(
                sqlx::query_as::<_, ProductExpenses>(
                    r#"
                    SELECT $4::uuid AS product_id, COUNT(*) AS count,
                           COALESCE(SUM(amount), 0) AS total_amount
                    FROM expenses
                    WHERE user_id = $1
                      AND ($2::date IS NULL OR expense_date >= $2)
                      AND ($3::date IS NULL OR expense_date <= $3)
                      AND product_id = $4
                    "#,
                )
                .bind(user_id)
                .bind(filter.start_date)
                .bind(filter.end_date)
                .bind(product_id)
                .fetch_one(&self.db)
                .await?,
            ),
            None => None,
        };

        Ok(ExpenseSummary {
            totals,
            by_category,
            product_expenses,
            period: Period::new(filter.start_date, filter.end_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(expense_type: ExpenseType, product_id: Option<Uuid>) -> ExpenseInput {
        ExpenseInput {
            expense_type,
            product_id,
            category: "Transport".to_string(),
            description: "Delivery van fuel".to_string(),
            amount: "15.00".parse().unwrap(),
            expense_date: None,
        }
    }

    #[test]
    fn test_specific_expense_requires_product() {
        assert!(matches!(
            input(ExpenseType::Specific, None).validate(),
            Err(AppError::Validation { ref field, .. }) if field == "product_id"
        ));

        let product_id = Uuid::new_v4();
        assert_eq!(
            input(ExpenseType::Specific, Some(product_id)).validate().unwrap(),
            Some(product_id)
        );
    }

    #[test]
    fn test_general_expense_drops_product() {
        assert_eq!(
            input(ExpenseType::General, Some(Uuid::new_v4())).validate().unwrap(),
            None
        );
    }

    #[test]
    fn test_expense_requires_description_and_amount() {
        let mut blank = input(ExpenseType::General, None);
        blank.description = String::new();
        assert!(blank.validate().is_err());

        let mut free = input(ExpenseType::General, None);
        free.amount = Decimal::ZERO;
        assert!(free.validate().is_err());
    }
}
