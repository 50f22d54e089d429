//! Product registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Product registry service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// A product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or renaming a product
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
}

impl ProductInput {
    fn normalized_name(&self) -> AppResult<&str> {
        let name = self.name.trim();
        shared::validate_required(name).map_err(|_| AppError::validation("name", "Product name is required"))?;
        if name.chars().count() > 200 {
            return Err(AppError::validation("name", "Product name must be at most 200 characters"));
        }
        Ok(name)
    }
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        let name = input.normalized_name()?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// List products, newest first
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, created_at, updated_at FROM products ORDER BY created_at DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, created_at, updated_at FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn update_product(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        let name = input.normalized_name()?;

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Delete a product that nothing references
    pub async fn delete_product(&self, product_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // Lock the product so no ledger row can start referencing it mid-check
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            return Err(AppError::NotFound("Product".to_string()));
        }

        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM purchases WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM stock_out WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM stock_adjustments WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM expenses WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM profits WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if in_use {
            return Err(AppError::Conflict {
                resource: "product".to_string(),
                message: "Product is referenced by ledger records and cannot be deleted".to_string(),
            });
        }

        // A zero counter left behind by deleted purchases is not a reference
        sqlx::query("DELETE FROM stock WHERE product_id = $1 AND quantity = 0")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(product_id = %product_id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_name_is_trimmed_and_required() {
        let input = ProductInput {
            name: "  Widget ".to_string(),
        };
        assert_eq!(input.normalized_name().unwrap(), "Widget");

        let blank = ProductInput {
            name: "   ".to_string(),
        };
        assert!(blank.normalized_name().is_err());
    }
}
