//! Stock consistency engine
//!
//! Every operation that moves the on-hand counter runs in one transaction:
//! the ledger row being edited is locked first, then the affected counter
//! rows (`SELECT ... FOR UPDATE`, ascending product id when two products are
//! involved). The transition itself is decided by the pure rules in
//! [`shared::stock`]. Any error drops the transaction, which rolls it back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::purchase::{Purchase, PurchaseInput};
use crate::services::sale::{Sale, SaleInput};
use shared::stock;
use shared::{AdjustmentDirection, StockMovement, StockStatus};

/// Stock engine: the only writer of the `stock` table
#[derive(Clone)]
pub struct StockEngine {
    db: PgPool,
}

/// On-hand counter for a product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockCounter {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit row written by every manual adjustment
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockAdjustment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub direction: AdjustmentDirection,
    #[serde(rename = "adjustment_quantity")]
    pub quantity: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Input for a manual adjustment
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStockInput {
    pub product_id: Uuid,
    pub adjustment_quantity: i32,
    pub direction: AdjustmentDirection,
    pub reason: String,
}

impl AdjustStockInput {
    pub fn validate(&self) -> AppResult<()> {
        shared::validate_quantity(self.adjustment_quantity)
            .map_err(|m| AppError::validation("adjustment_quantity", m))?;
        shared::validate_required(&self.reason).map_err(|m| AppError::validation("reason", m))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjustmentFilter {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseReceipt {
    pub purchase: Purchase,
    pub previous_stock: i32,
    pub current_stock: i32,
}

#[derive(Debug, Serialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub previous_stock: i32,
    pub remaining_stock: i32,
}

#[derive(Debug, Serialize)]
pub struct PurchaseRevision {
    pub purchase: Purchase,
    pub previous: Purchase,
    pub stock_changes: Vec<StockMovement>,
}

#[derive(Debug, Serialize)]
pub struct SaleRevision {
    pub sale: Sale,
    pub previous: Sale,
    pub stock_changes: Vec<StockMovement>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseRemoval {
    pub purchase: Purchase,
    pub stock_change: StockMovement,
    /// Units that could not be withdrawn because they were already sold
    pub clamped_units: i32,
}

#[derive(Debug, Serialize)]
pub struct SaleRemoval {
    pub sale: Sale,
    pub stock_change: StockMovement,
}

/// Counter compared with the ledgers for one product
#[derive(Debug, Clone, Serialize)]
pub struct StockSummary {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_stock_in: i64,
    pub total_stock_out: i64,
    pub total_adjusted: i64,
    pub available_stock: i32,
    pub stock_status: StockStatus,
    pub consistent: bool,
}

/// A product whose counter disagrees with its ledgers
#[derive(Debug, Clone, Serialize)]
pub struct StockDrift {
    pub product_id: Uuid,
    pub product_name: String,
    pub counter_quantity: i32,
    pub ledger_quantity: i64,
    pub drift: i64,
}

#[derive(Debug, FromRow)]
struct LedgerTotalsRow {
    product_id: Uuid,
    product_name: String,
    total_stock_in: i64,
    total_stock_out: i64,
    total_adjusted: i64,
    counter_quantity: Option<i32>,
}

impl LedgerTotalsRow {
    fn ledger_quantity(&self) -> i64 {
        stock::ledger_quantity(self.total_stock_in, self.total_stock_out, self.total_adjusted)
    }

    fn drift(&self) -> i64 {
        i64::from(self.counter_quantity.unwrap_or(0)) - self.ledger_quantity()
    }
}

const LEDGER_TOTALS_SQL: &str = r#"
    SELECT p.id AS product_id, p.name AS product_name,
           COALESCE((SELECT SUM(quantity) FROM purchases WHERE product_id = p.id), 0)::BIGINT
               AS total_stock_in,
           COALESCE((SELECT SUM(quantity) FROM stock_out WHERE product_id = p.id), 0)::BIGINT
               AS total_stock_out,
           COALESCE((SELECT SUM(CASE WHEN direction = 'increase' THEN quantity ELSE -quantity END)
                     FROM stock_adjustments WHERE product_id = p.id), 0)::BIGINT
               AS total_adjusted,
           (SELECT quantity FROM stock WHERE product_id = p.id) AS counter_quantity
    FROM products p
"#;

// ============================================================================
// Row-level primitives (must run inside a transaction)
// ============================================================================

async fn ensure_product(conn: &mut PgConnection, product_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;

    if !exists {
        return Err(AppError::NotFound("Product".to_string()));
    }
    Ok(())
}

/// Lock a product's counter. With `create`, a zero counter is inserted first
/// so concurrent creators serialize on the same row.
async fn lock_counter(
    conn: &mut PgConnection,
    product_id: Uuid,
    create: bool,
) -> AppResult<Option<i32>> {
    if create {
        sqlx::query(
            "INSERT INTO stock (product_id, quantity) VALUES ($1, 0) ON CONFLICT (product_id) DO NOTHING",
        )
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    }

    let quantity = sqlx::query_scalar::<_, i32>(
        "SELECT quantity FROM stock WHERE product_id = $1 FOR UPDATE",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(quantity)
}

/// Lock two distinct counters in ascending id order
async fn lock_counter_pair(
    conn: &mut PgConnection,
    (first, create_first): (Uuid, bool),
    (second, create_second): (Uuid, bool),
) -> AppResult<(Option<i32>, Option<i32>)> {
    if first < second {
        let a = lock_counter(conn, first, create_first).await?;
        let b = lock_counter(conn, second, create_second).await?;
        Ok((a, b))
    } else {
        let b = lock_counter(conn, second, create_second).await?;
        let a = lock_counter(conn, first, create_first).await?;
        Ok((a, b))
    }
}

async fn write_counter(conn: &mut PgConnection, product_id: Uuid, quantity: i32) -> AppResult<()> {
    sqlx::query("UPDATE stock SET quantity = $2, updated_at = NOW() WHERE product_id = $1")
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Counter prices follow the most recent remaining purchase
async fn refresh_prices(conn: &mut PgConnection, product_id: Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE stock s
        SET cost_price = latest.cost_price,
            selling_price = latest.selling_price,
            updated_at = NOW()
        FROM (
            SELECT cost_price, selling_price
            FROM purchases
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
        ) latest
        WHERE s.product_id = $1
        "#,
    )
    .bind(product_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn lock_purchase(conn: &mut PgConnection, purchase_id: Uuid, user_id: Uuid) -> AppResult<Purchase> {
    sqlx::query_as::<_, Purchase>(
        r#"
        SELECT id, product_id, user_id, quantity, cost_price, selling_price, created_at, updated_at
        FROM purchases
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(purchase_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Purchase".to_string()))
}

async fn lock_sale(conn: &mut PgConnection, sale_id: Uuid, user_id: Uuid) -> AppResult<Sale> {
    sqlx::query_as::<_, Sale>(
        r#"
        SELECT id, product_id, user_id, quantity, selling_price, total_amount, created_at, updated_at
        FROM stock_out
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(sale_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Stock out record".to_string()))
}

impl StockEngine {
    /// Create a new StockEngine instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Purchases
    // ========================================================================

    /// Record stock entering inventory
    pub async fn record_purchase(&self, user_id: Uuid, input: PurchaseInput) -> AppResult<PurchaseReceipt> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        ensure_product(&mut tx, input.product_id).await?;
        let current = lock_counter(&mut tx, input.product_id, true).await?;
        let change = stock::apply_purchase(current, input.quantity)?;

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (product_id, user_id, quantity, cost_price, selling_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, user_id, quantity, cost_price, selling_price, created_at, updated_at
            "#,
        )
        .bind(input.product_id)
        .bind(user_id)
        .bind(input.quantity)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .fetch_one(&mut *tx)
        .await?;

        write_counter(&mut tx, input.product_id, change.new).await?;
        refresh_prices(&mut tx, input.product_id).await?;

        tx.commit().await?;

        tracing::info!(
            purchase_id = %purchase.id,
            product_id = %purchase.product_id,
            previous = change.previous,
            new = change.new,
            "Purchase recorded"
        );

        Ok(PurchaseReceipt {
            purchase,
            previous_stock: change.previous,
            current_stock: change.new,
        })
    }

    /// Edit a purchase, moving its effect between counters as needed
    pub async fn update_purchase(
        &self,
        user_id: Uuid,
        purchase_id: Uuid,
        input: PurchaseInput,
    ) -> AppResult<PurchaseRevision> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let previous = lock_purchase(&mut tx, purchase_id, user_id).await?;
        ensure_product(&mut tx, input.product_id).await?;

        let mut stock_changes = Vec::with_capacity(2);
        if previous.product_id == input.product_id {
            let current = lock_counter(&mut tx, input.product_id, true).await?;
            let change = stock::apply_purchase_update(current, previous.quantity, input.quantity)?;
            write_counter(&mut tx, input.product_id, change.new).await?;
            stock_changes.push(StockMovement::new(input.product_id, change));
        } else {
            let (old_current, new_current) = lock_counter_pair(
                &mut tx,
                (previous.product_id, false),
                (input.product_id, true),
            )
            .await?;
            let withdrawn = stock::reverse_purchase(old_current, previous.quantity)?;
            let added = stock::apply_purchase(new_current, input.quantity)?;
            write_counter(&mut tx, previous.product_id, withdrawn.new).await?;
            write_counter(&mut tx, input.product_id, added.new).await?;
            stock_changes.push(StockMovement::new(previous.product_id, withdrawn));
            stock_changes.push(StockMovement::new(input.product_id, added));
        }

        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            UPDATE purchases
            SET product_id = $2, quantity = $3, cost_price = $4, selling_price = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, product_id, user_id, quantity, cost_price, selling_price, created_at, updated_at
            "#,
        )
        .bind(purchase_id)
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .fetch_one(&mut *tx)
        .await?;

        refresh_prices(&mut tx, input.product_id).await?;
        if previous.product_id != input.product_id {
            refresh_prices(&mut tx, previous.product_id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            purchase_id = %purchase.id,
            old_quantity = previous.quantity,
            new_quantity = purchase.quantity,
            "Purchase updated"
        );

        Ok(PurchaseRevision {
            purchase,
            previous,
            stock_changes,
        })
    }

    /// Delete a purchase and withdraw its units, flooring the counter at zero
    pub async fn delete_purchase(&self, user_id: Uuid, purchase_id: Uuid) -> AppResult<PurchaseRemoval> {
        let mut tx = self.db.begin().await?;

        let purchase = lock_purchase(&mut tx, purchase_id, user_id).await?;
        let current = lock_counter(&mut tx, purchase.product_id, false).await?;
        let clamped = stock::reverse_purchase_clamped(current, purchase.quantity)?;

        if current.is_some() {
            write_counter(&mut tx, purchase.product_id, clamped.change.new).await?;
        }

        sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        refresh_prices(&mut tx, purchase.product_id).await?;

        tx.commit().await?;

        if clamped.was_clamped() {
            tracing::warn!(
                purchase_id = %purchase.id,
                product_id = %purchase.product_id,
                shortfall = clamped.shortfall,
                "Purchase deleted after its units were sold; stock floored at zero"
            );
        } else {
            tracing::info!(
                purchase_id = %purchase.id,
                previous = clamped.change.previous,
                new = clamped.change.new,
                "Purchase deleted"
            );
        }

        Ok(PurchaseRemoval {
            stock_change: StockMovement::new(purchase.product_id, clamped.change),
            clamped_units: clamped.shortfall,
            purchase,
        })
    }

    // ========================================================================
    // Sales
    // ========================================================================

    /// Record stock leaving inventory; rejected when stock is short
    pub async fn record_sale(&self, user_id: Uuid, input: SaleInput) -> AppResult<SaleReceipt> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        ensure_product(&mut tx, input.product_id).await?;
        let current = lock_counter(&mut tx, input.product_id, false).await?;
        let change = stock::apply_sale(current, input.quantity).map_err(|e| {
            tracing::debug!(product_id = %input.product_id, requested = input.quantity, "Sale rejected: {}", e);
            e
        })?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            INSERT INTO stock_out (product_id, user_id, quantity, selling_price, total_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, user_id, quantity, selling_price, total_amount, created_at, updated_at
            "#,
        )
        .bind(input.product_id)
        .bind(user_id)
        .bind(input.quantity)
        .bind(input.selling_price)
        .bind(input.total_amount()?)
        .fetch_one(&mut *tx)
        .await?;

        write_counter(&mut tx, input.product_id, change.new).await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            product_id = %sale.product_id,
            previous = change.previous,
            new = change.new,
            "Sale recorded"
        );

        Ok(SaleReceipt {
            sale,
            previous_stock: change.previous,
            remaining_stock: change.new,
        })
    }

    /// Edit a sale; the old quantity counts as returned before the new one is checked
    pub async fn update_sale(&self, user_id: Uuid, sale_id: Uuid, input: SaleInput) -> AppResult<SaleRevision> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let previous = lock_sale(&mut tx, sale_id, user_id).await?;
        ensure_product(&mut tx, input.product_id).await?;

        let mut stock_changes = Vec::with_capacity(2);
        if previous.product_id == input.product_id {
            let current = lock_counter(&mut tx, input.product_id, true).await?;
            let change = stock::apply_sale_update(current, previous.quantity, input.quantity)?;
            write_counter(&mut tx, input.product_id, change.new).await?;
            stock_changes.push(StockMovement::new(input.product_id, change));
        } else {
            let (old_current, new_current) = lock_counter_pair(
                &mut tx,
                (previous.product_id, true),
                (input.product_id, false),
            )
            .await?;
            let returned = stock::reverse_sale(old_current, previous.quantity)?;
            let taken = stock::apply_sale(new_current, input.quantity)?;
            write_counter(&mut tx, previous.product_id, returned.new).await?;
            write_counter(&mut tx, input.product_id, taken.new).await?;
            stock_changes.push(StockMovement::new(previous.product_id, returned));
            stock_changes.push(StockMovement::new(input.product_id, taken));
        }

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            UPDATE stock_out
            SET product_id = $2, quantity = $3, selling_price = $4, total_amount = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, product_id, user_id, quantity, selling_price, total_amount, created_at, updated_at
            "#,
        )
        .bind(sale_id)
        .bind(input.product_id)
        .bind(input.quantity)
        .bind(input.selling_price)
        .bind(input.total_amount()?)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            old_quantity = previous.quantity,
            new_quantity = sale.quantity,
            "Sale updated"
        );

        Ok(SaleRevision {
            sale,
            previous,
            stock_changes,
        })
    }

    /// Delete a sale and return its units to inventory
    pub async fn delete_sale(&self, user_id: Uuid, sale_id: Uuid) -> AppResult<SaleRemoval> {
        let mut tx = self.db.begin().await?;

        let sale = lock_sale(&mut tx, sale_id, user_id).await?;
        let current = lock_counter(&mut tx, sale.product_id, true).await?;
        let change = stock::reverse_sale(current, sale.quantity)?;
        write_counter(&mut tx, sale.product_id, change.new).await?;

        sqlx::query("DELETE FROM stock_out WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            previous = change.previous,
            new = change.new,
            "Sale deleted"
        );

        Ok(SaleRemoval {
            stock_change: StockMovement::new(sale.product_id, change),
            sale,
        })
    }

    // ========================================================================
    // Adjustments
    // ========================================================================

    /// Manual correction of the counter, recorded in the adjustment log
    pub async fn adjust_stock(&self, user_id: Uuid, input: AdjustStockInput) -> AppResult<StockAdjustment> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        ensure_product(&mut tx, input.product_id).await?;
        let create = input.direction == AdjustmentDirection::Increase;
        let current = lock_counter(&mut tx, input.product_id, create).await?;
        let change = stock::apply_adjustment(current, input.adjustment_quantity, input.direction)?;

        write_counter(&mut tx, input.product_id, change.new).await?;

        let adjustment = sqlx::query_as::<_, StockAdjustment>(
            r#"
            INSERT INTO stock_adjustments
                (product_id, user_id, direction, quantity, previous_quantity, new_quantity, reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, product_id, user_id, direction, quantity, previous_quantity, new_quantity,
                      reason, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(user_id)
        .bind(input.direction.as_str())
        .bind(input.adjustment_quantity)
        .bind(change.previous)
        .bind(change.new)
        .bind(input.reason.trim())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %input.product_id,
            direction = %input.direction,
            previous = change.previous,
            new = change.new,
            "Stock adjusted"
        );

        Ok(adjustment)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All counters, by product name
    pub async fn list_stock(&self) -> AppResult<Vec<StockCounter>> {
        let counters = sqlx::query_as::<_, StockCounter>(
            r#"
            SELECT s.id, s.product_id, p.name AS product_name, s.quantity, s.cost_price,
                   s.selling_price, s.created_at, s.updated_at
            FROM stock s
            JOIN products p ON p.id = s.product_id
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(counters)
    }

    /// Counter for one product
    pub async fn get_stock(&self, product_id: Uuid) -> AppResult<StockCounter> {
        sqlx::query_as::<_, StockCounter>(
            r#"
            SELECT s.id, s.product_id, p.name AS product_name, s.quantity, s.cost_price,
                   s.selling_price, s.created_at, s.updated_at
            FROM stock s
            JOIN products p ON p.id = s.product_id
            WHERE s.product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))
    }

    /// Adjustment history, newest first
    pub async fn list_adjustments(&self, filter: &AdjustmentFilter) -> AppResult<Vec<StockAdjustment>> {
        let adjustments = sqlx::query_as::<_, StockAdjustment>(
            r#"
            SELECT id, product_id, user_id, direction, quantity, previous_quantity, new_quantity,
                   reason, created_at
            FROM stock_adjustments
            WHERE ($1::uuid IS NULL OR product_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(adjustments)
    }

    /// Ledger totals and availability for one product
    pub async fn get_summary(&self, product_id: Uuid) -> AppResult<StockSummary> {
        let query = format!("{LEDGER_TOTALS_SQL} WHERE p.id = $1");
        let row = sqlx::query_as::<_, LedgerTotalsRow>(&query)
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let available_stock = row.counter_quantity.unwrap_or(0);
        let consistent = row.drift() == 0;

        Ok(StockSummary {
            consistent,
            product_id: row.product_id,
            product_name: row.product_name,
            total_stock_in: row.total_stock_in,
            total_stock_out: row.total_stock_out,
            total_adjusted: row.total_adjusted,
            available_stock,
            stock_status: StockStatus::from_quantity(available_stock),
        })
    }

    /// Products whose counter does not match purchases - sales + adjustments
    pub async fn reconcile(&self) -> AppResult<Vec<StockDrift>> {
        let query = format!("{LEDGER_TOTALS_SQL} ORDER BY p.name");
        let rows = sqlx::query_as::<_, LedgerTotalsRow>(&query)
            .fetch_all(&self.db)
            .await?;

        let drifted: Vec<StockDrift> = rows
            .into_iter()
            .filter(|row| row.drift() != 0)
            .map(|row| StockDrift {
                ledger_quantity: row.ledger_quantity(),
                drift: row.drift(),
                counter_quantity: row.counter_quantity.unwrap_or(0),
                product_id: row.product_id,
                product_name: row.product_name,
            })
            .collect();

        if !drifted.is_empty() {
            tracing::warn!(products = drifted.len(), "Stock counters drifted from ledgers");
        }

        Ok(drifted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(stock_in: i64, stock_out: i64, adjusted: i64, counter: Option<i32>) -> LedgerTotalsRow {
        LedgerTotalsRow {
            product_id: Uuid::new_v4(),
            product_name: "Widget".to_string(),
            total_stock_in: stock_in,
            total_stock_out: stock_out,
            total_adjusted: adjusted,
            counter_quantity: counter,
        }
    }

    #[test]
    fn test_drift_is_zero_when_counter_matches() {
        assert_eq!(totals(100, 30, -10, Some(60)).drift(), 0);
        assert_eq!(totals(0, 0, 0, None).drift(), 0);
    }

    #[test]
    fn test_drift_after_clamped_delete() {
        // bought 5, sold 5, purchase deleted: counter 0 but ledger says -5
        let row = totals(0, 5, 0, Some(0));
        assert_eq!(row.ledger_quantity(), -5);
        assert_eq!(row.drift(), 5);
    }

    #[test]
    fn test_adjustment_input_requires_reason() {
        let input = AdjustStockInput {
            product_id: Uuid::new_v4(),
            adjustment_quantity: 10,
            direction: AdjustmentDirection::Decrease,
            reason: "  ".to_string(),
        };
        assert!(matches!(
            input.validate(),
            Err(AppError::Validation { ref field, .. }) if field == "reason"
        ));
    }

    #[test]
    fn test_adjustment_input_requires_positive_quantity() {
        let input = AdjustStockInput {
            product_id: Uuid::new_v4(),
            adjustment_quantity: 0,
            direction: AdjustmentDirection::Increase,
            reason: "recount".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
