//! Stock consistency tests
//!
//! Tests for the stock counter including:
//! - Each product's counter equals its purchases minus sales plus logged adjustments
//! - Rejected operations leave every counter untouched
//! - Purchase/sale edits and deletes reverse their effect, including edits
//!   that move a record to another product
//! - Concurrent sales against the same counter (database required)

use proptest::prelude::*;
use shared::stock::{
    apply_adjustment, apply_purchase, apply_purchase_update, apply_sale, apply_sale_update,
    ledger_quantity, reverse_purchase, reverse_purchase_clamped, reverse_sale, StockError,
};
use shared::AdjustmentDirection;

// ============================================================================
// Ledger model
// ============================================================================

const PRODUCTS: usize = 2;
const WIDGET: usize = 0;
const GADGET: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    product: usize,
    quantity: i32,
}

/// In-memory mirror of two products' ledgers and counters, driven only
/// through the shared transition rules in the same order the engine uses
#[derive(Debug, Clone, Default, PartialEq)]
struct Ledger {
    counters: [Option<i32>; PRODUCTS],
    purchases: Vec<Entry>,
    sales: Vec<Entry>,
    adjusted: [i64; PRODUCTS],
    clamped: [i64; PRODUCTS],
}

#[derive(Debug, Clone)]
enum Op {
    Purchase(usize, i32),
    Sale(usize, i32),
    UpdatePurchase {
        index: usize,
        product: usize,
        quantity: i32,
    },
    UpdateSale {
        index: usize,
        product: usize,
        quantity: i32,
    },
    DeletePurchase(usize),
    DeleteSale(usize),
    Adjust(usize, i32, AdjustmentDirection),
}

impl Ledger {
    fn apply(&mut self, op: &Op) -> Result<(), StockError> {
        match *op {
            Op::Purchase(product, quantity) => {
                let change = apply_purchase(self.counters[product], quantity)?;
                self.purchases.push(Entry { product, quantity });
                self.counters[product] = Some(change.new);
            }
            Op::Sale(product, quantity) => {
                let change = apply_sale(self.counters[product], quantity)?;
                self.sales.push(Entry { product, quantity });
                self.counters[product] = Some(change.new);
            }
            Op::UpdatePurchase {
                index,
                product,
                quantity,
            } => {
                let Some(old) = self.purchases.get(index).copied() else {
                    return Ok(());
                };
                if old.product == product {
                    let change =
                        apply_purchase_update(self.counters[product], old.quantity, quantity)?;
                    self.counters[product] = Some(change.new);
                } else {
                    let withdrawn = reverse_purchase(self.counters[old.product], old.quantity)?;
                    let added = apply_purchase(self.counters[product], quantity)?;
                    self.counters[old.product] = Some(withdrawn.new);
                    self.counters[product] = Some(added.new);
                }
                self.purchases[index] = Entry { product, quantity };
            }
            Op::UpdateSale {
                index,
                product,
                quantity,
            } => {
                let Some(old) = self.sales.get(index).copied() else {
                    return Ok(());
                };
                if old.product == product {
                    let change = apply_sale_update(self.counters[product], old.quantity, quantity)?;
                    self.counters[product] = Some(change.new);
                } else {
                    let returned = reverse_sale(self.counters[old.product], old.quantity)?;
                    let taken = apply_sale(self.counters[product], quantity)?;
                    self.counters[old.product] = Some(returned.new);
                    self.counters[product] = Some(taken.new);
                }
                self.sales[index] = Entry { product, quantity };
            }
            Op::DeletePurchase(index) => {
                if let Some(old) = self.purchases.get(index).copied() {
                    let clamped = reverse_purchase_clamped(self.counters[old.product], old.quantity)?;
                    self.purchases.remove(index);
                    self.clamped[old.product] += i64::from(clamped.shortfall);
                    self.counters[old.product] = Some(clamped.change.new);
                }
            }
            Op::DeleteSale(index) => {
                if let Some(old) = self.sales.get(index).copied() {
                    let change = reverse_sale(self.counters[old.product], old.quantity)?;
                    self.sales.remove(index);
                    self.counters[old.product] = Some(change.new);
                }
            }
            Op::Adjust(product, quantity, direction) => {
                let change = apply_adjustment(self.counters[product], quantity, direction)?;
                self.adjusted[product] += i64::from(change.delta());
                self.counters[product] = Some(change.new);
            }
        }
        Ok(())
    }

    fn counter(&self, product: usize) -> i32 {
        self.counters[product].unwrap_or(0)
    }

    fn expected(&self, product: usize) -> i64 {
        let total = |entries: &[Entry]| -> i64 {
            entries
                .iter()
                .filter(|e| e.product == product)
                .map(|e| i64::from(e.quantity))
                .sum()
        };
        ledger_quantity(total(&self.purchases), total(&self.sales), self.adjusted[product])
            + self.clamped[product]
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn quantity_strategy() -> impl Strategy<Value = i32> {
    1..200i32
}

fn product_strategy() -> impl Strategy<Value = usize> {
    0..PRODUCTS
}

fn direction_strategy() -> impl Strategy<Value = AdjustmentDirection> {
    prop_oneof![
        Just(AdjustmentDirection::Increase),
        Just(AdjustmentDirection::Decrease),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (product_strategy(), quantity_strategy()).prop_map(|(p, q)| Op::Purchase(p, q)),
        3 => (product_strategy(), quantity_strategy()).prop_map(|(p, q)| Op::Sale(p, q)),
        2 => (0..8usize, product_strategy(), quantity_strategy()).prop_map(|(index, product, quantity)| {
            Op::UpdatePurchase { index, product, quantity }
        }),
        2 => (0..8usize, product_strategy(), quantity_strategy()).prop_map(|(index, product, quantity)| {
            Op::UpdateSale { index, product, quantity }
        }),
        1 => (0..8usize).prop_map(Op::DeletePurchase),
        1 => (0..8usize).prop_map(Op::DeleteSale),
        1 => (product_strategy(), quantity_strategy(), direction_strategy())
            .prop_map(|(p, q, d)| Op::Adjust(p, q, d)),
    ]
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every counter always matches its product's ledgers and never goes negative
    #[test]
    fn prop_counter_matches_ledgers(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = Ledger::default();

        for op in &ops {
            let _ = ledger.apply(op);

            for product in 0..PRODUCTS {
                let counter = ledger.counter(product);
                prop_assert!(counter >= 0, "counter {} went negative after {:?}", product, op);
                prop_assert_eq!(i64::from(counter), ledger.expected(product), "after {:?}", op);
            }
        }
    }

    /// A rejected operation changes neither the counters nor the ledgers
    #[test]
    fn prop_rejection_leaves_state_unchanged(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = Ledger::default();

        for op in &ops {
            let before = ledger.clone();
            if ledger.apply(op).is_err() {
                prop_assert_eq!(&ledger, &before);
            }
        }
    }

    /// Moving a sale hands its units back to the old product and takes the
    /// new quantity from the target, or does nothing at all
    #[test]
    fn prop_moving_a_sale_between_products(
        widgets in quantity_strategy(),
        gadgets in quantity_strategy(),
        sold in quantity_strategy(),
        moved in quantity_strategy(),
    ) {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(WIDGET, widgets)).unwrap();
        ledger.apply(&Op::Purchase(GADGET, gadgets)).unwrap();
        prop_assume!(ledger.apply(&Op::Sale(WIDGET, sold)).is_ok());

        let result = ledger.apply(&Op::UpdateSale { index: 0, product: GADGET, quantity: moved });

        if moved <= gadgets {
            prop_assert!(result.is_ok());
            prop_assert_eq!(ledger.counter(WIDGET), widgets);
            prop_assert_eq!(ledger.counter(GADGET), gadgets - moved);
        } else {
            prop_assert_eq!(result, Err(StockError::InsufficientStock { available: gadgets, requested: moved }));
            prop_assert_eq!(ledger.counter(WIDGET), widgets - sold);
            prop_assert_eq!(ledger.counter(GADGET), gadgets);
        }
    }

    /// Purchasing then deleting the purchase restores the prior quantity
    #[test]
    fn prop_purchase_delete_round_trip(start in 0..500i32, qty in quantity_strategy()) {
        let bought = apply_purchase(Some(start), qty).unwrap();
        let removed = reverse_purchase_clamped(Some(bought.new), qty).unwrap();

        prop_assert_eq!(removed.change.new, start);
        prop_assert!(!removed.was_clamped());
    }

    /// A sale larger than the stock reports the exact shortage
    #[test]
    fn prop_oversell_reports_shortage(available in 0..500i32, extra in 1..100i32) {
        let requested = available + extra;
        let err = apply_sale(Some(available), requested).unwrap_err();

        prop_assert_eq!(err, StockError::InsufficientStock { available, requested });
        prop_assert_eq!(err.shortage(), Some(extra));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_update_reconciliation() {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(WIDGET, 5)).unwrap();
        ledger.apply(&Op::Sale(WIDGET, 3)).unwrap();
        assert_eq!(ledger.counter(WIDGET), 2);

        ledger
            .apply(&Op::UpdateSale {
                index: 0,
                product: WIDGET,
                quantity: 4,
            })
            .unwrap();
        assert_eq!(ledger.counter(WIDGET), 1);

        // 1 on hand + 4 returned is not enough for 6
        let err = ledger
            .apply(&Op::UpdateSale {
                index: 0,
                product: WIDGET,
                quantity: 6,
            })
            .unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                available: 5,
                requested: 6
            }
        );
        assert_eq!(ledger.counter(WIDGET), 1);
    }

    #[test]
    fn test_widget_scenario() {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(WIDGET, 100)).unwrap();
        ledger.apply(&Op::Sale(WIDGET, 30)).unwrap();
        assert_eq!(ledger.counter(WIDGET), 70);

        let err = ledger.apply(&Op::Sale(WIDGET, 80)).unwrap_err();
        assert_eq!(err.shortage(), Some(10));
        assert_eq!(ledger.counter(WIDGET), 70);

        ledger
            .apply(&Op::Adjust(WIDGET, 10, AdjustmentDirection::Decrease))
            .unwrap();
        assert_eq!(ledger.counter(WIDGET), 60);

        assert!(ledger
            .apply(&Op::Adjust(WIDGET, 1000, AdjustmentDirection::Decrease))
            .is_err());
        assert_eq!(ledger.counter(WIDGET), 60);
        assert_eq!(ledger.expected(WIDGET), 60);
    }

    #[test]
    fn test_deleting_sold_purchase_is_clamped() {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(WIDGET, 10)).unwrap();
        ledger.apply(&Op::Sale(WIDGET, 8)).unwrap();
        ledger.apply(&Op::DeletePurchase(0)).unwrap();

        assert_eq!(ledger.counter(WIDGET), 0);
        assert_eq!(ledger.clamped[WIDGET], 8);
        assert_eq!(ledger.expected(WIDGET), 0);
    }

    #[test]
    fn test_sale_without_counter_is_no_stock() {
        assert_eq!(apply_sale(None, 1), Err(StockError::NoStock));
    }

    #[test]
    fn test_moving_sale_to_unstocked_product_is_no_stock() {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(WIDGET, 10)).unwrap();
        ledger.apply(&Op::Sale(WIDGET, 3)).unwrap();
        let before = ledger.clone();

        let err = ledger
            .apply(&Op::UpdateSale {
                index: 0,
                product: GADGET,
                quantity: 1,
            })
            .unwrap_err();

        assert_eq!(err, StockError::NoStock);
        assert_eq!(ledger, before);
        assert_eq!(ledger.counters[GADGET], None);
    }

    #[test]
    fn test_moving_sold_purchase_is_rejected() {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(WIDGET, 10)).unwrap();
        ledger.apply(&Op::Sale(WIDGET, 8)).unwrap();
        let before = ledger.clone();

        let err = ledger
            .apply(&Op::UpdatePurchase {
                index: 0,
                product: GADGET,
                quantity: 10,
            })
            .unwrap_err();

        assert_eq!(
            err,
            StockError::InsufficientStock {
                available: 2,
                requested: 10
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_moving_unsold_purchase_shifts_both_counters() {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(WIDGET, 10)).unwrap();
        ledger.apply(&Op::Purchase(WIDGET, 4)).unwrap();
        ledger.apply(&Op::Sale(WIDGET, 3)).unwrap();

        ledger
            .apply(&Op::UpdatePurchase {
                index: 1,
                product: GADGET,
                quantity: 6,
            })
            .unwrap();

        assert_eq!(ledger.counter(WIDGET), 7);
        assert_eq!(ledger.counter(GADGET), 6);
        assert_eq!(ledger.expected(WIDGET), 7);
        assert_eq!(ledger.expected(GADGET), 6);
    }

    #[test]
    fn test_deleting_sale_restores_counter() {
        let mut ledger = Ledger::default();
        ledger.apply(&Op::Purchase(GADGET, 6)).unwrap();
        ledger.apply(&Op::Sale(GADGET, 4)).unwrap();
        ledger.apply(&Op::DeleteSale(0)).unwrap();

        assert_eq!(ledger.counter(GADGET), 6);
        assert!(ledger.sales.is_empty());
    }
}

// ============================================================================
// Database Tests
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::PgPool;
    use std::str::FromStr;
    use stockbook_backend::error::AppError;
    use stockbook_backend::services::purchase::PurchaseInput;
    use stockbook_backend::services::sale::SaleInput;
    use stockbook_backend::services::stock::AdjustStockInput;
    use stockbook_backend::services::StockEngine;
    use uuid::Uuid;

    use shared::AdjustmentDirection;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .expect("database connection");
        sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
        pool
    }

    async fn seed_user(pool: &PgPool) -> Uuid {
        let phone = format!("08{:08}", Uuid::new_v4().as_u128() % 100_000_000);
        sqlx::query_scalar(
            "INSERT INTO users (name, phone, password_hash) VALUES ('Tester', $1, 'x') RETURNING id",
        )
        .bind(phone)
        .fetch_one(pool)
        .await
        .expect("insert user")
    }

    async fn seed_product(pool: &PgPool, name: &str) -> Uuid {
        sqlx::query_scalar("INSERT INTO products (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .expect("insert product")
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_widget_scenario_against_database() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let product_id = seed_product(&pool, "Widget").await;
        let engine = StockEngine::new(pool.clone());

        let receipt = engine
            .record_purchase(
                user_id,
                PurchaseInput {
                    product_id,
                    quantity: 100,
                    cost_price: dec("2.00"),
                    selling_price: dec("3.00"),
                },
            )
            .await
            .unwrap();
        assert_eq!(receipt.current_stock, 100);

        let sale = engine
            .record_sale(
                user_id,
                SaleInput {
                    product_id,
                    quantity: 30,
                    selling_price: dec("3.50"),
                },
            )
            .await
            .unwrap();
        assert_eq!(sale.remaining_stock, 70);
        assert_eq!(sale.sale.total_amount, dec("105.00"));

        let rejected = engine
            .record_sale(
                user_id,
                SaleInput {
                    product_id,
                    quantity: 80,
                    selling_price: dec("3.50"),
                },
            )
            .await;
        assert!(matches!(
            rejected,
            Err(AppError::InsufficientStock {
                available: 70,
                requested: 80
            })
        ));

        let adjustment = engine
            .adjust_stock(
                user_id,
                AdjustStockInput {
                    product_id,
                    adjustment_quantity: 10,
                    direction: AdjustmentDirection::Decrease,
                    reason: "damaged".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(adjustment.previous_quantity, 70);
        assert_eq!(adjustment.new_quantity, 60);

        let summary = engine.get_summary(product_id).await.unwrap();
        assert_eq!(summary.available_stock, 60);
        assert!(summary.consistent);
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_concurrent_sales_cannot_oversell() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let product_id = seed_product(&pool, "Contended").await;
        let engine = StockEngine::new(pool.clone());

        engine
            .record_purchase(
                user_id,
                PurchaseInput {
                    product_id,
                    quantity: 5,
                    cost_price: dec("1.00"),
                    selling_price: dec("2.00"),
                },
            )
            .await
            .unwrap();

        let sale = SaleInput {
            product_id,
            quantity: 5,
            selling_price: dec("2.00"),
        };
        let (a, b) = tokio::join!(
            engine.record_sale(user_id, sale.clone()),
            engine.record_sale(user_id, sale.clone()),
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert_eq!(engine.get_stock(product_id).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_purchase_delete_restores_counter() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let product_id = seed_product(&pool, "Round trip").await;
        let engine = StockEngine::new(pool.clone());

        let receipt = engine
            .record_purchase(
                user_id,
                PurchaseInput {
                    product_id,
                    quantity: 10,
                    cost_price: dec("1.00"),
                    selling_price: dec("1.50"),
                },
            )
            .await
            .unwrap();
        let removal = engine
            .delete_purchase(user_id, receipt.purchase.id)
            .await
            .unwrap();

        assert_eq!(removal.stock_change.new_quantity, 0);
        assert_eq!(removal.clamped_units, 0);
        assert!(engine.reconcile().await.unwrap().iter().all(|d| d.product_id != product_id));
    }

    async fn stock_purchase(
        engine: &StockEngine,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Uuid {
        engine
            .record_purchase(
                user_id,
                PurchaseInput {
                    product_id,
                    quantity,
                    cost_price: dec("1.00"),
                    selling_price: dec("2.00"),
                },
            )
            .await
            .unwrap()
            .purchase
            .id
    }

    fn sale_of(product_id: Uuid, quantity: i32) -> SaleInput {
        SaleInput {
            product_id,
            quantity,
            selling_price: dec("2.00"),
        }
    }

    async fn quantity(engine: &StockEngine, product_id: Uuid) -> i32 {
        engine.get_stock(product_id).await.unwrap().quantity
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_sale_edit_reconciles_counter() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let product_id = seed_product(&pool, "Edited sale").await;
        let engine = StockEngine::new(pool.clone());

        stock_purchase(&engine, user_id, product_id, 5).await;
        let receipt = engine
            .record_sale(user_id, sale_of(product_id, 3))
            .await
            .unwrap();
        assert_eq!(receipt.remaining_stock, 2);

        let revision = engine
            .update_sale(user_id, receipt.sale.id, sale_of(product_id, 4))
            .await
            .unwrap();
        assert_eq!(revision.previous.quantity, 3);
        assert_eq!(revision.sale.quantity, 4);
        assert_eq!(revision.sale.total_amount, dec("8.00"));
        assert_eq!(revision.stock_changes.len(), 1);
        assert_eq!(revision.stock_changes[0].new_quantity, 1);
        assert_eq!(quantity(&engine, product_id).await, 1);

        let rejected = engine
            .update_sale(user_id, receipt.sale.id, sale_of(product_id, 6))
            .await;
        assert!(matches!(
            rejected,
            Err(AppError::InsufficientStock {
                available: 5,
                requested: 6
            })
        ));
        assert_eq!(quantity(&engine, product_id).await, 1);
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_moving_sale_between_products() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let widget = seed_product(&pool, "Widget").await;
        let gadget = seed_product(&pool, "Gadget").await;
        let unstocked = seed_product(&pool, "Never purchased").await;
        let engine = StockEngine::new(pool.clone());

        stock_purchase(&engine, user_id, widget, 10).await;
        stock_purchase(&engine, user_id, gadget, 4).await;
        let receipt = engine.record_sale(user_id, sale_of(widget, 3)).await.unwrap();
        assert_eq!(receipt.remaining_stock, 7);

        let no_stock = engine
            .update_sale(user_id, receipt.sale.id, sale_of(unstocked, 1))
            .await;
        assert!(matches!(no_stock, Err(AppError::NoStock)));
        assert_eq!(quantity(&engine, widget).await, 7);
        assert!(matches!(
            engine.get_stock(unstocked).await,
            Err(AppError::NotFound(_))
        ));

        let too_many = engine
            .update_sale(user_id, receipt.sale.id, sale_of(gadget, 5))
            .await;
        assert!(matches!(
            too_many,
            Err(AppError::InsufficientStock {
                available: 4,
                requested: 5
            })
        ));
        assert_eq!(quantity(&engine, widget).await, 7);
        assert_eq!(quantity(&engine, gadget).await, 4);

        let revision = engine
            .update_sale(user_id, receipt.sale.id, sale_of(gadget, 4))
            .await
            .unwrap();
        assert_eq!(revision.sale.product_id, gadget);
        assert_eq!(revision.stock_changes.len(), 2);
        assert_eq!(quantity(&engine, widget).await, 10);
        assert_eq!(quantity(&engine, gadget).await, 0);

        let drift = engine.reconcile().await.unwrap();
        assert!(drift
            .iter()
            .all(|d| d.product_id != widget && d.product_id != gadget));
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_moving_sold_purchase_is_rejected() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let widget = seed_product(&pool, "Widget").await;
        let gadget = seed_product(&pool, "Gadget").await;
        let engine = StockEngine::new(pool.clone());

        let purchase_id = stock_purchase(&engine, user_id, widget, 10).await;
        engine.record_sale(user_id, sale_of(widget, 8)).await.unwrap();

        let moved = engine
            .update_purchase(
                user_id,
                purchase_id,
                PurchaseInput {
                    product_id: gadget,
                    quantity: 10,
                    cost_price: dec("1.00"),
                    selling_price: dec("2.00"),
                },
            )
            .await;
        assert!(matches!(
            moved,
            Err(AppError::InsufficientStock {
                available: 2,
                requested: 10
            })
        ));

        // Rolled back: the target counter was never committed
        assert_eq!(quantity(&engine, widget).await, 2);
        assert!(matches!(
            engine.get_stock(gadget).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires database connection
    async fn test_sale_delete_restores_counter() {
        let pool = pool().await;
        let user_id = seed_user(&pool).await;
        let product_id = seed_product(&pool, "Returned").await;
        let engine = StockEngine::new(pool.clone());

        stock_purchase(&engine, user_id, product_id, 6).await;
        let receipt = engine
            .record_sale(user_id, sale_of(product_id, 4))
            .await
            .unwrap();
        assert_eq!(receipt.remaining_stock, 2);

        let removal = engine.delete_sale(user_id, receipt.sale.id).await.unwrap();
        assert_eq!(removal.stock_change.previous_quantity, 2);
        assert_eq!(removal.stock_change.new_quantity, 6);
        assert_eq!(quantity(&engine, product_id).await, 6);

        let again = engine.delete_sale(user_id, receipt.sale.id).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }
}
