//! Reporting service for analytics and data export
//! Provides dashboard, sales, inventory, profit & loss and product performance reports

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{GroupBy, PerformanceTier, Period, Profitability, StockLevel, StockThresholds};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Report filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product_id: Option<Uuid>,
}

impl ReportFilter {
    fn period(&self) -> AppResult<Period> {
        shared::validate_date_range(self.start_date, self.end_date)
            .map_err(|m| AppError::validation("start_date", m))?;
        Ok(Period::new(self.start_date, self.end_date))
    }
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub total_products: i64,
    pub stock: StockTotals,
    pub sales: SalesTotals,
    pub expenses: ExpenseTotals,
    pub total_capital: Decimal,
    pub profitability: DashboardProfitability,
    pub period: Period,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockTotals {
    pub total_stock_entries: i64,
    pub total_quantity: i64,
    pub total_stock_value: Decimal,
    pub potential_revenue: Decimal,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SalesTotals {
    pub total_sales: i64,
    pub total_quantity_sold: i64,
    pub total_sales_amount: Decimal,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ExpenseTotals {
    pub total_expenses: i64,
    pub total_expense_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DashboardProfitability {
    pub cost_of_goods_sold: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    pub profit_margin: Decimal,
}

impl From<Profitability> for DashboardProfitability {
    fn from(p: Profitability) -> Self {
        Self {
            cost_of_goods_sold: p.cost_of_goods_sold,
            gross_profit: p.gross_profit,
            net_profit: p.net_profit,
            profit_margin: p.net_margin,
        }
    }
}

/// Flat metric row used when the dashboard is exported
#[derive(Debug, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub value: String,
}

impl Dashboard {
    pub fn metric_rows(&self) -> Vec<MetricRow> {
        let row = |metric, value: &dyn ToString| MetricRow {
            metric,
            value: value.to_string(),
        };
        vec![
            row("total_products", &self.total_products),
            row("total_stock_entries", &self.stock.total_stock_entries),
            row("total_quantity", &self.stock.total_quantity),
            row("total_stock_value", &self.stock.total_stock_value),
            row("potential_revenue", &self.stock.potential_revenue),
            row("total_sales", &self.sales.total_sales),
            row("total_quantity_sold", &self.sales.total_quantity_sold),
            row("total_sales_amount", &self.sales.total_sales_amount),
            row("total_expenses", &self.expenses.total_expenses),
            row("total_expense_amount", &self.expenses.total_expense_amount),
            row("total_capital", &self.total_capital),
            row("cost_of_goods_sold", &self.profitability.cost_of_goods_sold),
            row("gross_profit", &self.profitability.gross_profit),
            row("net_profit", &self.profitability.net_profit),
            row("profit_margin", &self.profitability.profit_margin),
        ]
    }
}

// ============================================================================
// Sales
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SalesReportQuery {
    pub group_by: Option<String>,
}

impl SalesReportQuery {
    /// Missing means daily; anything unrecognised is rejected
    pub fn group_by(&self) -> AppResult<GroupBy> {
        match self.group_by.as_deref() {
            None => Ok(GroupBy::default()),
            Some(value) => value
                .parse()
                .map_err(|_| AppError::validation("group_by", "group_by must be one of day, week, month")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SalesReport {
    pub sales_by_period: Vec<SalesPeriod>,
    pub top_selling_products: Vec<TopSellingProduct>,
    pub group_by: GroupBy,
    pub period: Period,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SalesPeriod {
    pub period: String,
    pub total_transactions: i64,
    pub total_quantity: i64,
    pub total_sales: Decimal,
    pub avg_sale_amount: Decimal,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TopSellingProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_transactions: i64,
    pub total_quantity_sold: i64,
    pub total_sales_amount: Decimal,
    pub avg_selling_price: Decimal,
}

// ============================================================================
// Inventory
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub low_stock_threshold: Option<i32>,
    pub overstock_threshold: Option<i32>,
}

impl InventoryQuery {
    /// Query values override the configured thresholds
    pub fn thresholds(&self, defaults: StockThresholds) -> AppResult<StockThresholds> {
        let thresholds = StockThresholds {
            low_stock: self.low_stock_threshold.unwrap_or(defaults.low_stock),
            overstock: self.overstock_threshold.unwrap_or(defaults.overstock),
        };
        if thresholds.low_stock < 0 {
            return Err(AppError::validation(
                "low_stock_threshold",
                "low_stock_threshold must not be negative",
            ));
        }
        if thresholds.overstock < thresholds.low_stock {
            return Err(AppError::validation(
                "overstock_threshold",
                "overstock_threshold must not be below low_stock_threshold",
            ));
        }
        Ok(thresholds)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    product_id: Uuid,
    product_name: String,
    total_stock_in: i64,
    total_stock_out: i64,
    current_stock: i32,
    cost_price: Option<Decimal>,
    selling_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductStockLevel {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_stock_in: i64,
    pub total_stock_out: i64,
    pub current_stock: i32,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub stock_value: Decimal,
    pub stock_level: StockLevel,
}

#[derive(Debug, Serialize)]
pub struct InventoryReport {
    pub all_products: Vec<ProductStockLevel>,
    pub low_stock_products: Vec<ProductStockLevel>,
    pub out_of_stock_products: Vec<ProductStockLevel>,
    pub overstocked_products: Vec<ProductStockLevel>,
    pub summary: InventorySummary,
}

#[derive(Debug, Serialize)]
pub struct InventorySummary {
    pub total_products: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
    pub overstocked_count: usize,
    pub total_stock_value: Decimal,
    pub thresholds: StockThresholds,
}

impl InventoryReport {
    fn build(rows: Vec<InventoryRow>, thresholds: StockThresholds) -> Self {
        let all_products: Vec<ProductStockLevel> = rows
            .into_iter()
            .map(|row| ProductStockLevel {
                // Counter (i32) times a NUMERIC(14, 2) price cannot overflow Decimal
                stock_value: shared::round_money(
                    Decimal::from(row.current_stock) * row.cost_price.unwrap_or_default(),
                ),
                stock_level: thresholds.classify(row.current_stock),
                product_id: row.product_id,
                product_name: row.product_name,
                total_stock_in: row.total_stock_in,
                total_stock_out: row.total_stock_out,
                current_stock: row.current_stock,
                cost_price: row.cost_price,
                selling_price: row.selling_price,
            })
            .collect();

        let pick = |keep: &dyn Fn(i32) -> bool| -> Vec<ProductStockLevel> {
            all_products
                .iter()
                .filter(|p| keep(p.current_stock))
                .cloned()
                .collect()
        };
        let low_stock_products = pick(&|q: i32| thresholds.is_low(q));
        let out_of_stock_products = pick(&|q: i32| thresholds.is_out_of_stock(q));
        let overstocked_products = pick(&|q: i32| thresholds.is_overstocked(q));

        let summary = InventorySummary {
            total_products: all_products.len(),
            low_stock_count: low_stock_products.len(),
            out_of_stock_count: out_of_stock_products.len(),
            overstocked_count: overstocked_products.len(),
            total_stock_value: all_products.iter().map(|p| p.stock_value).sum(),
            thresholds,
        };

        Self {
            all_products,
            low_stock_products,
            out_of_stock_products,
            overstocked_products,
            summary,
        }
    }
}

// ============================================================================
// Profit & Loss
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProfitLossReport {
    pub revenue: Decimal,
    pub total_transactions: i64,
    pub cost_of_goods_sold: Decimal,
    pub gross_profit: Decimal,
    pub operating_expenses: Vec<ExpenseCategoryLine>,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub gross_margin: Decimal,
    pub net_margin: Decimal,
    pub period: Period,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ExpenseCategoryLine {
    pub category: String,
    pub expense_type: String,
    pub total_amount: Decimal,
    pub count: i64,
}

// ============================================================================
// Product performance
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PerformanceRow {
    product_id: Uuid,
    product_name: String,
    total_sales_transactions: i64,
    total_quantity_sold: i64,
    total_sales_revenue: Decimal,
    avg_selling_price: Option<Decimal>,
    min_selling_price: Option<Decimal>,
    max_selling_price: Option<Decimal>,
    current_stock: i32,
    cost_of_goods_sold: Decimal,
    total_in: i64,
    total_out: i64,
}

#[derive(Debug, Serialize)]
pub struct ProductPerformance {
    pub product_id: Uuid,
    pub product_name: String,
    pub total_sales_transactions: i64,
    pub total_quantity_sold: i64,
    pub total_sales_revenue: Decimal,
    pub avg_selling_price: Option<Decimal>,
    pub min_selling_price: Option<Decimal>,
    pub max_selling_price: Option<Decimal>,
    pub current_stock: i32,
    pub total_profit: Decimal,
    pub stock_turnover_ratio: Decimal,
    pub profit_margin: Decimal,
    pub avg_sale_size: Decimal,
    pub performance_status: PerformanceTier,
}

impl From<PerformanceRow> for ProductPerformance {
    fn from(row: PerformanceRow) -> Self {
        let total_profit = row.total_sales_revenue - row.cost_of_goods_sold;
        Self {
            stock_turnover_ratio: shared::ratio(Decimal::from(row.total_out), Decimal::from(row.total_in)),
            profit_margin: shared::percentage(total_profit, row.total_sales_revenue),
            avg_sale_size: shared::ratio(
                Decimal::from(row.total_quantity_sold),
                Decimal::from(row.total_sales_transactions),
            ),
            performance_status: PerformanceTier::from_units_sold(row.total_quantity_sold),
            total_profit,
            product_id: row.product_id,
            product_name: row.product_name,
            total_sales_transactions: row.total_sales_transactions,
            total_quantity_sold: row.total_quantity_sold,
            total_sales_revenue: row.total_sales_revenue,
            avg_selling_price: row.avg_selling_price,
            min_selling_price: row.min_selling_price,
            max_selling_price: row.max_selling_price,
            current_stock: row.current_stock,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductPerformanceReport {
    pub products: Vec<ProductPerformance>,
    pub summary: PerformanceSummary,
    pub period: Period,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceSummary {
    pub total_products_analyzed: usize,
    pub high_performers: usize,
    pub medium_performers: usize,
    pub low_performers: usize,
}

impl PerformanceSummary {
    fn tally(products: &[ProductPerformance]) -> Self {
        products.iter().fold(
            PerformanceSummary {
                total_products_analyzed: products.len(),
                ..Default::default()
            },
            |mut summary, p| {
                match p.performance_status {
                    PerformanceTier::High => summary.high_performers += 1,
                    PerformanceTier::Medium => summary.medium_performers += 1,
                    PerformanceTier::Low => summary.low_performers += 1,
                }
                summary
            },
        )
    }
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Cost of goods sold in the period, valued at each product's current cost price
    async fn cost_of_goods_sold(&self, filter: &ReportFilter) -> AppResult<Decimal> {
        let cogs: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(so.quantity * COALESCE(s.cost_price, 0)), 0)
            FROM stock_out so
            LEFT JOIN stock s ON s.product_id = so.product_id
            WHERE ($1::date IS NULL OR so.created_at::date >= $1)
              AND ($2::date IS NULL OR so.created_at::date <= $2)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        Ok(cogs)
    }

    /// Get dashboard metrics
    pub async fn get_dashboard(&self, filter: &ReportFilter) -> AppResult<Dashboard> {
        let period = filter.period()?;

        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db)
            .await?;

        // Stock totals are a snapshot of the counters, not period-bound
        let stock = sqlx::query_as::<_, StockTotals>(
            r#"
            SELECT COUNT(*) AS total_stock_entries,
                   COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
                   COALESCE(SUM(quantity * COALESCE(cost_price, 0)), 0) AS total_stock_value,
                   COALESCE(SUM(quantity * COALESCE(selling_price, 0)), 0) AS potential_revenue
            FROM stock
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, SalesTotals>(
            r#"
            SELECT COUNT(*) AS total_sales,
                   COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity_sold,
                   COALESCE(SUM(total_amount), 0) AS total_sales_amount
            FROM stock_out
            WHERE ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let expenses = sqlx::query_as::<_, ExpenseTotals>(
            r#"
            SELECT COUNT(*) AS total_expenses,
                   COALESCE(SUM(amount), 0) AS total_expense_amount
            FROM expenses
            WHERE ($1::date IS NULL OR expense_date >= $1)
              AND ($2::date IS NULL OR expense_date <= $2)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let total_capital: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM capital_investments
            WHERE ($1::date IS NULL OR investment_date >= $1)
              AND ($2::date IS NULL OR investment_date <= $2)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let cogs = self.cost_of_goods_sold(filter).await?;
        let profitability = Profitability::compute(
            sales.total_sales_amount,
            cogs,
            expenses.total_expense_amount,
        );

        Ok(Dashboard {
            total_products,
            stock,
            sales,
            expenses,
            total_capital,
            profitability: profitability.into(),
            period,
        })
    }

    /// Sales bucketed by day, week or month plus the ten best sellers
    pub async fn get_sales_report(&self, filter: &ReportFilter, group_by: GroupBy) -> AppResult<SalesReport> {
        let period = filter.period()?;

        let unit = group_by.as_str();
        let label = group_by.label_format();
        let by_period_query = format!(
            r#"
            SELECT TO_CHAR(DATE_TRUNC('{unit}', so.created_at), '{label}') AS period,
                   COUNT(*) AS total_transactions,
                   SUM(so.quantity)::BIGINT AS total_quantity,
                   SUM(so.total_amount) AS total_sales,
                   ROUND(AVG(so.total_amount), 2) AS avg_sale_amount
            FROM stock_out so
            WHERE ($1::date IS NULL OR so.created_at::date >= $1)
              AND ($2::date IS NULL OR so.created_at::date <= $2)
              AND ($3::uuid IS NULL OR so.product_id = $3)
            GROUP BY DATE_TRUNC('{unit}', so.created_at)
            ORDER BY DATE_TRUNC('{unit}', so.created_at) DESC
            "#
        );

        let sales_by_period = sqlx::query_as::<_, SalesPeriod>(&by_period_query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.product_id)
            .fetch_all(&self.db)
            .await?;

        let top_selling_products = sqlx::query_as::<_, TopSellingProduct>(
            r#"
            SELECT so.product_id, p.name AS product_name,
                   COUNT(*) AS total_transactions,
                   SUM(so.quantity)::BIGINT AS total_quantity_sold,
                   SUM(so.total_amount) AS total_sales_amount,
                   ROUND(AVG(so.selling_price), 2) AS avg_selling_price
            FROM stock_out so
            JOIN products p ON p.id = so.product_id
            WHERE ($1::date IS NULL OR so.created_at::date >= $1)
              AND ($2::date IS NULL OR so.created_at::date <= $2)
              AND ($3::uuid IS NULL OR so.product_id = $3)
            GROUP BY so.product_id, p.name
            ORDER BY total_sales_amount DESC
            LIMIT 10
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(SalesReport {
            sales_by_period,
            top_selling_products,
            group_by,
            period,
        })
    }

    /// Every product's counter classified against the thresholds
    pub async fn get_inventory_report(&self, thresholds: StockThresholds) -> AppResult<InventoryReport> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   COALESCE(pin.total_in, 0)::BIGINT AS total_stock_in,
                   COALESCE(pout.total_out, 0)::BIGINT AS total_stock_out,
                   COALESCE(s.quantity, 0) AS current_stock,
                   s.cost_price, s.selling_price
            FROM products p
            LEFT JOIN stock s ON s.product_id = p.id
            LEFT JOIN (
                SELECT product_id, SUM(quantity) AS total_in FROM purchases GROUP BY product_id
            ) pin ON pin.product_id = p.id
            LEFT JOIN (
                SELECT product_id, SUM(quantity) AS total_out FROM stock_out GROUP BY product_id
            ) pout ON pout.product_id = p.id
            ORDER BY current_stock ASC, p.name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(InventoryReport::build(rows, thresholds))
    }

    pub async fn get_profit_loss(&self, filter: &ReportFilter) -> AppResult<ProfitLossReport> {
        let period = filter.period()?;

        let (revenue, total_transactions): (Decimal, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM stock_out
            WHERE ($1::date IS NULL OR created_at::date >= $1)
              AND ($2::date IS NULL OR created_at::date <= $2)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.db)
        .await?;

        let cogs = self.cost_of_goods_sold(filter).await?;

        let operating_expenses = sqlx::query_as::<_, ExpenseCategoryLine>(
            r#"
            SELECT category, expense_type, SUM(amount) AS total_amount, COUNT(*) AS count
            FROM expenses
            WHERE ($1::date IS NULL OR expense_date >= $1)
              AND ($2::date IS NULL OR expense_date <= $2)
            GROUP BY category, expense_type
            ORDER BY total_amount DESC
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        let total_expenses: Decimal = operating_expenses.iter().map(|line| line.total_amount).sum();
        let p = Profitability::compute(revenue, cogs, total_expenses);

        Ok(ProfitLossReport {
            revenue,
            total_transactions,
            cost_of_goods_sold: p.cost_of_goods_sold,
            gross_profit: p.gross_profit,
            operating_expenses,
            total_expenses,
            net_profit: p.net_profit,
            gross_margin: p.gross_margin,
            net_margin: p.net_margin,
            period,
        })
    }

    /// Per-product sales in the period against all-time stock flow
    pub async fn get_product_performance(&self, filter: &ReportFilter) -> AppResult<ProductPerformanceReport> {
        let period = filter.period()?;

        let rows = sqlx::query_as::<_, PerformanceRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name,
                   COUNT(so.id) AS total_sales_transactions,
                   COALESCE(SUM(so.quantity), 0)::BIGINT AS total_quantity_sold,
                   COALESCE(SUM(so.total_amount), 0) AS total_sales_revenue,
                   ROUND(AVG(so.selling_price), 2) AS avg_selling_price,
                   MIN(so.selling_price) AS min_selling_price,
                   MAX(so.selling_price) AS max_selling_price,
                   COALESCE(s.quantity, 0) AS current_stock,
                   COALESCE(SUM(so.quantity * COALESCE(s.cost_price, 0)), 0) AS cost_of_goods_sold,
                   COALESCE(pin.total_in, 0)::BIGINT AS total_in,
                   COALESCE(pout.total_out, 0)::BIGINT AS total_out
            FROM products p
            LEFT JOIN stock_out so ON so.product_id = p.id
                AND ($1::date IS NULL OR so.created_at::date >= $1)
                AND ($2::date IS NULL OR so.created_at::date <= $2)
            LEFT JOIN stock s ON s.product_id = p.id
            LEFT JOIN (
                SELECT product_id, SUM(quantity) AS total_in FROM purchases GROUP BY product_id
            ) pin ON pin.product_id = p.id
            LEFT JOIN (
                SELECT product_id, SUM(quantity) AS total_out FROM stock_out GROUP BY product_id
            ) pout ON pout.product_id = p.id
            GROUP BY p.id, p.name, s.quantity, pin.total_in, pout.total_out
            ORDER BY total_sales_revenue DESC, p.name ASC
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        let products: Vec<ProductPerformance> = rows.into_iter().map(ProductPerformance::from).collect();
        let summary = PerformanceSummary::tally(&products);

        Ok(ProductPerformanceReport {
            products,
            summary,
            period,
        })
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn inventory_row(name: &str, current_stock: i32, cost: &str) -> InventoryRow {
        InventoryRow {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            total_stock_in: 0,
            total_stock_out: 0,
            current_stock,
            cost_price: Some(dec(cost)),
            selling_price: None,
        }
    }

    #[test]
    fn test_group_by_defaults_to_day_and_rejects_unknown() {
        let query = SalesReportQuery { group_by: None };
        assert_eq!(query.group_by().unwrap(), GroupBy::Day);

        let query = SalesReportQuery {
            group_by: Some("year".to_string()),
        };
        assert!(matches!(
            query.group_by(),
            Err(AppError::Validation { ref field, .. }) if field == "group_by"
        ));
    }

    #[test]
    fn test_inventory_thresholds_override_config() {
        let query = InventoryQuery {
            low_stock_threshold: Some(5),
            overstock_threshold: None,
        };
        let thresholds = query.thresholds(StockThresholds::default()).unwrap();
        assert_eq!(thresholds.low_stock, 5);
        assert_eq!(thresholds.overstock, 100);

        let negative = InventoryQuery {
            low_stock_threshold: Some(-1),
            overstock_threshold: None,
        };
        assert!(negative.thresholds(StockThresholds::default()).is_err());
    }

    #[test]
    fn test_inventory_report_buckets_products() {
        let rows = vec![
            inventory_row("empty", 0, "1.00"),
            inventory_row("few", 4, "2.50"),
            inventory_row("plenty", 50, "1.00"),
            inventory_row("glut", 150, "0.10"),
        ];
        let report = InventoryReport::build(rows, StockThresholds::default());

        assert_eq!(report.summary.total_products, 4);
        // Zero stock is both low and out of stock
        assert_eq!(report.summary.low_stock_count, 2);
        assert_eq!(report.summary.out_of_stock_count, 1);
        assert_eq!(report.summary.overstocked_count, 1);
        assert_eq!(report.summary.total_stock_value, dec("75.00"));
        assert_eq!(report.all_products[0].stock_level, StockLevel::OutOfStock);
        assert_eq!(report.all_products[3].stock_level, StockLevel::Overstocked);
    }

    #[test]
    fn test_product_performance_derivations() {
        let row = PerformanceRow {
            product_id: Uuid::new_v4(),
            product_name: "Widget".to_string(),
            total_sales_transactions: 4,
            total_quantity_sold: 30,
            total_sales_revenue: dec("105.00"),
            avg_selling_price: Some(dec("3.50")),
            min_selling_price: Some(dec("3.50")),
            max_selling_price: Some(dec("3.50")),
            current_stock: 70,
            cost_of_goods_sold: dec("60.00"),
            total_in: 100,
            total_out: 30,
        };
        let perf = ProductPerformance::from(row);

        assert_eq!(perf.total_profit, dec("45.00"));
        assert_eq!(perf.stock_turnover_ratio, dec("0.30"));
        assert_eq!(perf.profit_margin, dec("42.86"));
        assert_eq!(perf.avg_sale_size, dec("7.50"));
        assert_eq!(perf.performance_status, PerformanceTier::Medium);
    }

    #[test]
    fn test_turnover_is_zero_without_purchases() {
        let row = PerformanceRow {
            product_id: Uuid::new_v4(),
            product_name: "Ghost".to_string(),
            total_sales_transactions: 0,
            total_quantity_sold: 0,
            total_sales_revenue: Decimal::ZERO,
            avg_selling_price: None,
            min_selling_price: None,
            max_selling_price: None,
            current_stock: 0,
            cost_of_goods_sold: Decimal::ZERO,
            total_in: 0,
            total_out: 0,
        };
        let perf = ProductPerformance::from(row);
        assert_eq!(perf.stock_turnover_ratio, Decimal::ZERO);
        assert_eq!(perf.profit_margin, Decimal::ZERO);
        assert_eq!(perf.performance_status, PerformanceTier::Low);
    }

    #[test]
    fn test_csv_export_writes_header_and_rows() {
        let rows = vec![
            MetricRow {
                metric: "total_products",
                value: "3".to_string(),
            },
            MetricRow {
                metric: "net_profit",
                value: "12.50".to_string(),
            },
        ];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        assert_eq!(csv, "metric,value\ntotal_products,3\nnet_profit,12.50\n");
    }
}
