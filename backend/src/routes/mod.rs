//! Route definitions for the Stockbook API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
///
/// Everything except registration and login sits behind the bearer-token gate.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .nest("/products", product_routes())
        .nest("/purchases", purchase_routes())
        .nest("/stock", stock_routes())
        .nest("/stock-out", sale_routes())
        .nest("/capital", capital_routes())
        .nest("/expenses", expense_routes())
        .nest("/profits", profit_routes())
        .nest("/reports", report_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Auth routes (public)
        .nest("/auth", auth_routes())
        .merge(protected)
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// Product registry routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Purchase routes
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_purchases).post(handlers::create_purchase))
        .route("/summary", get(handlers::get_purchase_summary))
        .route(
            "/:purchase_id",
            get(handlers::get_purchase)
                .put(handlers::update_purchase)
                .delete(handlers::delete_purchase),
        )
}

/// Stock counter routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route("/reconcile", get(handlers::reconcile_stock))
        .route("/adjustments", get(handlers::list_adjustments))
        .route("/adjust", post(handlers::adjust_stock))
        .route("/:product_id", get(handlers::get_stock))
}

/// Sales ("stock-out") routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/summary/:product_id", get(handlers::get_sale_summary))
        .route(
            "/:sale_id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
}

/// Capital investment routes
fn capital_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_investments).post(handlers::create_investment))
        .route("/my-investments", get(handlers::my_investments))
        .route("/summary", get(handlers::get_capital_summary))
        .route(
            "/:investment_id",
            get(handlers::get_investment)
                .put(handlers::update_investment)
                .delete(handlers::delete_investment),
        )
}

/// Expense routes
fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_expenses).post(handlers::create_expense))
        .route("/summary", get(handlers::get_expense_summary))
        .route(
            "/:expense_id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
}

/// Profit record routes
fn profit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_profits).post(handlers::create_profit))
        .route("/summary", get(handlers::get_profit_summary))
        .route(
            "/:profit_id",
            get(handlers::get_profit)
                .put(handlers::update_profit)
                .delete(handlers::delete_profit),
        )
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/sales", get(handlers::get_sales_report))
        .route("/inventory", get(handlers::get_inventory_report))
        .route("/profit-loss", get(handlers::get_profit_loss_report))
        .route("/product-performance", get(handlers::get_product_performance_report))
}
