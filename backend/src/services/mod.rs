//! Business logic services for the Stockbook backend

pub mod auth;
pub mod capital;
pub mod expense;
pub mod product;
pub mod profit;
pub mod purchase;
pub mod reporting;
pub mod sale;
pub mod stock;

pub use auth::AuthService;
pub use capital::CapitalService;
pub use expense::ExpenseService;
pub use product::ProductService;
pub use profit::ProfitService;
pub use purchase::PurchaseService;
pub use reporting::ReportingService;
pub use sale::SaleService;
pub use stock::StockEngine;
