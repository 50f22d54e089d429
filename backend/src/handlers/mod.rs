//! HTTP request handlers

pub mod auth;
pub mod capital;
pub mod expense;
pub mod health;
pub mod product;
pub mod profit;
pub mod purchase;
pub mod reporting;
pub mod sale;
pub mod stock;

pub use auth::*;
pub use capital::*;
pub use expense::*;
pub use health::*;
pub use product::*;
pub use profit::*;
pub use purchase::*;
pub use reporting::*;
pub use sale::*;
pub use stock::*;
