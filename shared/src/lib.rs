//! Shared types and domain rules for the Stockbook platform
//!
//! The stock transition rules and money arithmetic live here, free of any
//! database or HTTP concerns, so they can be tested in isolation and reused
//! by the backend services.

pub mod finance;
pub mod models;
pub mod stock;
pub mod types;
pub mod validation;

pub use finance::*;
pub use models::*;
pub use stock::*;
pub use types::*;
pub use validation::*;
