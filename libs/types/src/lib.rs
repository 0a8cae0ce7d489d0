//! Types library for the limit order book
//!
//! This library provides the core type definitions shared by the matching engine
//! and its collaborators (market data, persistence, benchmarking), so that every
//! layer agrees on identifiers, tick/lot arithmetic and the error taxonomy.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId, TraderId)
//! - `numeric`: Integer tick/lot types (Price, Quantity)
//! - `order`: Order entity, side and time-in-force
//! - `trade`: Trade execution record
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::errors::*;
}
