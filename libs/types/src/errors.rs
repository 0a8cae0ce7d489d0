//! Error types for the matching engine
//!
//! Caller-facing validation failures live in `OrderError`; they never change
//! book state. `EngineError::InvariantViolation` is the internal-bug class and
//! is fatal for the engine instance that raised it.

use crate::ids::OrderId;
use crate::numeric::{Price, Quantity};
use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Invariant violated: {reason}")]
    InvariantViolation { reason: String },

    #[error("Engine halted after an invariant violation")]
    Halted,
}

impl EngineError {
    pub fn invariant(reason: impl Into<String>) -> Self {
        EngineError::InvariantViolation { reason: reason.into() }
    }

    /// Fatal errors leave the engine unusable for further writes
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InvariantViolation { .. } | EngineError::Halted)
    }
}

/// Order-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Unknown order id: {order_id}")]
    UnknownOrderId { order_id: OrderId },

    #[error("Duplicate order id: {order_id}")]
    DuplicateOrderId { order_id: OrderId },

    #[error("Order id {order_id} already issued; next free id is {next}")]
    StaleOrderId { order_id: OrderId, next: OrderId },

    #[error("Order id space exhausted at {order_id}")]
    OrderIdExhausted { order_id: OrderId },

    #[error("Quantity {quantity} at price {price} would overflow the level total")]
    QuantityOverflow { price: Price, quantity: Quantity },

    #[error("Invalid amendment for order {order_id}: requested {requested}, remaining {remaining}")]
    InvalidAmendment {
        order_id: OrderId,
        requested: Quantity,
        remaining: Quantity,
    },

    #[error("Invalid price: {price} outside [{min}, {max}]")]
    InvalidPrice { price: Price, min: Price, max: Price },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: Quantity },
}
