//! Order id to book location index
//!
//! Holds a non-owning locator for every resting order so cancel and amend go
//! straight to the order's slot instead of scanning levels. Entries exist
//! exactly while the order rests on the book.

use std::collections::HashMap;
use types::errors::OrderError;
use types::ids::OrderId;
use types::numeric::Price;
use types::order::Side;

use super::price_level::OrderHandle;

/// Where a resting order lives: side, level, and slot within the level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    pub side: Side,
    pub price: Price,
    pub handle: OrderHandle,
}

/// Hash index over resting orders
#[derive(Debug, Clone, Default)]
pub struct OrderIndex {
    entries: HashMap<OrderId, Locator>,
}

impl OrderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locator; fails if the id is already present
    pub fn put(&mut self, order_id: OrderId, locator: Locator) -> Result<(), OrderError> {
        match self.entries.entry(order_id) {
            std::collections::hash_map::Entry::Occupied(_) => {
                Err(OrderError::DuplicateOrderId { order_id })
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(locator);
                Ok(())
            }
        }
    }

    pub fn get(&self, order_id: OrderId) -> Result<Locator, OrderError> {
        self.entries
            .get(&order_id)
            .copied()
            .ok_or(OrderError::UnknownOrderId { order_id })
    }

    pub fn remove(&mut self, order_id: OrderId) -> Result<Locator, OrderError> {
        self.entries
            .remove(&order_id)
            .ok_or(OrderError::UnknownOrderId { order_id })
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.entries.contains_key(&order_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OrderId, &Locator)> {
        self.entries.iter()
    }
}
