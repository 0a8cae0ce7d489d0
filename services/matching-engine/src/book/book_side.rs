//! One side of the order book
//!
//! Bids are ordered by price descending (best bid first), asks ascending (best
//! ask first). Both sides share the same storage: a `BTreeMap` keyed by price,
//! which gives O(log P) level insert/erase and deterministic iteration. The best
//! price is cached so top-of-book reads are O(1).

use std::collections::btree_map::{self, BTreeMap};
use types::errors::EngineError;
use types::numeric::{Price, Quantity};
use types::order::Side;

use super::depth::{DepthLevel, DepthSnapshot};
use super::price_level::PriceLevel;
use crate::matching::crossing;

/// Bid or ask side of the book
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    /// Price levels in ascending key order; `side` decides which end is best
    levels: BTreeMap<Price, PriceLevel>,
    /// Cached best price
    best: Option<Price>,
}

impl BookSide {
    /// Create a new empty book side
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            best: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Whether `a` is nearer the spread than `b` on this side
    pub fn is_better(&self, a: Price, b: Price) -> bool {
        match self.side {
            Side::Buy => a > b,
            Side::Sell => a < b,
        }
    }

    /// Best price, O(1)
    pub fn best_price(&self) -> Option<Price> {
        self.best
    }

    /// Best price with its aggregate quantity
    pub fn best_quote(&self) -> Option<(Price, Quantity)> {
        self.best_level().map(|level| (level.price(), level.total_quantity()))
    }

    /// The level nearest the spread
    pub fn best_level(&self) -> Option<&PriceLevel> {
        self.best.and_then(|price| self.levels.get(&price))
    }

    pub(crate) fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        let price = self.best?;
        self.levels.get_mut(&price)
    }

    pub fn level_at(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub(crate) fn level_at_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Get the level at `price`, creating it in sorted position if absent
    pub fn insert_level(&mut self, price: Price) -> &mut PriceLevel {
        match self.best {
            Some(best) if !self.is_better(price, best) => {}
            _ => self.best = Some(price),
        }
        self.levels.entry(price).or_insert_with(|| PriceLevel::new(price))
    }

    /// Erase the level at `price`
    ///
    /// Only valid for an existing, empty level.
    pub fn remove_level(&mut self, price: Price) -> Result<(), EngineError> {
        match self.levels.get(&price) {
            None => {
                return Err(EngineError::invariant(format!(
                    "{:?} level {} does not exist",
                    self.side, price
                )))
            }
            Some(level) if !level.is_empty() => {
                return Err(EngineError::invariant(format!(
                    "{:?} level {} still holds {} orders",
                    self.side,
                    price,
                    level.order_count()
                )))
            }
            Some(_) => {}
        }

        self.levels.remove(&price);
        if self.best == Some(price) {
            self.best = self.edge_price();
        }
        Ok(())
    }

    /// Erase the level at `price` if it has no orders left
    ///
    /// Returns true if a level was removed.
    pub(crate) fn remove_level_if_empty(&mut self, price: Price) -> bool {
        let empty = self.levels.get(&price).map_or(false, PriceLevel::is_empty);
        if empty {
            self.levels.remove(&price);
            if self.best == Some(price) {
                self.best = self.edge_price();
            }
        }
        empty
    }

    fn edge_price(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// Iterate levels from the best price outward
    pub fn levels(&self) -> Levels<'_> {
        Levels {
            inner: self.levels.values(),
            descending: self.side == Side::Buy,
        }
    }

    /// Point-in-time snapshot of the best `n` levels
    pub fn depth(&self, n: usize) -> DepthSnapshot {
        let levels = self
            .levels()
            .take(n)
            .map(|level| DepthLevel {
                price: level.price(),
                quantity: level.total_quantity(),
                order_count: level.order_count(),
            })
            .collect();
        DepthSnapshot::new(self.side, levels)
    }

    /// Quantity an incoming order on the other side could take, capped at `cap`
    ///
    /// `limit` of None means no price limit (market order).
    pub fn marketable_quantity(&self, limit: Option<Price>, cap: Quantity) -> Quantity {
        let incoming = self.side.opposite();
        let mut available = Quantity::zero();
        for level in self.levels() {
            if available >= cap || !crossing::crosses(incoming, limit, level.price()) {
                break;
            }
            available = available.saturating_add(level.total_quantity());
        }
        available
    }

    /// Check if the book side is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get the total number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Number of resting orders across all levels
    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::order_count).sum()
    }

    /// Resting quantity across all levels, saturating at `u64::MAX` lots
    pub fn total_quantity(&self) -> Quantity {
        self.levels.values().map(PriceLevel::total_quantity).sum()
    }

    /// Full structural audit of this side
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        for (price, level) in &self.levels {
            if level.price() != *price {
                return Err(EngineError::invariant(format!(
                    "{:?} level keyed at {} reports price {}",
                    self.side,
                    price,
                    level.price()
                )));
            }
            if level.is_empty() {
                return Err(EngineError::invariant(format!(
                    "{:?} level {} is empty but still present",
                    self.side, price
                )));
            }
            if !level.check_invariant() {
                return Err(EngineError::invariant(format!(
                    "{:?} level {} total {} does not match its orders",
                    self.side,
                    price,
                    level.total_quantity()
                )));
            }
            if level.iter().any(|order| order.side != self.side) {
                return Err(EngineError::invariant(format!(
                    "{:?} level {} holds an order of the wrong side",
                    self.side, price
                )));
            }
        }
        if self.best != self.edge_price() {
            return Err(EngineError::invariant(format!(
                "{:?} cached best {:?} differs from {:?}",
                self.side,
                self.best,
                self.edge_price()
            )));
        }
        Ok(())
    }
}

/// Levels of one side, best price first
pub struct Levels<'a> {
    inner: btree_map::Values<'a, Price, PriceLevel>,
    descending: bool,
}

impl<'a> Iterator for Levels<'a> {
    type Item = &'a PriceLevel;

    fn next(&mut self) -> Option<Self::Item> {
        if self.descending {
            self.inner.next_back()
        } else {
            self.inner.next()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
