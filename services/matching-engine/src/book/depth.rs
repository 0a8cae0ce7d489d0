//! Point-in-time depth snapshots
//!
//! A snapshot is copied out of the book when it is requested, so it never
//! changes underneath a reader and can be iterated as many times as needed.

use serde::{Deserialize, Serialize};
use types::numeric::{Price, Quantity};
use types::order::Side;

/// Aggregated view of one price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub order_count: usize,
}

/// The best `n` levels of one book side, best price first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub side: Side,
    levels: Vec<DepthLevel>,
}

impl DepthSnapshot {
    pub(crate) fn new(side: Side, levels: Vec<DepthLevel>) -> Self {
        Self { side, levels }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DepthLevel> {
        self.levels.iter()
    }

    /// `(price, aggregate quantity)` pairs, best first
    pub fn pairs(&self) -> impl Iterator<Item = (Price, Quantity)> + '_ {
        self.levels.iter().map(|level| (level.price, level.quantity))
    }

    pub fn best(&self) -> Option<&DepthLevel> {
        self.levels.first()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl<'a> IntoIterator for &'a DepthSnapshot {
    type Item = &'a DepthLevel;
    type IntoIter = std::slice::Iter<'a, DepthLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}

impl IntoIterator for DepthSnapshot {
    type Item = DepthLevel;
    type IntoIter = std::vec::IntoIter<DepthLevel>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.into_iter()
    }
}
