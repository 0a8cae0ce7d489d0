//! Order book infrastructure module
//!
//! Contains price levels, book sides, depth snapshots and the order index.

pub mod price_level;
pub mod book_side;
pub mod depth;
pub mod order_index;

pub use price_level::{OrderHandle, PriceLevel};
pub use book_side::BookSide;
pub use depth::{DepthLevel, DepthSnapshot};
pub use order_index::{Locator, OrderIndex};
