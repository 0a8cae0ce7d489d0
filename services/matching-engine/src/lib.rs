//! Matching Engine
//!
//! Single-instrument limit order book with strict price-time priority
//! matching.
//!
//! **Key Invariants:**
//! - The book is never crossed after a call returns
//! - Each price level's aggregate equals the sum of its orders' remaining quantities
//! - Every resting order is reachable through the order index, and only those
//! - Deterministic matching (same inputs → same outputs and event stream)
//!
//! ```
//! use matching_engine::{EngineConfig, MatchingEngine};
//! use types::numeric::{Price, Quantity};
//! use types::order::Side;
//!
//! let mut engine = MatchingEngine::new(EngineConfig::default()).unwrap();
//! engine.submit_limit(Side::Sell, Price::from_ticks(101), Quantity::from_lots(5)).unwrap();
//! let result = engine.submit_limit(Side::Buy, Price::from_ticks(102), Quantity::from_lots(2)).unwrap();
//! assert_eq!(result.trades[0].price, Price::from_ticks(101));
//! ```

pub mod book;
pub mod matching;
pub mod engine;
pub mod events;
pub mod config;
pub mod shared;

pub use config::{ConfigError, EngineConfig};
pub use engine::{AmendAck, BestBidAsk, BookDepth, CancelAck, MatchingEngine, Quote, SubmitResult};
pub use events::{BookEvent, CancelReason, EventSink, NullSink, TracingSink};
pub use shared::SharedEngine;
