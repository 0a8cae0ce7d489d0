//! Thread-safe engine handle
//!
//! The engine itself is single-writer. `SharedEngine` puts it behind a
//! `parking_lot::RwLock` so many readers can query the book concurrently while
//! writes are serialized, each write running to completion under the lock.

use std::sync::Arc;

use parking_lot::RwLock;
use types::errors::EngineError;
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::OrderRequest;

use crate::engine::{AmendAck, BestBidAsk, BookDepth, CancelAck, MatchingEngine, SubmitResult};
use crate::events::{EventSink, NullSink};

/// Cloneable handle to one engine shared across threads
pub struct SharedEngine<S: EventSink = NullSink> {
    inner: Arc<RwLock<MatchingEngine<S>>>,
}

impl<S: EventSink> Clone for SharedEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: EventSink> From<MatchingEngine<S>> for SharedEngine<S> {
    fn from(engine: MatchingEngine<S>) -> Self {
        Self::new(engine)
    }
}

impl<S: EventSink> SharedEngine<S> {
    pub fn new(engine: MatchingEngine<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn submit(&self, request: OrderRequest) -> Result<SubmitResult, EngineError> {
        self.inner.write().submit(request)
    }

    pub fn cancel(&self, order_id: OrderId) -> Result<CancelAck, EngineError> {
        self.inner.write().cancel(order_id)
    }

    pub fn amend(&self, order_id: OrderId, new_quantity: Quantity) -> Result<AmendAck, EngineError> {
        self.inner.write().amend(order_id, new_quantity)
    }

    pub fn best_bid_ask(&self) -> BestBidAsk {
        self.inner.read().best_bid_ask()
    }

    pub fn depth(&self, levels: usize) -> BookDepth {
        self.inner.read().depth(levels)
    }

    /// Run `f` against a consistent view of the engine
    pub fn read<R>(&self, f: impl FnOnce(&MatchingEngine<S>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access, e.g. to drain a sink
    pub fn write<R>(&self, f: impl FnOnce(&mut MatchingEngine<S>) -> R) -> R {
        f(&mut self.inner.write())
    }
}
