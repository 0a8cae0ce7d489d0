//! Event structures for matching engine
//!
//! Every state change of the book is announced as a `BookEvent` carrying the
//! engine's global sequence number. Events of one call are handed to the
//! `EventSink` only after the call has fully succeeded, in the order they
//! happened.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use types::ids::{OrderId, TraderId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// Unmatched remainder went to rest on the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRestingEvent {
    pub sequence: u64,
    pub order_id: OrderId,
    pub trader_id: TraderId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

/// Order left the book (or never reached it) without being filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCanceledEvent {
    pub sequence: u64,
    pub order_id: OrderId,
    pub side: Side,
    /// None for market orders
    pub price: Option<Price>,
    /// Quantity that was still open, not the original quantity
    pub canceled_quantity: Quantity,
    pub reason: CancelReason,
}

/// Resting quantity was reduced in place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmendedEvent {
    pub sequence: u64,
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    pub old_quantity: Quantity,
    pub new_quantity: Quantity,
}

/// Why an order was canceled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    /// Explicit cancel request
    UserRequested,
    /// Remainder of an immediate-or-cancel or market order
    ImmediateOrCancel,
    /// Fill-or-kill order that could not be filled in full
    FillOrKill,
}

/// Book event stream record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookEvent {
    Trade(Trade),
    Resting(OrderRestingEvent),
    Canceled(OrderCanceledEvent),
    Amended(OrderAmendedEvent),
}

impl BookEvent {
    pub fn sequence(&self) -> u64 {
        match self {
            BookEvent::Trade(trade) => trade.sequence,
            BookEvent::Resting(event) => event.sequence,
            BookEvent::Canceled(event) => event.sequence,
            BookEvent::Amended(event) => event.sequence,
        }
    }

    /// Short label for logs and metrics
    pub fn event_type_label(&self) -> &'static str {
        match self {
            BookEvent::Trade(_) => "trade",
            BookEvent::Resting(_) => "resting",
            BookEvent::Canceled(_) => "canceled",
            BookEvent::Amended(_) => "amended",
        }
    }
}

/// Consumer of the engine's event stream
///
/// Market data, journaling and benchmark collaborators implement this.
pub trait EventSink {
    fn publish(&mut self, event: &BookEvent);

    fn publish_all(&mut self, events: &[BookEvent]) {
        for event in events {
            self.publish(event);
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _event: &BookEvent) {}
}

/// Records events in memory
impl EventSink for Vec<BookEvent> {
    fn publish(&mut self, event: &BookEvent) {
        self.push(event.clone());
    }

    fn publish_all(&mut self, events: &[BookEvent]) {
        self.extend_from_slice(events);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn publish(&mut self, event: &BookEvent) {
        (**self).publish(event);
    }
}

/// Writes every event to the `tracing` pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&mut self, event: &BookEvent) {
        match event {
            BookEvent::Trade(trade) => info!(
                sequence = trade.sequence,
                maker_order_id = %trade.maker_order_id,
                taker_order_id = %trade.taker_order_id,
                price = %trade.price,
                quantity = %trade.quantity,
                "Trade executed"
            ),
            BookEvent::Resting(event) => debug!(
                sequence = event.sequence,
                order_id = %event.order_id,
                side = ?event.side,
                price = %event.price,
                quantity = %event.quantity,
                "Order resting"
            ),
            BookEvent::Canceled(event) => debug!(
                sequence = event.sequence,
                order_id = %event.order_id,
                canceled_quantity = %event.canceled_quantity,
                reason = ?event.reason,
                "Order canceled"
            ),
            BookEvent::Amended(event) => debug!(
                sequence = event.sequence,
                order_id = %event.order_id,
                old_quantity = %event.old_quantity,
                new_quantity = %event.new_quantity,
                "Order amended"
            ),
        }
    }
}
