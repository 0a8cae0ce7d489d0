//! Matching engine core
//!
//! Main coordinator for the two book sides, the order index and the event
//! stream. Every write runs to completion before returning; events of a write
//! are buffered and published only once the write has succeeded, so a failed
//! call never leaks partial effects to the sink.

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use types::errors::{EngineError, OrderError};
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Disposition, Order, OrderRequest, Side, TimeInForce};
use types::trade::Trade;

use crate::book::{BookSide, DepthSnapshot, Locator, OrderIndex};
use crate::config::{ConfigError, EngineConfig};
use crate::events::{
    BookEvent, CancelReason, EventSink, NullSink, OrderAmendedEvent, OrderCanceledEvent,
    OrderRestingEvent,
};
use crate::matching::{crossing, executor::MatchExecutor};

/// Main matching engine for one instrument
#[derive(Clone)]
pub struct MatchingEngine<S: EventSink = NullSink> {
    config: EngineConfig,
    bids: BookSide,
    asks: BookSide,
    index: OrderIndex,
    /// Trade executor with sequence generation
    executor: MatchExecutor,
    /// Lowest id not yet issued or accepted; None once `u64::MAX` is used
    next_order_id: Option<OrderId>,
    recent_trades: VecDeque<Trade>,
    sink: S,
    /// Set once an invariant violation has been detected
    halted: bool,
}

/// Result of submitting an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub order_id: OrderId,
    pub trades: Vec<Trade>,
    pub disposition: Disposition,
    /// Quantity left resting on the book (zero unless the order rests)
    pub resting_quantity: Quantity,
}

impl SubmitResult {
    pub fn filled_quantity(&self) -> Quantity {
        self.trades.iter().map(|trade| trade.quantity).sum()
    }
}

/// Acknowledgement of a successful cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelAck {
    pub order_id: OrderId,
    pub sequence: u64,
    /// Quantity that was still resting
    pub canceled_quantity: Quantity,
}

/// Acknowledgement of a successful amend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmendAck {
    pub order_id: OrderId,
    pub sequence: u64,
    pub old_quantity: Quantity,
    pub new_quantity: Quantity,
}

/// Best price and aggregate quantity of one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub price: Price,
    pub quantity: Quantity,
}

impl From<(Price, Quantity)> for Quote {
    fn from((price, quantity): (Price, Quantity)) -> Self {
        Self { price, quantity }
    }
}

/// Top of book; None on a side means no liquidity there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestBidAsk {
    pub bid: Option<Quote>,
    pub ask: Option<Quote>,
}

/// Order book depth for market data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDepth {
    pub bids: DepthSnapshot,
    pub asks: DepthSnapshot,
}

impl MatchingEngine<NullSink> {
    /// Create an engine that discards its events
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_sink(config, NullSink)
    }
}

impl Default for MatchingEngine<NullSink> {
    fn default() -> Self {
        Self::build(EngineConfig::default(), NullSink)
    }
}

impl<S: EventSink> MatchingEngine<S> {
    /// Create an engine publishing to `sink`
    pub fn with_sink(config: EngineConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, sink))
    }

    fn build(config: EngineConfig, sink: S) -> Self {
        info!(
            min_price = %config.min_price,
            max_price = %config.max_price,
            starting_sequence = config.starting_sequence,
            verify_invariants = config.verify_invariants,
            "MatchingEngine initialized"
        );

        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            index: OrderIndex::new(),
            executor: MatchExecutor::new(config.starting_sequence),
            next_order_id: Some(config.first_order_id),
            recent_trades: VecDeque::with_capacity(config.recent_trades_capacity),
            sink,
            halted: false,
            config,
        }
    }

    /// Submit a good-till-cancel limit order with an engine-assigned id
    pub fn submit_limit(
        &mut self,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Result<SubmitResult, EngineError> {
        self.submit(OrderRequest::limit(side, price, quantity))
    }

    /// Submit an order to the matching engine
    ///
    /// The order is crossed against the opposite side in price-time priority;
    /// what is left either rests on the book or is canceled, depending on the
    /// order type and time in force.
    pub fn submit(&mut self, request: OrderRequest) -> Result<SubmitResult, EngineError> {
        self.ensure_running()?;
        if let Err(err) = self.validate(&request) {
            warn!(error = %err, side = ?request.side, quantity = %request.quantity, "Order rejected");
            return Err(err.into());
        }

        let result = self.submit_validated(request);
        self.finish(result)
    }

    fn validate(&self, request: &OrderRequest) -> Result<(), OrderError> {
        if request.quantity.is_zero() {
            return Err(OrderError::InvalidQuantity { quantity: request.quantity });
        }
        if let Some(price) = request.order_type.limit_price() {
            if !self.config.price_in_band(price) {
                return Err(OrderError::InvalidPrice {
                    price,
                    min: self.config.min_price,
                    max: self.config.max_price,
                });
            }
        }
        match (request.order_id, self.next_order_id) {
            (Some(order_id), _) if self.index.contains(order_id) => {
                return Err(OrderError::DuplicateOrderId { order_id });
            }
            (Some(order_id), Some(next)) if order_id < next => {
                return Err(OrderError::StaleOrderId { order_id, next });
            }
            (Some(order_id), None) => return Err(OrderError::OrderIdExhausted { order_id }),
            (None, None) => {
                return Err(OrderError::OrderIdExhausted {
                    order_id: OrderId::new(u64::MAX),
                })
            }
            _ => {}
        }
        if let Some(price) = request.order_type.limit_price().filter(|_| request.may_rest()) {
            let level = self.side(request.side).level_at(price);
            if level.map_or(false, |level| !level.can_absorb(request.quantity)) {
                return Err(OrderError::QuantityOverflow {
                    price,
                    quantity: request.quantity,
                });
            }
        }
        Ok(())
    }

    fn submit_validated(
        &mut self,
        request: OrderRequest,
    ) -> Result<(SubmitResult, Vec<BookEvent>), EngineError> {
        let order_id = self.allocate_order_id(request.order_id)?;
        let sequence = self.executor.next_sequence();
        let limit = request.order_type.limit_price();
        // Market orders never rest, so their stored price is only a placeholder
        let price = limit.unwrap_or(match request.side {
            Side::Buy => Price::MAX,
            Side::Sell => Price::MIN,
        });
        let mut taker = Order::new(
            order_id,
            request.trader_id,
            request.side,
            price,
            request.quantity,
            sequence,
        );
        let mut events = Vec::new();

        let (opposite, own) = match request.side {
            Side::Buy => (&mut self.asks, &mut self.bids),
            Side::Sell => (&mut self.bids, &mut self.asks),
        };

        if request.time_in_force == TimeInForce::FOK
            && opposite.marketable_quantity(limit, request.quantity) < request.quantity
        {
            events.push(BookEvent::Canceled(OrderCanceledEvent {
                sequence: self.executor.next_sequence(),
                order_id,
                side: request.side,
                price: limit,
                canceled_quantity: request.quantity,
                reason: CancelReason::FillOrKill,
            }));
            let result = SubmitResult {
                order_id,
                trades: Vec::new(),
                disposition: Disposition::Killed,
                resting_quantity: Quantity::zero(),
            };
            return Ok((result, events));
        }

        let trades = Self::match_incoming(
            opposite,
            &mut self.index,
            &mut self.executor,
            &mut taker,
            limit,
        )?;
        events.extend(trades.iter().cloned().map(BookEvent::Trade));

        let remaining = taker.remaining_quantity;
        let (disposition, resting_quantity) = if remaining.is_zero() {
            (Disposition::Filled, Quantity::zero())
        } else if request.may_rest() {
            let resting_sequence = self.executor.next_sequence();
            events.push(BookEvent::Resting(OrderRestingEvent {
                sequence: resting_sequence,
                order_id,
                trader_id: taker.trader_id,
                side: taker.side,
                price,
                quantity: remaining,
            }));

            let handle = own.insert_level(price).enqueue(taker).ok_or_else(|| {
                EngineError::invariant(format!("level {} total overflowed resting order {}", price, order_id))
            })?;
            let locator = Locator {
                side: request.side,
                price,
                handle,
            };
            self.index.put(order_id, locator).map_err(|err| {
                EngineError::invariant(format!("resting order {} could not be indexed: {}", order_id, err))
            })?;

            let disposition = if trades.is_empty() {
                Disposition::Resting
            } else {
                Disposition::PartiallyFilled
            };
            (disposition, remaining)
        } else {
            events.push(BookEvent::Canceled(OrderCanceledEvent {
                sequence: self.executor.next_sequence(),
                order_id,
                side: request.side,
                price: limit,
                canceled_quantity: remaining,
                reason: CancelReason::ImmediateOrCancel,
            }));
            (Disposition::Canceled, Quantity::zero())
        };

        self.check_not_crossed()?;

        let result = SubmitResult {
            order_id,
            trades,
            disposition,
            resting_quantity,
        };
        Ok((result, events))
    }

    /// Cross the taker against `opposite` until it is filled or no longer marketable
    fn match_incoming(
        opposite: &mut BookSide,
        index: &mut OrderIndex,
        executor: &mut MatchExecutor,
        taker: &mut Order,
        limit: Option<Price>,
    ) -> Result<Vec<Trade>, EngineError> {
        let mut trades = Vec::new();

        while !taker.remaining_quantity.is_zero() {
            let Some(level) = opposite.best_level_mut() else {
                break;
            };
            let level_price = level.price();
            if !crossing::crosses(taker.side, limit, level_price) {
                break;
            }

            let (handle, trade) = match (level.front_handle(), level.peek_front()) {
                (Some(handle), Some(maker)) => {
                    let fill = taker.remaining_quantity.min(maker.remaining_quantity);
                    (handle, executor.execute_trade(maker, taker, fill)?)
                }
                _ => {
                    return Err(EngineError::invariant(format!(
                        "best level {} has no front order",
                        level_price
                    )))
                }
            };

            let maker_remaining = level.reduce(handle, trade.quantity).ok_or_else(|| {
                EngineError::invariant(format!("maker {} cannot absorb fill", trade.maker_order_id))
            })?;
            taker.fill(trade.quantity).ok_or_else(|| {
                EngineError::invariant(format!("taker {} overfilled", taker.order_id))
            })?;

            if maker_remaining.is_zero() {
                level.pop_front();
                index.remove(trade.maker_order_id).map_err(|_| {
                    EngineError::invariant(format!(
                        "filled maker {} missing from index",
                        trade.maker_order_id
                    ))
                })?;
                opposite.remove_level_if_empty(level_price);
            }

            trades.push(trade);
        }

        Ok(trades)
    }

    /// Cancel a resting order
    pub fn cancel(&mut self, order_id: OrderId) -> Result<CancelAck, EngineError> {
        self.ensure_running()?;
        let locator = match self.index.get(order_id) {
            Ok(locator) => locator,
            Err(err) => {
                warn!(order_id = %order_id, "Cancel rejected: unknown order id");
                return Err(err.into());
            }
        };

        let result = self.cancel_located(order_id, locator);
        self.finish(result)
    }

    fn cancel_located(
        &mut self,
        order_id: OrderId,
        locator: Locator,
    ) -> Result<(CancelAck, Vec<BookEvent>), EngineError> {
        let side = self.side_mut(locator.side);
        let level = side.level_at_mut(locator.price).ok_or_else(|| {
            EngineError::invariant(format!("order {} points at missing level {}", order_id, locator.price))
        })?;
        if level.get(locator.handle).map(|order| order.order_id) != Some(order_id) {
            return Err(EngineError::invariant(format!("stale locator for order {}", order_id)));
        }
        let order = level.remove(locator.handle).ok_or_else(|| {
            EngineError::invariant(format!("order {} vanished from level {}", order_id, locator.price))
        })?;
        side.remove_level_if_empty(locator.price);
        self.index.remove(order_id)?;

        let sequence = self.executor.next_sequence();
        let ack = CancelAck {
            order_id,
            sequence,
            canceled_quantity: order.remaining_quantity,
        };
        let event = BookEvent::Canceled(OrderCanceledEvent {
            sequence,
            order_id,
            side: order.side,
            price: Some(order.price),
            canceled_quantity: order.remaining_quantity,
            reason: CancelReason::UserRequested,
        });
        Ok((ack, vec![event]))
    }

    /// Reduce the quantity of a resting order, keeping its time priority
    ///
    /// Increasing quantity or changing price is a cancel plus a new submit.
    pub fn amend(&mut self, order_id: OrderId, new_quantity: Quantity) -> Result<AmendAck, EngineError> {
        self.ensure_running()?;
        let locator = match self.index.get(order_id) {
            Ok(locator) => locator,
            Err(err) => {
                warn!(order_id = %order_id, "Amend rejected: unknown order id");
                return Err(err.into());
            }
        };

        let remaining = self
            .side(locator.side)
            .level_at(locator.price)
            .and_then(|level| level.get(locator.handle))
            .filter(|order| order.order_id == order_id)
            .map(|order| order.remaining_quantity);
        let Some(remaining) = remaining else {
            return self.finish(Err(EngineError::invariant(format!(
                "stale locator for order {}",
                order_id
            ))));
        };

        if new_quantity.is_zero() || new_quantity >= remaining {
            warn!(
                order_id = %order_id,
                requested = %new_quantity,
                remaining = %remaining,
                "Amend rejected: quantity must decrease and stay positive"
            );
            return Err(OrderError::InvalidAmendment {
                order_id,
                requested: new_quantity,
                remaining,
            }
            .into());
        }

        let result = self.amend_located(order_id, locator, remaining, new_quantity);
        self.finish(result)
    }

    fn amend_located(
        &mut self,
        order_id: OrderId,
        locator: Locator,
        remaining: Quantity,
        new_quantity: Quantity,
    ) -> Result<(AmendAck, Vec<BookEvent>), EngineError> {
        let reduction = remaining
            .checked_sub(new_quantity)
            .ok_or_else(|| EngineError::invariant("amend reduction underflow"))?;
        self.side_mut(locator.side)
            .level_at_mut(locator.price)
            .and_then(|level| level.reduce(locator.handle, reduction))
            .ok_or_else(|| EngineError::invariant(format!("order {} cannot be reduced", order_id)))?;

        let sequence = self.executor.next_sequence();
        let ack = AmendAck {
            order_id,
            sequence,
            old_quantity: remaining,
            new_quantity,
        };
        let event = BookEvent::Amended(OrderAmendedEvent {
            sequence,
            order_id,
            side: locator.side,
            price: locator.price,
            old_quantity: remaining,
            new_quantity,
        });
        Ok((ack, vec![event]))
    }

    /// Common tail of every write: audit, then publish or halt
    fn finish<T>(&mut self, result: Result<(T, Vec<BookEvent>), EngineError>) -> Result<T, EngineError> {
        let result = result.and_then(|(value, events)| {
            if self.config.verify_invariants {
                self.check_invariants()?;
            }
            Ok((value, events))
        });

        match result {
            Ok((value, events)) => {
                for event in &events {
                    if let BookEvent::Trade(trade) = event {
                        self.record_trade(trade.clone());
                    }
                    debug!(
                        sequence = event.sequence(),
                        event_type = event.event_type_label(),
                        "Book event"
                    );
                }
                self.sink.publish_all(&events);
                Ok(value)
            }
            Err(err) => {
                if err.is_fatal() {
                    error!(error = %err, "Halting matching engine");
                    self.halted = true;
                }
                Err(err)
            }
        }
    }

    fn record_trade(&mut self, trade: Trade) {
        if self.config.recent_trades_capacity == 0 {
            return;
        }
        if self.recent_trades.len() == self.config.recent_trades_capacity {
            self.recent_trades.pop_front();
        }
        self.recent_trades.push_back(trade);
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        if self.halted {
            return Err(EngineError::Halted);
        }
        Ok(())
    }

    /// Hand out the requested or next id and move the high-water mark past it
    ///
    /// `validate` has already rejected ids below the mark.
    fn allocate_order_id(&mut self, requested: Option<OrderId>) -> Result<OrderId, EngineError> {
        let order_id = requested
            .or(self.next_order_id)
            .ok_or_else(|| EngineError::invariant("order id allocated after exhaustion"))?;
        self.next_order_id = order_id.next();
        Ok(order_id)
    }

    fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn check_not_crossed(&self) -> Result<(), EngineError> {
        if let (Some(bid), Some(ask)) = (self.bids.best_price(), self.asks.best_price()) {
            if crossing::can_match(bid, ask) {
                return Err(EngineError::invariant(format!(
                    "book crossed: best bid {} >= best ask {}",
                    bid, ask
                )));
            }
        }
        Ok(())
    }

    /// Full audit of the book: level totals, ordering, no cross, index bijection
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        self.bids.check_invariants()?;
        self.asks.check_invariants()?;
        self.check_not_crossed()?;

        let resting = self.bids.order_count() + self.asks.order_count();
        if resting != self.index.len() {
            return Err(EngineError::invariant(format!(
                "{} resting orders but {} index entries",
                resting,
                self.index.len()
            )));
        }
        for (order_id, locator) in self.index.iter() {
            let found = self
                .side(locator.side)
                .level_at(locator.price)
                .and_then(|level| level.get(locator.handle))
                .map(|order| order.order_id);
            if found != Some(*order_id) {
                return Err(EngineError::invariant(format!(
                    "index entry for {} does not resolve",
                    order_id
                )));
            }
        }
        Ok(())
    }

    /// Best price and aggregate quantity on each side, O(1)
    pub fn best_bid_ask(&self) -> BestBidAsk {
        BestBidAsk {
            bid: self.bids.best_quote().map(Quote::from),
            ask: self.asks.best_quote().map(Quote::from),
        }
    }

    /// Best ask minus best bid in ticks, when both sides have liquidity
    pub fn spread(&self) -> Option<i64> {
        let bid = self.bids.best_price()?;
        let ask = self.asks.best_price()?;
        ask.ticks_above(bid)
    }

    /// Point-in-time snapshot of the best `levels` levels per side
    pub fn depth(&self, levels: usize) -> BookDepth {
        BookDepth {
            bids: self.bids.depth(levels),
            asks: self.asks.depth(levels),
        }
    }

    /// Look up a resting order
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let locator = self.index.get(order_id).ok()?;
        self.side(locator.side)
            .level_at(locator.price)?
            .get(locator.handle)
    }

    /// The last `n` trades, oldest first
    pub fn recent_trades(&self, n: usize) -> impl Iterator<Item = &Trade> {
        let skip = self.recent_trades.len().saturating_sub(n);
        self.recent_trades.iter().skip(skip)
    }

    /// Number of resting orders
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    /// Sequence number the next event or arrival will receive
    pub fn next_sequence(&self) -> u64 {
        self.executor.peek_sequence()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
