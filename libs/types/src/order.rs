//! Order lifecycle types
//!
//! An order is `Arrived → Matching → {PartiallyFilled | Filled | Resting}` and
//! leaves the book either fully filled or canceled. Identity (`order_id`,
//! `side`, `price`, `sequence`) is fixed at arrival; only the remaining
//! quantity changes afterwards, and it only ever decreases.

use crate::ids::{OrderId, TraderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Pricing instruction of an incoming order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Crosses only while the opposite best price is at or better than `price`
    Limit { price: Price },
    /// No price limit; never rests
    Market,
}

impl OrderType {
    /// Limit price, if any
    pub fn limit_price(&self) -> Option<Price> {
        match self {
            OrderType::Limit { price } => Some(*price),
            OrderType::Market => None,
        }
    }
}

/// Time-in-force policy for the unmatched remainder of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-Till-Cancel: remainder rests until filled or explicitly canceled
    #[default]
    GTC,
    /// Immediate-Or-Cancel: match immediately, cancel remainder
    IOC,
    /// Fill-Or-Kill: full match or reject entirely
    FOK,
}

/// Final outcome of a submit call for the incoming order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Disposition {
    /// Completely matched (terminal)
    Filled,
    /// Some quantity matched; the remainder is resting on the book
    PartiallyFilled,
    /// Nothing matched; the whole order is resting on the book
    Resting,
    /// The remainder was canceled instead of resting (IOC or market order).
    /// Any quantity matched before that is reported through the trades.
    Canceled,
    /// Fill-or-kill order that could not be filled in full; nothing happened
    Killed,
}

impl Disposition {
    /// True when the incoming order left something on the book
    pub fn is_resting(&self) -> bool {
        matches!(self, Disposition::PartiallyFilled | Disposition::Resting)
    }
}

/// A request to place a new order
///
/// `order_id` is optional: when absent the engine assigns the next id from its
/// own monotonic counter. A caller-supplied id must be at or above every id the
/// engine has already issued or accepted, so an id is never reused even after
/// its order has filled or been canceled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_id: Option<OrderId>,
    pub trader_id: TraderId,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Quantity,
    #[serde(default)]
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// Good-till-cancel limit order with an engine-assigned id
    pub fn limit(side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id: None,
            trader_id: TraderId::default(),
            side,
            order_type: OrderType::Limit { price },
            quantity,
            time_in_force: TimeInForce::GTC,
        }
    }

    /// Market order; the unfilled remainder is canceled
    pub fn market(side: Side, quantity: Quantity) -> Self {
        Self {
            order_id: None,
            trader_id: TraderId::default(),
            side,
            order_type: OrderType::Market,
            quantity,
            time_in_force: TimeInForce::IOC,
        }
    }

    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_trader(mut self, trader_id: TraderId) -> Self {
        self.trader_id = trader_id;
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    /// Whether an unmatched remainder of this request may rest on the book
    pub fn may_rest(&self) -> bool {
        matches!(self.order_type, OrderType::Limit { .. }) && self.time_in_force == TimeInForce::GTC
    }
}

/// An order resting on (or being matched against) the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub trader_id: TraderId,
    pub side: Side,
    pub price: Price,
    pub original_quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Arrival sequence; the sole time-priority tie-break
    pub sequence: u64,
}

impl Order {
    pub fn new(
        order_id: OrderId,
        trader_id: TraderId,
        side: Side,
        price: Price,
        quantity: Quantity,
        sequence: u64,
    ) -> Self {
        Self {
            order_id,
            trader_id,
            side,
            price,
            original_quantity: quantity,
            remaining_quantity: quantity,
            sequence,
        }
    }

    /// Quantity matched so far (including any amended-away quantity)
    pub fn filled_quantity(&self) -> Quantity {
        self.original_quantity.saturating_sub(self.remaining_quantity)
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Check quantity invariant: remaining never exceeds the original quantity
    pub fn check_invariant(&self) -> bool {
        self.remaining_quantity <= self.original_quantity
    }

    /// Apply a fill and return the new remaining quantity
    ///
    /// Returns None, leaving the order untouched, if the fill exceeds what remains.
    pub fn fill(&mut self, quantity: Quantity) -> Option<Quantity> {
        let remaining = self.remaining_quantity.checked_sub(quantity)?;
        self.remaining_quantity = remaining;
        Some(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(quantity: u64) -> Order {
        Order::new(
            OrderId::new(1),
            TraderId::new(9),
            Side::Buy,
            Price::from_ticks(100),
            Quantity::from_lots(quantity),
            1,
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_fill() {
        let mut order = order(10);

        assert_eq!(order.fill(Quantity::from_lots(3)), Some(Quantity::from_lots(7)));
        assert_eq!(order.filled_quantity(), Quantity::from_lots(3));
        assert!(!order.is_filled());
        assert!(order.check_invariant());

        assert_eq!(order.fill(Quantity::from_lots(7)), Some(Quantity::ZERO));
        assert!(order.is_filled());
    }

    #[test]
    fn test_order_overfill_is_rejected() {
        let mut order = order(10);
        assert_eq!(order.fill(Quantity::from_lots(11)), None);
        assert_eq!(order.remaining_quantity, Quantity::from_lots(10));
    }

    #[test]
    fn test_request_may_rest() {
        let limit = OrderRequest::limit(Side::Buy, Price::from_ticks(5), Quantity::from_lots(1));
        assert!(limit.may_rest());
        assert!(!limit.clone().with_time_in_force(TimeInForce::IOC).may_rest());
        assert!(!limit.with_time_in_force(TimeInForce::FOK).may_rest());
        assert!(!OrderRequest::market(Side::Sell, Quantity::from_lots(1)).may_rest());
    }

    #[test]
    fn test_order_type_serialization() {
        let limit = OrderType::Limit { price: Price::from_ticks(12) };
        assert_eq!(serde_json::to_string(&limit).unwrap(), r#"{"type":"LIMIT","price":12}"#);
        assert_eq!(serde_json::to_string(&OrderType::Market).unwrap(), r#"{"type":"MARKET"}"#);
    }

    #[test]
    fn test_request_time_in_force_defaults_to_gtc() {
        let json = r#"{"order_id":null,"trader_id":3,"side":"SELL","order_type":{"type":"LIMIT","price":11},"quantity":100}"#;
        let request: OrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.time_in_force, TimeInForce::GTC);
        assert_eq!(request.order_type.limit_price(), Some(Price::from_ticks(11)));
    }
}
