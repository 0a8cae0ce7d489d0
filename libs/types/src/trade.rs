//! Trade execution types
//!
//! A trade is an ephemeral record of one maker/taker match. It always executes
//! at the maker's price, so any price improvement goes to the taker.

use crate::ids::{OrderId, TraderId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// A single maker/taker match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub sequence: u64,  // Global monotonic sequence

    // Order references
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,

    // Participants
    pub maker_trader_id: TraderId,
    pub taker_trader_id: TraderId,

    // Trade details (from taker perspective)
    pub taker_side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker_trader_id: TraderId,
        taker_trader_id: TraderId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            sequence,
            maker_order_id,
            taker_order_id,
            maker_trader_id,
            taker_trader_id,
            taker_side,
            price,
            quantity,
        }
    }

    /// Calculate trade value (price × quantity) in tick-lots
    pub fn notional(&self) -> i128 {
        self.quantity.notional(self.price)
    }

    /// Order id of the buying leg
    pub fn buy_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.taker_order_id,
            Side::Sell => self.maker_order_id,
        }
    }

    /// Order id of the selling leg
    pub fn sell_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.maker_order_id,
            Side::Sell => self.taker_order_id,
        }
    }

    pub fn buy_trader_id(&self) -> TraderId {
        match self.taker_side {
            Side::Buy => self.taker_trader_id,
            Side::Sell => self.maker_trader_id,
        }
    }

    pub fn sell_trader_id(&self) -> TraderId {
        match self.taker_side {
            Side::Buy => self.maker_trader_id,
            Side::Sell => self.taker_trader_id,
        }
    }
}
