//! Crossing detection logic
//!
//! Determines when an incoming order is marketable against a resting price

use types::numeric::Price;
use types::order::Side;

/// Check if a bid and ask can match at given prices
///
/// For a buy order to match with a sell order the buy price must be at or
/// above the sell price. Two resting prices for which this holds mean the
/// book is crossed.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming order can match against a resting order
///
/// `limit` of None is a market order and crosses any resting price.
pub fn crosses(incoming_side: Side, limit: Option<Price>, resting_price: Price) -> bool {
    match (incoming_side, limit) {
        (_, None) => true,
        (Side::Buy, Some(limit)) => can_match(limit, resting_price),
        (Side::Sell, Some(limit)) => can_match(resting_price, limit),
    }
}
