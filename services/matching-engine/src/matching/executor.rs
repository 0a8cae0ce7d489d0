//! Trade execution logic
//!
//! Owns the engine's global sequence counter and turns maker/taker matches
//! into trades.

use types::errors::EngineError;
use types::numeric::Quantity;
use types::order::Order;
use types::trade::Trade;

/// Match executor for handling trade generation
#[derive(Debug, Clone)]
pub struct MatchExecutor {
    sequence_counter: u64,
}

impl MatchExecutor {
    /// Create a new match executor with starting sequence number
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            sequence_counter: starting_sequence,
        }
    }

    /// Get next sequence number (monotonically increasing)
    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Sequence number the next call to `next_sequence` will return
    pub fn peek_sequence(&self) -> u64 {
        self.sequence_counter
    }

    /// Execute a trade between a resting maker and the incoming taker
    ///
    /// The trade prints at the maker's price.
    pub fn execute_trade(
        &mut self,
        maker: &Order,
        taker: &Order,
        quantity: Quantity,
    ) -> Result<Trade, EngineError> {
        if quantity.is_zero() {
            return Err(EngineError::invariant(format!(
                "zero quantity match between maker {} and taker {}",
                maker.order_id, taker.order_id
            )));
        }
        if maker.side == taker.side {
            return Err(EngineError::invariant(format!(
                "maker {} and taker {} are on the same side",
                maker.order_id, taker.order_id
            )));
        }

        let sequence = self.next_sequence();

        Ok(Trade::new(
            sequence,
            maker.order_id,
            taker.order_id,
            maker.trader_id,
            taker.trader_id,
            taker.side,
            maker.price,
            quantity,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{OrderId, TraderId};
    use types::numeric::Price;
    use types::order::Side;

    fn order(id: u64, side: Side, price: i64) -> Order {
        Order::new(
            OrderId::new(id),
            TraderId::new(id * 10),
            side,
            Price::from_ticks(price),
            Quantity::from_lots(10),
            id,
        )
    }

    #[test]
    fn test_execute_trade_at_maker_price() {
        let mut executor = MatchExecutor::new(1000);
        let maker = order(1, Side::Sell, 11);
        let taker = order(2, Side::Buy, 12);

        let trade = executor.execute_trade(&maker, &taker, Quantity::from_lots(4)).unwrap();

        assert_eq!(trade.sequence, 1000);
        assert_eq!(trade.price, Price::from_ticks(11));
        assert_eq!(trade.maker_order_id, OrderId::new(1));
        assert_eq!(trade.taker_trader_id, TraderId::new(20));
        assert_eq!(trade.taker_side, Side::Buy);
    }

    #[test]
    fn test_sequence_monotonic() {
        let mut executor = MatchExecutor::new(1000);
        let maker = order(1, Side::Buy, 10);
        let taker = order(2, Side::Sell, 10);

        let trade1 = executor.execute_trade(&maker, &taker, Quantity::from_lots(1)).unwrap();
        let seq = executor.next_sequence();
        let trade2 = executor.execute_trade(&maker, &taker, Quantity::from_lots(1)).unwrap();

        assert_eq!(trade1.sequence, 1000);
        assert_eq!(seq, 1001);
        assert_eq!(trade2.sequence, 1002);
        assert_eq!(executor.peek_sequence(), 1003);
    }

    #[test]
    fn test_same_side_match_is_invariant_violation() {
        let mut executor = MatchExecutor::new(0);
        let result = executor.execute_trade(
            &order(1, Side::Buy, 10),
            &order(2, Side::Buy, 10),
            Quantity::from_lots(1),
        );

        assert!(matches!(result, Err(EngineError::InvariantViolation { .. })));
        assert_eq!(executor.peek_sequence(), 0);
    }

    #[test]
    fn test_zero_quantity_match_is_rejected() {
        let mut executor = MatchExecutor::new(0);
        let result = executor.execute_trade(
            &order(1, Side::Sell, 10),
            &order(2, Side::Buy, 10),
            Quantity::zero(),
        );
        assert!(result.is_err());
    }
}
