//! Order lifecycle scenarios
//!
//! End-to-end checks of submit, cancel and amend through the public API,
//! including the event stream each call produces.

use matching_engine::{BookEvent, CancelReason, EngineConfig, MatchingEngine, Quote, TracingSink};
use types::errors::{EngineError, OrderError};
use types::numeric::{Price, Quantity};
use types::order::{Disposition, OrderRequest, Side, TimeInForce};

fn engine() -> MatchingEngine<Vec<BookEvent>> {
    let config = EngineConfig {
        verify_invariants: true,
        ..EngineConfig::default()
    };
    MatchingEngine::with_sink(config, Vec::new()).unwrap()
}

fn px(ticks: i64) -> Price {
    Price::from_ticks(ticks)
}

fn qty(lots: u64) -> Quantity {
    Quantity::from_lots(lots)
}

fn quote(price: i64, quantity: u64) -> Option<Quote> {
    Some(Quote {
        price: px(price),
        quantity: qty(quantity),
    })
}

#[test]
fn test_partial_fill_of_resting_bid() {
    let mut engine = engine();

    let buy = engine.submit_limit(Side::Buy, px(10), qty(100)).unwrap();
    assert_eq!(buy.disposition, Disposition::Resting);
    assert_eq!(engine.best_bid_ask().bid, quote(10, 100));

    let sell = engine.submit_limit(Side::Sell, px(10), qty(50)).unwrap();
    assert_eq!(sell.disposition, Disposition::Filled);
    assert_eq!(sell.trades.len(), 1);
    assert_eq!(sell.trades[0].maker_order_id, buy.order_id);
    assert_eq!(sell.trades[0].price, px(10));
    assert_eq!(sell.trades[0].quantity, qty(50));
    assert_eq!(engine.best_bid_ask().bid, quote(10, 50));
    assert_eq!(engine.best_bid_ask().ask, None);
}

#[test]
fn test_aggressive_buy_fills_at_resting_price() {
    let mut engine = engine();

    engine.submit_limit(Side::Sell, px(11), qty(100)).unwrap();
    let buy = engine.submit_limit(Side::Buy, px(12), qty(100)).unwrap();

    assert_eq!(buy.disposition, Disposition::Filled);
    assert_eq!(buy.trades.len(), 1);
    assert_eq!(buy.trades[0].price, px(11));
    assert_eq!(buy.trades[0].quantity, qty(100));
    assert!(engine.is_empty());
    assert_eq!(engine.best_bid_ask(), Default::default());
}

#[test]
fn test_fifo_within_price_level() {
    let mut engine = engine();

    let first = engine.submit_limit(Side::Buy, px(5), qty(10)).unwrap();
    let second = engine.submit_limit(Side::Buy, px(5), qty(20)).unwrap();
    assert_eq!(engine.best_bid_ask().bid, quote(5, 30));

    let sell = engine.submit_limit(Side::Sell, px(5), qty(15)).unwrap();

    let fills: Vec<_> = sell
        .trades
        .iter()
        .map(|trade| (trade.maker_order_id, trade.quantity))
        .collect();
    assert_eq!(fills, vec![(first.order_id, qty(10)), (second.order_id, qty(5))]);
    assert_eq!(engine.order(second.order_id).unwrap().remaining_quantity, qty(15));
    assert_eq!(engine.best_bid_ask().bid, quote(5, 15));
}

#[test]
fn test_event_stream_for_partial_fill_and_rest() {
    let mut engine = engine();

    engine.submit_limit(Side::Sell, px(10), qty(3)).unwrap();
    engine.submit_limit(Side::Sell, px(11), qty(3)).unwrap();
    let buy = engine.submit_limit(Side::Buy, px(11), qty(10)).unwrap();
    assert_eq!(buy.disposition, Disposition::PartiallyFilled);
    assert_eq!(buy.resting_quantity, qty(4));

    let events = engine.sink();
    assert_eq!(events.len(), 5);
    match &events[4] {
        BookEvent::Resting(event) => {
            assert_eq!(event.order_id, buy.order_id);
            assert_eq!(event.price, px(11));
            assert_eq!(event.quantity, qty(4));
        }
        other => panic!("expected resting event, got {:?}", other),
    }

    let sequences: Vec<u64> = events.iter().map(BookEvent::sequence).collect();
    assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_cancel_is_not_repeatable() {
    let mut engine = engine();

    let buy = engine.submit_limit(Side::Buy, px(10), qty(7)).unwrap();
    let ack = engine.cancel(buy.order_id).unwrap();
    assert_eq!(ack.canceled_quantity, qty(7));

    let events_before = engine.sink().clone();
    let depth_before = engine.depth(10);

    let err = engine.cancel(buy.order_id).unwrap_err();
    assert_eq!(
        err,
        EngineError::Order(OrderError::UnknownOrderId {
            order_id: buy.order_id
        })
    );
    assert_eq!(engine.sink(), &events_before);
    assert_eq!(engine.depth(10), depth_before);
}

#[test]
fn test_submit_then_cancel_restores_book() {
    let mut engine = engine();
    engine.submit_limit(Side::Buy, px(9), qty(4)).unwrap();
    engine.submit_limit(Side::Sell, px(12), qty(6)).unwrap();

    let depth_before = engine.depth(10);
    let count_before = engine.order_count();

    let resting = engine.submit_limit(Side::Buy, px(10), qty(5)).unwrap();
    assert_eq!(resting.disposition, Disposition::Resting);
    assert_eq!(engine.best_bid_ask().bid, quote(10, 5));

    engine.cancel(resting.order_id).unwrap();

    assert_eq!(engine.depth(10), depth_before);
    assert_eq!(engine.order_count(), count_before);
}

#[test]
fn test_amend_then_fill_uses_new_quantity() {
    let mut engine = engine();
    let sell = engine.submit_limit(Side::Sell, px(20), qty(10)).unwrap();

    let ack = engine.amend(sell.order_id, qty(3)).unwrap();
    assert_eq!(ack.old_quantity, qty(10));

    match engine.sink().last() {
        Some(BookEvent::Amended(event)) => {
            assert_eq!(event.sequence, ack.sequence);
            assert_eq!(event.new_quantity, qty(3));
        }
        other => panic!("expected amended event, got {:?}", other),
    }

    let buy = engine.submit_limit(Side::Buy, px(20), qty(5)).unwrap();
    assert_eq!(buy.filled_quantity(), qty(3));
    assert_eq!(buy.disposition, Disposition::PartiallyFilled);
    assert_eq!(engine.best_bid_ask().bid, quote(20, 2));
    assert_eq!(engine.best_bid_ask().ask, None);
}

#[test]
fn test_amend_increase_rejected_without_events() {
    let mut engine = engine();
    let sell = engine.submit_limit(Side::Sell, px(20), qty(10)).unwrap();
    let events_before = engine.sink().len();

    let err = engine.amend(sell.order_id, qty(12)).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Order(OrderError::InvalidAmendment { .. })
    ));
    assert_eq!(engine.sink().len(), events_before);
    assert_eq!(engine.best_bid_ask().ask, quote(20, 10));
}

#[test]
fn test_fill_or_kill_leaves_book_intact() {
    let mut engine = engine();
    engine.submit_limit(Side::Buy, px(10), qty(5)).unwrap();
    let depth_before = engine.depth(10);

    let result = engine
        .submit(OrderRequest::limit(Side::Sell, px(10), qty(6)).with_time_in_force(TimeInForce::FOK))
        .unwrap();

    assert_eq!(result.disposition, Disposition::Killed);
    assert_eq!(engine.depth(10), depth_before);
    match engine.sink().last() {
        Some(BookEvent::Canceled(event)) => {
            assert_eq!(event.reason, CancelReason::FillOrKill);
            assert_eq!(event.canceled_quantity, qty(6));
        }
        other => panic!("expected cancel event, got {:?}", other),
    }
}

#[test]
fn test_market_order_sweeps_book() {
    let mut engine = engine();
    engine.submit_limit(Side::Sell, px(101), qty(2)).unwrap();
    engine.submit_limit(Side::Sell, px(105), qty(2)).unwrap();
    engine.submit_limit(Side::Sell, px(150), qty(2)).unwrap();

    let result = engine.submit(OrderRequest::market(Side::Buy, qty(5))).unwrap();

    let prices: Vec<Price> = result.trades.iter().map(|trade| trade.price).collect();
    assert_eq!(prices, vec![px(101), px(105), px(150)]);
    assert_eq!(result.disposition, Disposition::Filled);
    assert_eq!(engine.best_bid_ask().ask, quote(150, 1));
    assert_eq!(engine.best_bid_ask().bid, None);
}

#[test]
fn test_recent_trades_follow_execution_order() {
    let mut engine = engine();
    engine.submit_limit(Side::Sell, px(10), qty(1)).unwrap();
    engine.submit_limit(Side::Sell, px(11), qty(1)).unwrap();
    engine.submit_limit(Side::Buy, px(11), qty(2)).unwrap();

    let prices: Vec<Price> = engine.recent_trades(10).map(|trade| trade.price).collect();
    assert_eq!(prices, vec![px(10), px(11)]);
}

#[test]
fn test_tracing_sink_runs_under_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    let mut engine = MatchingEngine::with_sink(EngineConfig::default(), TracingSink).unwrap();
    let sell = engine.submit_limit(Side::Sell, px(10), qty(2)).unwrap();
    engine.submit_limit(Side::Buy, px(10), qty(1)).unwrap();
    engine.amend(sell.order_id, qty(0)).unwrap_err();
    engine.cancel(sell.order_id).unwrap();

    assert!(engine.is_empty());
}
