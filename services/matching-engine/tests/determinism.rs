//! Determinism tests for the matching engine
//!
//! Two engines fed the same command stream must produce the same results,
//! the same event stream and the same final book.

use matching_engine::{BookEvent, EngineConfig, MatchingEngine};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use types::ids::{OrderId, TraderId};
use types::numeric::{Price, Quantity};
use types::order::{OrderRequest, Side, TimeInForce};

#[derive(Debug, Clone)]
enum Command {
    Submit(OrderRequest),
    Cancel(OrderId),
    Amend(OrderId, Quantity),
}

fn command_stream(seed: u64, len: usize) -> Vec<Command> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut commands = Vec::with_capacity(len);

    for i in 0..len {
        let issued = i as u64 + 1;
        let command = match rng.gen_range(0..10) {
            0 | 1 => Command::Cancel(OrderId::new(rng.gen_range(1..=issued))),
            2 => Command::Amend(
                OrderId::new(rng.gen_range(1..=issued)),
                Quantity::from_lots(rng.gen_range(1..=5)),
            ),
            kind => {
                let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                let quantity = Quantity::from_lots(rng.gen_range(1..=20));
                let request = if kind == 9 {
                    OrderRequest::market(side, quantity)
                } else {
                    let tif = match rng.gen_range(0..8) {
                        0 => TimeInForce::IOC,
                        1 => TimeInForce::FOK,
                        _ => TimeInForce::GTC,
                    };
                    OrderRequest::limit(side, Price::from_ticks(rng.gen_range(95..=105)), quantity)
                        .with_time_in_force(tif)
                };
                Command::Submit(request.with_trader(TraderId::new(rng.gen_range(0..4))))
            }
        };
        commands.push(command);
    }
    commands
}

fn replay(commands: &[Command]) -> (Vec<String>, MatchingEngine<Vec<BookEvent>>) {
    let config = EngineConfig {
        verify_invariants: true,
        ..EngineConfig::default()
    };
    let mut engine = MatchingEngine::with_sink(config, Vec::new()).unwrap();
    let mut outcomes = Vec::with_capacity(commands.len());

    for command in commands {
        let outcome = match command {
            Command::Submit(request) => format!("{:?}", engine.submit(request.clone())),
            Command::Cancel(order_id) => format!("{:?}", engine.cancel(*order_id)),
            Command::Amend(order_id, quantity) => format!("{:?}", engine.amend(*order_id, *quantity)),
        };
        outcomes.push(outcome);
    }
    (outcomes, engine)
}

#[test]
fn test_dual_replay_identical() {
    let commands = command_stream(42, 2_000);

    let (outcomes_a, engine_a) = replay(&commands);
    let (outcomes_b, engine_b) = replay(&commands);

    assert_eq!(outcomes_a, outcomes_b);
    assert_eq!(engine_a.sink(), engine_b.sink());
    assert_eq!(engine_a.depth(usize::MAX), engine_b.depth(usize::MAX));
    assert_eq!(engine_a.next_sequence(), engine_b.next_sequence());
    assert!(!engine_a.is_halted());
}

#[test]
fn test_event_stream_serializes_identically() {
    let commands = command_stream(7, 500);

    let (_, engine_a) = replay(&commands);
    let (_, engine_b) = replay(&commands);

    let json_a = serde_json::to_string(engine_a.sink()).unwrap();
    let json_b = serde_json::to_string(engine_b.sink()).unwrap();
    assert_eq!(json_a, json_b);

    let decoded: Vec<BookEvent> = serde_json::from_str(&json_a).unwrap();
    assert_eq!(&decoded, engine_a.sink());
}

#[test]
fn test_sequences_strictly_increase_across_events() {
    let commands = command_stream(1234, 1_000);
    let (_, engine) = replay(&commands);

    let sequences: Vec<u64> = engine.sink().iter().map(BookEvent::sequence).collect();
    assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(sequences.last().map_or(true, |last| *last < engine.next_sequence()));
}

#[test]
fn test_different_streams_diverge() {
    let (_, engine_a) = replay(&command_stream(1, 300));
    let (_, engine_b) = replay(&command_stream(2, 300));
    assert_ne!(engine_a.sink(), engine_b.sink());
}
