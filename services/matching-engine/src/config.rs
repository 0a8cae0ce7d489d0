//! Engine configuration
//!
//! Every field has a default, so a partial JSON document is enough to
//! configure an engine:
//!
//! ```json
//! { "min_price": 1, "max_price": 100000, "verify_invariants": true }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::ids::OrderId;
use types::numeric::Price;

/// Errors raised while loading or validating a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid price band: min {min} > max {max}")]
    InvalidPriceBand { min: Price, max: Price },

    #[error("Minimum price must be positive, got {min}")]
    NonPositiveMinPrice { min: Price },
}

/// Configuration for the matching engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lowest accepted limit price in ticks
    pub min_price: Price,
    /// Highest accepted limit price in ticks
    pub max_price: Price,
    /// First sequence number handed out
    pub starting_sequence: u64,
    /// First id used when the caller does not supply one
    pub first_order_id: OrderId,
    /// Number of most recent trades kept for `recent_trades`
    pub recent_trades_capacity: usize,
    /// Run the full book audit after every write
    pub verify_invariants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_price: Price::from_ticks(1),
            max_price: Price::from_ticks(i64::MAX),
            starting_sequence: 1,
            first_order_id: OrderId::new(1),
            recent_trades_capacity: 1_024,
            verify_invariants: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_price.ticks() <= 0 {
            return Err(ConfigError::NonPositiveMinPrice { min: self.min_price });
        }
        if self.min_price > self.max_price {
            return Err(ConfigError::InvalidPriceBand {
                min: self.min_price,
                max: self.max_price,
            });
        }
        Ok(())
    }

    /// Whether a limit price is inside the accepted band
    pub fn price_in_band(&self, price: Price) -> bool {
        self.min_price <= price && price <= self.max_price
    }
}
