//! Normalized ticker data shared by every exchange integration.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Canonical trading pair such as `BTC/USDT`.
pub type Symbol = String;

/// Fetch result: canonical symbol -> ticker snapshot
pub type Tickers = HashMap<Symbol, TickerInfo>;

/// Markets registry: exchange-internal market id -> id used to query its tickers
pub type Markets = BTreeMap<String, String>;

/// Last price and 24h volumes for one trading pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    /// Last traded price
    pub last: f64,
    /// 24-hour volume in the base asset
    #[serde(rename = "baseVolume")]
    pub base_volume: f64,
    /// 24-hour volume in the quote (or reference) currency
    #[serde(rename = "quoteVolume")]
    pub quote_volume: f64,
}

impl TickerInfo {
    pub fn new(last: f64, base_volume: f64, quote_volume: f64) -> Self {
        Self {
            last,
            base_volume,
            quote_volume,
        }
    }

    /// True when at least one of the two volumes carries a real value.
    pub fn has_volume(&self) -> bool {
        self.base_volume != 0.0 || self.quote_volume != 0.0
    }
}

impl fmt::Display for TickerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TickerInfo(last={}, baseVolume={}, quoteVolume={})",
            self.last, self.base_volume, self.quote_volume
        )
    }
}
