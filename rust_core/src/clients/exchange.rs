//! Exchange Trait
//!
//! Common contract for exchange integrations that produce normalized tickers.
//! An integration discovers its markets, fetches raw ticker payloads, and maps
//! them onto `Symbol -> TickerInfo`.

use super::transport::Transport;
use crate::error::Result;
use crate::types::{Markets, Symbol, Tickers};
use async_trait::async_trait;
use serde_json::Value;

/// Common trait for exchange ticker integrations
///
/// Implementations must be Send + Sync for use in async contexts.
/// `load_markets` and `close` default to no-ops for exchanges that can list
/// every ticker in one request and hold no resources.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Exchange identifier (e.g., "coingecko")
    fn id(&self) -> &str;

    /// Markets registry populated by `load_markets`
    fn markets(&self) -> &Markets;

    /// Transport used for every request this exchange makes
    fn transport(&self) -> &dyn Transport;

    /// Fetch raw JSON from the exchange
    async fn fetch_data(&self, url: &str) -> Result<Value> {
        self.transport().get_json(url).await
    }

    /// Populate the markets registry
    ///
    /// Exchanges without a route returning every ticker at once list their
    /// markets here, then `fetch_tickers` walks them one request at a time.
    async fn load_markets(&mut self) -> Result<()> {
        Ok(())
    }

    /// Fetch every ticker from the exchange in normalized form
    ///
    /// Loads markets first when the registry is empty. Aborts on the first
    /// error and discards whatever was accumulated before it.
    async fn fetch_tickers(&mut self) -> Result<Tickers>;

    /// Map a raw exchange payload onto canonical symbols and ticker records
    fn normalize_data(&self, data: &Value) -> Result<Tickers>;

    /// Convert an exchange-specific pair spelling into `BASE/QUOTE`
    ///
    /// Examples:
    /// - CoinGecko: "BTC:USDT" -> "BTC/USDT"
    fn convert_symbol(&self, symbols: &str) -> Symbol;

    /// Release held resources
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Merge a normalized batch into the aggregate result.
///
/// Later batches overwrite earlier entries for the same symbol.
pub fn merge_tickers(acc: &mut Tickers, batch: Tickers) {
    acc.extend(batch);
}
