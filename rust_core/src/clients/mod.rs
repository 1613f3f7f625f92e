pub mod coingecko;
pub mod exchange;
pub mod transport;

// Re-export commonly used types
pub use coingecko::CoinGeckoExchange;
pub use exchange::{merge_tickers, Exchange};
pub use transport::{HttpTransport, Transport};

use crate::config::FetcherConfig;
use crate::error::{ExchangeError, Result};
use tracing::info;

/// Build the integration named by `config.exchange`.
pub fn build_exchange(config: &FetcherConfig) -> Result<Box<dyn Exchange>> {
    match config.exchange.to_lowercase().as_str() {
        "coingecko" => {
            info!(
                "Using CoinGecko at {} (venue: {}, currency: {}, delay: {:?})",
                config.base_url, config.venue, config.vs_currency, config.request_delay
            );
            Ok(Box::new(CoinGeckoExchange::from_config(config)))
        }
        other => Err(ExchangeError::NotImplemented {
            exchange: other.to_string(),
            operation: "build_exchange".to_string(),
        }),
    }
}
