//! Configuration for ticker fetching
//!
//! Every setting is optional; with an empty environment the fetcher talks to
//! the public CoinGecko API with the stock 15 second pacing.

use crate::error::{ExchangeError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_EXCHANGE: &str = "coingecko";
pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_VS_CURRENCY: &str = "usd";
pub const DEFAULT_VENUE: &str = "binance";
pub const DEFAULT_REQUEST_DELAY_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    /// Exchange integration to run
    pub exchange: String,

    // CoinGecko
    pub base_url: String,
    /// Reference currency for the market listing and converted volume
    pub vs_currency: String,
    /// Trading venue the per-market ticker request is scoped to
    pub venue: String,

    // Pacing
    pub request_delay: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            exchange: DEFAULT_EXCHANGE.to_string(),
            base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            venue: DEFAULT_VENUE.to_string(),
            request_delay: Duration::from_secs(DEFAULT_REQUEST_DELAY_SECS),
        }
    }
}

impl FetcherConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            exchange: parse_string("TICKER_EXCHANGE", DEFAULT_EXCHANGE).to_lowercase(),
            base_url: parse_string("COINGECKO_BASE_URL", DEFAULT_COINGECKO_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            vs_currency: parse_string("COINGECKO_VS_CURRENCY", DEFAULT_VS_CURRENCY).to_lowercase(),
            venue: parse_string("COINGECKO_VENUE", DEFAULT_VENUE),
            request_delay: Duration::from_secs(parse_u64(
                "TICKER_REQUEST_DELAY_SECS",
                DEFAULT_REQUEST_DELAY_SECS,
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.exchange.is_empty() {
            return Err(ExchangeError::Config("TICKER_EXCHANGE must not be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ExchangeError::Config(format!(
                "COINGECKO_BASE_URL must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if self.vs_currency.is_empty() {
            return Err(ExchangeError::Config(
                "COINGECKO_VS_CURRENCY must not be empty".to_string(),
            ));
        }
        if self.venue.is_empty() {
            return Err(ExchangeError::Config("COINGECKO_VENUE must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Read environment variable as a trimmed string with default fallback
fn parse_string(var_name: &str, default: &str) -> String {
    env::var(var_name)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| default.to_string())
}

/// Parse environment variable as u64 with default fallback
fn parse_u64(var_name: &str, default: u64) -> Result<u64> {
    match env::var(var_name) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|_| ExchangeError::Config(format!("{} must be a valid u64", var_name))),
        Err(_) => Ok(default),
    }
}
