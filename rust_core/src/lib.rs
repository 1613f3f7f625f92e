//! Ticker Core - Exchange market data fetching and normalization.
//!
//! This module provides:
//! - A common `Exchange` trait for ticker integrations
//! - A JSON-over-HTTP transport primitive
//! - The CoinGecko two-phase integration (list markets, then tickers per market)
//! - Fixed-interval pacing between sequential requests
//! - Environment-driven configuration

pub mod clients;
pub mod config;
pub mod error;
pub mod pacing;
mod types;

pub use clients::{build_exchange, CoinGeckoExchange, Exchange, HttpTransport, Transport};
pub use config::FetcherConfig;
pub use error::{ExchangeError, Result};
pub use pacing::Pacer;
pub use types::*;
