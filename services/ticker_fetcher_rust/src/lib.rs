//! ticker_fetcher_rust - load markets, fetch every ticker, report to stdout

use anyhow::Result;
use std::io::Write;
use ticker_rust_core::{Exchange, Tickers};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset; keeps the per-market progress lines
pub const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG` when set and valid, otherwise `DEFAULT_LOG_FILTER`
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Load markets, print the registry, fetch all tickers, print them sorted by
/// symbol, then close the exchange. Any failure aborts the run.
pub async fn run<W: Write>(exchange: &mut dyn Exchange, out: &mut W) -> Result<Tickers> {
    exchange.load_markets().await?;
    writeln!(out, "{:?}", exchange.markets())?;

    let tickers = exchange.fetch_tickers().await?;

    let mut symbols: Vec<_> = tickers.keys().collect();
    symbols.sort();
    for symbol in symbols {
        writeln!(out, "{} {}", symbol, tickers[symbol])?;
    }

    exchange.close().await?;
    Ok(tickers)
}
