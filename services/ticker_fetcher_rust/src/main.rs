use anyhow::Result;
use dotenv::dotenv;
use ticker_fetcher_rust::{env_filter, run};
use ticker_rust_core::{build_exchange, FetcherConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    info!("Starting ticker fetcher...");

    let config = FetcherConfig::from_env()?;
    let mut exchange = build_exchange(&config)?;

    let tickers = run(exchange.as_mut(), &mut std::io::stdout()).await?;

    info!("Fetched {} tickers from {}", tickers.len(), exchange.id());
    Ok(())
}
