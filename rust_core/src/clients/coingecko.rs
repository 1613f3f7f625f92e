//! CoinGecko Exchange Integration
//!
//! Two-phase fetch against the public CoinGecko API:
//! 1. `/coins/markets` lists every coin id priced in the reference currency
//! 2. `/coins/{id}/tickers` returns that coin's pairs on one trading venue
//!
//! The per-coin requests run strictly one after another with a fixed pause
//! between them to stay under the public rate limit.
//!
//! docs: https://docs.coingecko.com/v3.0.1/reference/coins-id-tickers

use super::exchange::{merge_tickers, Exchange};
use super::transport::{HttpTransport, Transport};
use crate::config::{FetcherConfig, DEFAULT_COINGECKO_BASE_URL, DEFAULT_VENUE, DEFAULT_VS_CURRENCY};
use crate::error::{ExchangeError, Result};
use crate::pacing::Pacer;
use crate::types::{Markets, Symbol, TickerInfo, Tickers};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const EXCHANGE_ID: &str = "coingecko";

/// CoinGecko integration implementing Exchange
pub struct CoinGeckoExchange {
    id: String,
    base_url: String,
    /// Reference currency for market listing and converted volume
    vs_currency: String,
    /// Venue filter for the per-coin ticker request (e.g. "binance")
    venue: String,
    markets: Markets,
    transport: Arc<dyn Transport>,
    pacer: Pacer,
}

/// Entry of the `/coins/markets` listing; only the id is needed
#[derive(Debug, Deserialize)]
struct CoinMarketEntry {
    id: String,
}

/// Raw entry of the `/coins/{id}/tickers` `tickers` array
#[derive(Debug, Deserialize)]
struct RawTicker {
    base: String,
    target: String,
    #[serde(deserialize_with = "number_or_string")]
    last: f64,
    /// 24h volume in the base asset
    #[serde(deserialize_with = "number_or_string")]
    volume: f64,
    /// 24h volume converted into reference currencies, keyed by currency
    converted_volume: HashMap<String, Numeric>,
}

/// CoinGecko answers with JSON numbers; hand-written payloads often quote them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self) -> std::result::Result<f64, String> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("invalid number: {:?}", s)),
        }
    }
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Numeric::deserialize(deserializer)?
        .value()
        .map_err(serde::de::Error::custom)
}

impl CoinGeckoExchange {
    /// Create an integration against the public API with default pacing
    pub fn new() -> Self {
        Self {
            id: EXCHANGE_ID.to_string(),
            base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            vs_currency: DEFAULT_VS_CURRENCY.to_string(),
            venue: DEFAULT_VENUE.to_string(),
            markets: Markets::new(),
            transport: Arc::new(HttpTransport::new()),
            pacer: Pacer::default(),
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            vs_currency: config.vs_currency.clone(),
            venue: config.venue.clone(),
            pacer: Pacer::new(config.request_delay),
            ..Self::new()
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    fn markets_url(&self) -> String {
        format!("{}/coins/markets?vs_currency={}", self.base_url, self.vs_currency)
    }

    fn tickers_url(&self, coin_id: &str) -> String {
        format!(
            "{}/coins/{}/tickers?exchange_ids={}",
            self.base_url, coin_id, self.venue
        )
    }
}

impl Default for CoinGeckoExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exchange for CoinGeckoExchange {
    fn id(&self) -> &str {
        &self.id
    }

    fn markets(&self) -> &Markets {
        &self.markets
    }

    fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    async fn load_markets(&mut self) -> Result<()> {
        let url = self.markets_url();
        info!("Loading {} markets from {}", self.id, url);

        let data = self.fetch_data(&url).await?;
        let entries = Vec::<CoinMarketEntry>::deserialize(&data)
            .map_err(|source| ExchangeError::Decode { url, source })?;

        // Registry is only touched once the whole listing parsed
        let loaded: Markets = entries.into_iter().map(|e| (e.id.clone(), e.id)).collect();
        self.markets.extend(loaded);

        info!("Loaded {} {} markets", self.markets.len(), self.id);
        Ok(())
    }

    async fn fetch_tickers(&mut self) -> Result<Tickers> {
        if self.markets.is_empty() {
            self.load_markets().await?;
        }

        let mut result = Tickers::new();
        for coin_id in self.markets.values() {
            info!("Fetching: {}", coin_id);

            let data = self.fetch_data(&self.tickers_url(coin_id)).await?;
            let raw = data.get("tickers").ok_or_else(|| ExchangeError::MissingField {
                field: "tickers".to_string(),
                index: None,
            })?;
            let batch = self.normalize_data(raw)?;
            debug!("{} returned {} tickers", coin_id, batch.len());
            merge_tickers(&mut result, batch);

            self.pacer.pause().await;
        }

        info!(
            "Fetched {} tickers across {} {} markets",
            result.len(),
            self.markets.len(),
            self.id
        );
        Ok(result)
    }

    fn normalize_data(&self, data: &Value) -> Result<Tickers> {
        let entries = data.as_array().ok_or_else(|| ExchangeError::Normalization {
            index: 0,
            source: serde::de::Error::custom("expected an array of ticker objects"),
        })?;

        let mut normalized = Tickers::new();
        for (index, entry) in entries.iter().enumerate() {
            let raw = RawTicker::deserialize(entry)
                .map_err(|source| ExchangeError::Normalization { index, source })?;

            let quote_volume = raw
                .converted_volume
                .get(&self.vs_currency)
                .ok_or_else(|| ExchangeError::MissingField {
                    field: format!("converted_volume.{}", self.vs_currency),
                    index: Some(index),
                })?
                .value()
                .map_err(|msg| ExchangeError::Normalization {
                    index,
                    source: serde::de::Error::custom(msg),
                })?;

            let symbol = self.convert_symbol(&format!("{}:{}", raw.base, raw.target));
            let ticker = TickerInfo::new(raw.last, raw.volume, quote_volume);
            if !ticker.has_volume() {
                warn!("{} reported no volume for {}", self.id, symbol);
            }
            normalized.insert(symbol, ticker);
        }

        Ok(normalized)
    }

    fn convert_symbol(&self, symbols: &str) -> Symbol {
        // Casing comes from the raw asset codes; only the separator changes
        symbols.replace(':', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::transport::fake::StaticTransport;
    use serde_json::json;
    use std::time::Duration;

    const MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd";
    const BITCOIN_URL: &str =
        "https://api.coingecko.com/api/v3/coins/bitcoin/tickers?exchange_ids=binance";
    const ETHEREUM_URL: &str =
        "https://api.coingecko.com/api/v3/coins/ethereum/tickers?exchange_ids=binance";

    fn exchange_with(transport: Arc<StaticTransport>) -> CoinGeckoExchange {
        CoinGeckoExchange::new()
            .with_transport(transport)
            .with_pacer(Pacer::disabled())
    }

    fn btc_usdt_payload() -> Value {
        json!({"tickers": [{
            "base": "BTC",
            "target": "USDT",
            "last": "57000",
            "volume": "11328",
            "converted_volume": {"usd": "3456789"}
        }]})
    }

    #[test]
    fn test_convert_symbol_replaces_colon_only() {
        let exchange = CoinGeckoExchange::new();
        assert_eq!(exchange.convert_symbol("BTC:USDT"), "BTC/USDT");
        assert_eq!(exchange.convert_symbol("eth:btc"), "eth/btc");
    }

    #[test]
    fn test_normalize_string_and_number_fields() {
        let exchange = CoinGeckoExchange::new();
        let data = json!([
            {
                "base": "BTC",
                "target": "USDT",
                "last": "57000",
                "volume": "11328",
                "converted_volume": {"usd": "3456789"}
            },
            {
                "base": "ETH",
                "target": "BTC",
                "last": 0.0526,
                "volume": 4567.0,
                "converted_volume": {"btc": 240.1, "eth": 4567.0, "usd": 0}
            }
        ]);

        let tickers = exchange.normalize_data(&data).unwrap();
        assert_eq!(tickers.len(), 2);
        assert_eq!(tickers["BTC/USDT"], TickerInfo::new(57000.0, 11328.0, 3456789.0));
        assert_eq!(tickers["ETH/BTC"], TickerInfo::new(0.0526, 4567.0, 0.0));
        assert!(tickers.values().all(|t| t.base_volume >= 0.0 && t.quote_volume >= 0.0));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let exchange = CoinGeckoExchange::new();
        let data = btc_usdt_payload()["tickers"].clone();
        assert_eq!(
            exchange.normalize_data(&data).unwrap(),
            exchange.normalize_data(&data).unwrap()
        );
    }

    #[test]
    fn test_normalize_missing_field_fails() {
        let exchange = CoinGeckoExchange::new();
        let data = json!([{"base": "BTC", "target": "USDT", "volume": "1", "converted_volume": {"usd": "1"}}]);

        let err = exchange.normalize_data(&data).unwrap_err();
        assert!(matches!(err, ExchangeError::Normalization { index: 0, .. }));
        assert!(err.to_string().contains("last"));
    }

    #[test]
    fn test_normalize_missing_reference_currency_fails() {
        let exchange = CoinGeckoExchange::new();
        let data = json!([
            {
                "base": "ETH", "target": "USDT", "last": 1, "volume": 1,
                "converted_volume": {"usd": 1}
            },
            {
                "base": "BTC", "target": "USDT", "last": 1, "volume": 1,
                "converted_volume": {"btc": 1}
            }
        ]);

        match exchange.normalize_data(&data) {
            Err(ExchangeError::MissingField { field, index }) => {
                assert_eq!(field, "converted_volume.usd");
                assert_eq!(index, Some(1));
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_tickers_end_to_end() {
        let transport = Arc::new(
            StaticTransport::new()
                .route(MARKETS_URL, 200, json!([{"id": "bitcoin"}]))
                .route(BITCOIN_URL, 200, btc_usdt_payload()),
        );
        let mut exchange = exchange_with(transport.clone());

        let tickers = exchange.fetch_tickers().await.unwrap();

        assert_eq!(tickers.len(), 1);
        assert_eq!(tickers["BTC/USDT"], TickerInfo::new(57000.0, 11328.0, 3456789.0));
        assert_eq!(transport.requests(), vec![MARKETS_URL, BITCOIN_URL]);
    }

    #[tokio::test]
    async fn test_fetch_tickers_does_not_reload_markets() {
        let transport = Arc::new(
            StaticTransport::new()
                .route(MARKETS_URL, 200, json!([{"id": "bitcoin"}]))
                .route(BITCOIN_URL, 200, btc_usdt_payload()),
        );
        let mut exchange = exchange_with(transport.clone());

        exchange.load_markets().await.unwrap();
        exchange.fetch_tickers().await.unwrap();
        exchange.fetch_tickers().await.unwrap();

        let listing_calls = transport
            .requests()
            .iter()
            .filter(|url| url.as_str() == MARKETS_URL)
            .count();
        assert_eq!(listing_calls, 1);
    }

    #[tokio::test]
    async fn test_later_market_overwrites_same_symbol() {
        let transport = Arc::new(
            StaticTransport::new()
                .route(MARKETS_URL, 200, json!([{"id": "bitcoin"}, {"id": "ethereum"}]))
                .route(BITCOIN_URL, 200, btc_usdt_payload())
                .route(
                    ETHEREUM_URL,
                    200,
                    json!({"tickers": [{
                        "base": "BTC", "target": "USDT", "last": 58000, "volume": 10,
                        "converted_volume": {"usd": 580000}
                    }]}),
                ),
        );
        let mut exchange = exchange_with(transport);

        let tickers = exchange.fetch_tickers().await.unwrap();

        // Registry iterates in id order: bitcoin, then ethereum
        assert_eq!(tickers["BTC/USDT"], TickerInfo::new(58000.0, 10.0, 580000.0));
    }

    #[tokio::test]
    async fn test_load_markets_404_leaves_registry_empty() {
        let transport = Arc::new(StaticTransport::new().route(MARKETS_URL, 404, json!({})));
        let mut exchange = exchange_with(transport);

        let err = exchange.load_markets().await.unwrap_err();

        assert!(matches!(err, ExchangeError::Transport { status: Some(404), .. }));
        assert!(exchange.markets().is_empty());
    }

    #[tokio::test]
    async fn test_empty_listing_skips_ticker_requests() {
        let transport = Arc::new(StaticTransport::new().route(MARKETS_URL, 200, json!([])));
        let mut exchange = exchange_with(transport.clone());

        exchange.load_markets().await.unwrap();
        assert!(exchange.markets().is_empty());

        let tickers = exchange.fetch_tickers().await.unwrap();
        assert!(tickers.is_empty());
        assert!(transport
            .requests()
            .iter()
            .all(|url| url.as_str() == MARKETS_URL));
    }

    #[tokio::test]
    async fn test_failed_market_discards_partial_results() {
        let transport = Arc::new(
            StaticTransport::new()
                .route(MARKETS_URL, 200, json!([{"id": "bitcoin"}, {"id": "ethereum"}]))
                .route(BITCOIN_URL, 200, btc_usdt_payload())
                .route(ETHEREUM_URL, 500, json!({"error": "boom"})),
        );
        let mut exchange = exchange_with(transport);

        let err = exchange.fetch_tickers().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_missing_tickers_key_fails() {
        let transport = Arc::new(
            StaticTransport::new()
                .route(MARKETS_URL, 200, json!([{"id": "bitcoin"}]))
                .route(BITCOIN_URL, 200, json!({"name": "Bitcoin"})),
        );
        let mut exchange = exchange_with(transport);

        match exchange.fetch_tickers().await {
            Err(ExchangeError::MissingField { field, index }) => {
                assert_eq!(field, "tickers");
                assert_eq!(index, None);
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_runs_after_each_market() {
        let transport = Arc::new(
            StaticTransport::new()
                .route(MARKETS_URL, 200, json!([{"id": "bitcoin"}, {"id": "ethereum"}]))
                .route(BITCOIN_URL, 200, btc_usdt_payload())
                .route(ETHEREUM_URL, 200, json!({"tickers": []})),
        );
        let mut exchange = CoinGeckoExchange::new()
            .with_transport(transport)
            .with_pacer(Pacer::new(Duration::from_secs(15)));

        let start = tokio::time::Instant::now();
        exchange.fetch_tickers().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[test]
    fn test_from_config_uses_settings() {
        let config = FetcherConfig {
            base_url: "http://localhost:8080/api/v3/".to_string(),
            vs_currency: "eur".to_string(),
            venue: "kraken".to_string(),
            request_delay: Duration::from_secs(2),
            ..FetcherConfig::default()
        };
        let exchange = CoinGeckoExchange::from_config(&config);

        assert_eq!(exchange.id(), "coingecko");
        assert_eq!(
            exchange.markets_url(),
            "http://localhost:8080/api/v3/coins/markets?vs_currency=eur"
        );
        assert_eq!(
            exchange.tickers_url("bitcoin"),
            "http://localhost:8080/api/v3/coins/bitcoin/tickers?exchange_ids=kraken"
        );
        assert_eq!(exchange.pacer.delay(), Duration::from_secs(2));
    }
}
