//! HTTP transport primitive
//!
//! A single GET returning decoded JSON. Each call opens its own client and
//! drops it when the response has been read, so no connection outlives a
//! request.

use crate::error::{ExchangeError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

/// Fetches a URL and returns its JSON body
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`; anything other than HTTP 200 is a transport error.
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// reqwest-backed transport with default client settings
#[derive(Debug, Clone)]
pub struct HttpTransport {
    user_agent: String,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            user_agent: "TickerFetcher/1.0".to_string(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let client = Client::builder().user_agent(&self.user_agent).build()?;

        debug!("GET {}", url);

        let response = client.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!("GET {} returned {}", url, status);
            return Err(ExchangeError::Transport {
                url: url.to_string(),
                status: Some(status.as_u16()),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| ExchangeError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
