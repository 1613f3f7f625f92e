//! Error taxonomy for market and ticker fetching.

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Errors raised while loading markets or fetching tickers.
///
/// Nothing here is retried: every variant aborts the operation in progress.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// Response was absent or not HTTP 200.
    #[error("request to {url} failed with status {status:?}: {body}")]
    Transport {
        url: String,
        status: Option<u16>,
        body: String,
    },

    /// Network-level failure before a response was available.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A raw ticker entry could not be mapped onto the canonical schema.
    #[error("failed to normalize ticker entry {index}: {source}")]
    Normalization {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Required key absent from an exchange payload; `index` names the raw
    /// ticker entry when the key belongs to one.
    #[error("missing field `{field}` in exchange payload{}", entry_suffix(.index))]
    MissingField { field: String, index: Option<usize> },

    /// Capability requested from an exchange that has no integration for it.
    #[error("{operation} is not implemented for exchange `{exchange}`")]
    NotImplemented { exchange: String, operation: String },

    /// Invalid environment configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn entry_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" (ticker entry {})", i)).unwrap_or_default()
}

impl ExchangeError {
    /// Status code carried by a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
