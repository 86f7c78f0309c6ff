//! Error type for rate fetches.

/// Error type for rate provider operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatesError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Response has no rates for base currency {0}")]
    MissingBase(String),
}

impl RatesError {
    /// Whether a later attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => (500..600).contains(status),
            Self::Timeout(_) | Self::Connection(_) => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RatesError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RatesError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
