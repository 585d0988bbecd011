use thiserror::Error;

/// Errors surfaced by the scraper, the price client and the exporters.
///
/// Optional fact-sheet fields never produce an error; they degrade to `None`.
/// Everything here is a structural or transport failure handed to the caller.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Expected element not found: {0}")]
    MissingElement(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No Alpha Vantage API key configured (use --api-key or ALPHAVANTAGE_API_KEY)")]
    MissingApiKey,

    #[error("Price API error: {0}")]
    PriceApi(String),
}

impl ScrapeError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingElement(what.into())
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
