use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub prices: PricesConfig,
}

/// Broker site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Landing page carrying the sector dropdown.
    #[serde(default = "default_sectors_url")]
    pub sectors_url: String,

    /// ETF search results listing.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Rows per results page; pagination offsets are multiples of this.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Alpha Vantage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricesConfig {
    #[serde(default = "default_prices_url")]
    pub base_url: String,

    /// Lowest-precedence key; `--api-key` and `ALPHAVANTAGE_API_KEY` win.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_sectors_url() -> String {
    "https://www.hl.co.uk/shares/exchange-traded-funds-etfs".to_string()
}
fn default_search_url() -> String {
    "https://www.hl.co.uk/shares/exchange-traded-funds-etfs/list-of-etfs".to_string()
}
fn default_page_size() -> u32 {
    50
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    500
}
fn default_user_agent() -> String {
    "hl-etf-harvest/0.1 (fund research)".to_string()
}
fn default_prices_url() -> String {
    "https://www.alphavantage.co/query".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            sectors_url: default_sectors_url(),
            search_url: default_search_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            base_url: default_prices_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("HLETF").separator("__"))
            .build()?;

        Ok(cfg.try_deserialize()?)
    }
}
