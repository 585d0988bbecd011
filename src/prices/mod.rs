//! Daily price history from Alpha Vantage (`TIME_SERIES_DAILY`).
//!
//! The API key is passed in explicitly; reading `ALPHAVANTAGE_API_KEY` is the
//! CLI's job, not this module's.

use crate::config::PricesConfig;
use crate::error::{Result, ScrapeError};
use crate::models::DailyBar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const SERIES_KEY: &str = "Time Series (Daily)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSize {
    /// Latest 100 sessions.
    #[default]
    Compact,
    /// Full history.
    Full,
}

impl OutputSize {
    fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

pub struct AlphaVantageClient {
    inner: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(config: &PricesConfig, api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ScrapeError::MissingApiKey)?;

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            inner,
            base_url: Url::parse(&config.base_url)?,
            api_key,
        })
    }

    fn series_url(&self, symbol: &str, size: OutputSize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("function", "TIME_SERIES_DAILY")
            .append_pair("symbol", symbol)
            .append_pair("outputsize", size.as_str())
            .append_pair("apikey", &self.api_key);
        url
    }

    pub async fn historical(&self, symbol: &str, size: OutputSize) -> Result<Vec<DailyBar>> {
        let url = self.series_url(symbol, size);
        info!("Fetching daily series for {} ({})", symbol, size.as_str());

        let resp = self.inner.get(url.as_str()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: self.base_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        let bars = parse_daily_series(symbol, &body)?;
        debug!("{}: {} bars", symbol, bars.len());
        Ok(bars)
    }
}

// ── Response parsing ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawDailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

/// Bars in ascending date order. Unparsable entries are dropped.
pub fn parse_daily_series(symbol: &str, body: &str) -> Result<Vec<DailyBar>> {
    let mut json: serde_json::Value = serde_json::from_str(body)?;

    for key in ["Error Message", "Note", "Information"] {
        if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
            return Err(ScrapeError::PriceApi(msg.to_string()));
        }
    }

    let series = json
        .get_mut(SERIES_KEY)
        .map(serde_json::Value::take)
        .ok_or_else(|| ScrapeError::PriceApi(format!("response has no {SERIES_KEY:?}")))?;
    let raw: BTreeMap<String, RawDailyBar> = serde_json::from_value(series)?;

    let bars = raw
        .into_iter()
        .filter_map(|(date, raw)| {
            let bar = to_bar(symbol, &date, &raw);
            if bar.is_none() {
                warn!("{}: dropping unparsable bar for {}", symbol, date);
            }
            bar
        })
        .collect();
    Ok(bars)
}

fn to_bar(symbol: &str, date: &str, raw: &RawDailyBar) -> Option<DailyBar> {
    Some(DailyBar {
        symbol: symbol.to_uppercase(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
        open: raw.open.trim().parse().ok()?,
        high: raw.high.trim().parse().ok()?,
        low: raw.low.trim().parse().ok()?,
        close: raw.close.trim().parse().ok()?,
        volume: raw.volume.as_deref().and_then(|v| v.trim().parse().ok()),
    })
}
