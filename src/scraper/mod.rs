pub mod cleaner;
pub mod document;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::models::{EtfRecord, EtfRow, EtfTable, FactsheetFields, Sector};
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use self::http_client::{HttpClient, PageFetcher};
use self::parsers::{parse_factsheet, parse_results_page, parse_sectors, ResultsPage};

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable ETF data source abstraction.
#[async_trait]
pub trait EtfDataSource: Send + Sync {
    async fn fetch_sectors(&self) -> Result<Vec<Sector>>;
    async fn fetch_factsheet(&self, url: &str) -> Result<FactsheetFields>;
    async fn etfs_by_sector(&self, sector_id: &str) -> Result<EtfTable>;
}

// ── Hargreaves Lansdown scraper ───────────────────────────────────────────────

pub struct HlScraper<F = HttpClient> {
    fetcher: F,
    sectors_url: Url,
    search_url: Url,
    page_size: u32,
}

impl HlScraper<HttpClient> {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Self::with_fetcher(HttpClient::new(config)?, config)
    }
}

impl<F: PageFetcher> HlScraper<F> {
    pub fn with_fetcher(fetcher: F, config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            sectors_url: Url::parse(&config.sectors_url)?,
            search_url: Url::parse(&config.search_url)?,
            page_size: config.page_size,
        })
    }

    /// Search listing for one sector. `offset` is a row offset, not a page.
    fn listing_url(&self, sector_id: &str, offset: Option<u32>) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("etf_search_input", "")
                .append_pair("companyid", "")
                .append_pair("sectorid", sector_id)
                .append_pair("tab", "prices");
            if let Some(offset) = offset {
                q.append_pair("offset", &offset.to_string());
            }
        }
        url
    }

    async fn fetch_results_page(&self, sector_id: &str, offset: Option<u32>) -> Result<ResultsPage> {
        let url = self.listing_url(sector_id, offset);
        info!("Fetching sector {} listing (offset {})", sector_id, offset.unwrap_or(0));

        let html = self.fetcher.get_text(&url).await?;
        let page = parse_results_page(&html, &url, self.page_size)?;
        debug!("  {} rows, offsets linked: {:?}", page.rows.len(), page.offsets);
        Ok(page)
    }

    /// Fetch every row's fact sheet, one after another.
    async fn enrich(&self, rows: Vec<EtfRow>) -> Result<Vec<EtfRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let fields = self.fetch_factsheet(&row.factsheet).await?;
            debug!("{}: charge={:?} launch={:?}", row.symbol, fields.charge, fields.launch_date);
            records.push(EtfRecord::new(row, fields));
        }
        Ok(records)
    }
}

#[async_trait]
impl<F: PageFetcher> EtfDataSource for HlScraper<F> {
    async fn fetch_sectors(&self) -> Result<Vec<Sector>> {
        info!("Fetching sector list ({})", self.sectors_url);
        let html = self.fetcher.get_text(&self.sectors_url).await?;
        let sectors = parse_sectors(&html)?;
        info!("{} sectors", sectors.len());
        Ok(sectors)
    }

    async fn fetch_factsheet(&self, url: &str) -> Result<FactsheetFields> {
        let url = Url::parse(url)?;
        let html = self.fetcher.get_text(&url).await?;
        Ok(parse_factsheet(&html))
    }

    async fn etfs_by_sector(&self, sector_id: &str) -> Result<EtfTable> {
        let first = self.fetch_results_page(sector_id, None).await?;
        let offsets = first.offsets;
        let mut records = self.enrich(first.rows).await?;

        // Offset 0 is the page just fetched. Only links on page 1 are followed.
        for offset in offsets.into_iter().filter(|&o| o != 0) {
            let page = self.fetch_results_page(sector_id, Some(offset)).await?;
            records.extend(self.enrich(page.rows).await?);
        }

        info!("Sector {}: {} ETFs", sector_id, records.len());
        Ok(EtfTable::new(records))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
