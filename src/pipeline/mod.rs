//! Whole-site crawl: sector list → every sector's ETF table → one file each.
//!
//! Sectors are visited one after another. A sector that fails is logged and
//! counted; the crawl moves on to the next one.

use crate::export::{write_etfs, OutputFormat};
use crate::models::Sector;
use crate::scraper::EtfDataSource;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct Pipeline<S> {
    source: S,
    output_dir: PathBuf,
    format: OutputFormat,
}

impl<S: EtfDataSource> Pipeline<S> {
    pub fn new(source: S, output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
            format,
        }
    }

    pub async fn run(&self) -> Result<PipelineStats> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Could not create dir {:?}", self.output_dir))?;

        // ── 1. Sector list ────────────────────────────────────────────────────
        info!("=== Step 1: Fetching sector list ===");
        let sectors = self.source.fetch_sectors().await
            .context("Sector list fetch failed")?;

        // ── 2. Each sector's ETFs ─────────────────────────────────────────────
        info!("=== Step 2: Crawling {} sectors ===", sectors.len());
        let mut stats = PipelineStats::default();

        for sector in &sectors {
            match self.crawl_sector(sector).await {
                Ok(n) => {
                    stats.sectors_processed += 1;
                    stats.etfs_found += n;
                }
                Err(e) => {
                    warn!("{} ({}): {:#}", sector.sector, sector.sector_id, e);
                    stats.errors += 1;
                }
            }
        }

        info!(
            "=== Done: {} sectors | {} ETFs | {} errors ===",
            stats.sectors_processed, stats.etfs_found, stats.errors
        );
        Ok(stats)
    }

    async fn crawl_sector(&self, sector: &Sector) -> Result<usize> {
        let table = self.source.etfs_by_sector(&sector.sector_id).await
            .with_context(|| format!("etfs_by_sector({})", sector.sector_id))?;

        let path = self.output_path(sector);
        let file = File::create(&path).with_context(|| format!("create {:?}", path))?;
        write_etfs(&table, self.format, BufWriter::new(file))
            .with_context(|| format!("write {:?}", path))?;

        info!("{}: {} ETFs → {}", sector.sector, table.len(), path.display());
        Ok(table.len())
    }

    fn output_path(&self, sector: &Sector) -> PathBuf {
        sector_file(&self.output_dir, sector, self.format)
    }
}

/// `<dir>/<id>-<slug>.<ext>`, e.g. `out/12-equity-uk.csv`
fn sector_file(dir: &Path, sector: &Sector, format: OutputFormat) -> PathBuf {
    let slug = sector
        .sector
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    dir.join(format!("{}-{}.{}", sector.sector_id, slug, format.extension()))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub sectors_processed: usize,
    pub etfs_found: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result as ScrapeResult, ScrapeError};
    use crate::models::{EtfRecord, EtfRow, EtfTable, FactsheetFields};
    use async_trait::async_trait;

    struct StubSource;

    #[async_trait]
    impl EtfDataSource for StubSource {
        async fn fetch_sectors(&self) -> ScrapeResult<Vec<Sector>> {
            Ok(vec![
                Sector { sector_id: "12".into(), sector: "Equity - UK".into() },
                Sector { sector_id: "13".into(), sector: "Broken".into() },
            ])
        }

        async fn fetch_factsheet(&self, _url: &str) -> ScrapeResult<FactsheetFields> {
            Ok(FactsheetFields::default())
        }

        async fn etfs_by_sector(&self, sector_id: &str) -> ScrapeResult<EtfTable> {
            if sector_id == "13" {
                return Err(ScrapeError::missing("table[summary=\"ETF search results\"]"));
            }
            let record = EtfRecord::new(
                EtfRow {
                    symbol: "ISF".into(),
                    company: "iShares".into(),
                    is_sophisticated: false,
                    lse: true,
                    name: "Core FTSE 100".into(),
                    factsheet: "https://hl.test/isf".into(),
                },
                FactsheetFields::default(),
            );
            Ok(EtfTable::new(vec![record]))
        }
    }

    #[test]
    fn test_sector_file() {
        let s = Sector { sector_id: "12".into(), sector: "Equity - UK & Ireland".into() };
        assert_eq!(
            sector_file(Path::new("out"), &s, OutputFormat::Csv),
            PathBuf::from("out/12-equity-uk-ireland.csv")
        );
    }

    #[tokio::test]
    async fn test_run_counts_failures_and_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let pipeline = Pipeline::new(StubSource, &dir, OutputFormat::Csv);

        let stats = pipeline.run().await.unwrap();
        assert_eq!(stats, PipelineStats { sectors_processed: 1, etfs_found: 1, errors: 1 });

        let written = std::fs::read_to_string(dir.join("12-equity-uk.csv")).unwrap();
        assert!(written.lines().nth(1).unwrap().starts_with("ISF,iShares,"));
        assert!(!dir.join("13-broken.csv").exists());
    }
}
