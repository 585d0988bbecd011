mod config;
mod error;
mod export;
mod models;
mod pipeline;
mod prices;
mod scraper;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::export::{write_bars, write_etfs, write_sectors, OutputFormat};
use crate::pipeline::Pipeline;
use crate::prices::{AlphaVantageClient, OutputSize};
use crate::scraper::{EtfDataSource, HlScraper};

#[derive(Parser)]
#[command(name = "hl-etf", about = "Hargreaves Lansdown ETF sector and fact-sheet harvester", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// List ETF sectors (id → name)
    Sectors {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every ETF in one sector, with fact-sheet details
    Etfs {
        /// Sector id, as printed by `sectors`
        #[arg(short, long)]
        sector: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Crawl all sectors, one output file per sector
    Crawl {
        #[arg(short = 'd', long, default_value = "out")]
        output_dir: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// Fetch a single fact sheet and print its fields
    Factsheet {
        #[arg(short, long)]
        url: String,
    },

    /// Daily price history from Alpha Vantage
    Historical {
        #[arg(short, long)]
        symbol: String,

        /// Falls back to ALPHAVANTAGE_API_KEY, then the config file
        #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Full history instead of the latest 100 sessions
        #[arg(long)]
        full: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// stdout, or a buffered file when `path` is given.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let file = File::create(p).with_context(|| format!("create {:?}", p))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "hl_etf_harvest=info,warn",
        1 => "hl_etf_harvest=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Sectors { format, output } => {
            let _t = utils::Timer::start("Sector list");
            let scraper = HlScraper::new(&config.scraper).context("Failed to build scraper")?;
            let sectors = scraper.fetch_sectors().await?;
            write_sectors(&sectors, format, open_output(output.as_deref())?)?;
        }

        Command::Etfs { sector, format, output } => {
            let _t = utils::Timer::start(format!("Sector {} ETFs", sector));
            let scraper = HlScraper::new(&config.scraper).context("Failed to build scraper")?;
            let table = scraper.etfs_by_sector(&sector).await
                .with_context(|| format!("etfs_by_sector({})", sector))?;
            if table.is_empty() {
                warn!("Sector {}: no ETFs listed", sector);
            } else if !table.has_unique_symbols() {
                info!("Sector {}: some symbols appear on more than one page", sector);
            }
            write_etfs(&table, format, open_output(output.as_deref())?)?;
        }

        Command::Crawl { output_dir, format } => {
            let _t = utils::Timer::start("Full crawl");
            let scraper = HlScraper::new(&config.scraper).context("Failed to build scraper")?;
            let stats = Pipeline::new(scraper, output_dir, format).run().await?;
            info!(
                "Done: {} sectors, {} ETFs, {} errors",
                stats.sectors_processed, stats.etfs_found, stats.errors
            );
        }

        Command::Factsheet { url } => {
            let scraper = HlScraper::new(&config.scraper).context("Failed to build scraper")?;
            let fields = scraper.fetch_factsheet(&url).await?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }

        Command::Historical { symbol, api_key, full, format, output } => {
            let _t = utils::Timer::start(format!("{} price history", symbol));
            let api_key = api_key.or_else(|| config.prices.api_key.clone());
            let client = AlphaVantageClient::new(&config.prices, api_key)?;
            let size = if full { OutputSize::Full } else { OutputSize::Compact };
            let bars = client.historical(&symbol, size).await?;
            write_bars(&bars, format, open_output(output.as_deref())?)?;
        }
    }

    Ok(())
}
