//! Render sectors, ETF tables and price bars as text, CSV or JSON.

use crate::error::Result;
use crate::models::{DailyBar, EtfTable, Sector};
use crate::utils::{fmt_date, fmt_ratio};
use clap::ValueEnum;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Table => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

const ETF_HEADER: [&str; 9] = [
    "symbol",
    "company",
    "is_sophisticated",
    "lse",
    "name",
    "factsheet",
    "launch_date",
    "charge",
    "dividend",
];

// ── Sectors ───────────────────────────────────────────────────────────────────

pub fn write_sectors<W: Write>(sectors: &[Sector], format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{:>8}  {}", "ID", "SECTOR")?;
            for s in sectors {
                writeln!(out, "{:>8}  {}", s.sector_id, s.sector)?;
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for s in sectors {
                wtr.serialize(s)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, sectors)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// ── ETFs ──────────────────────────────────────────────────────────────────────

pub fn write_etfs<W: Write>(table: &EtfTable, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(
                out,
                "{:<8} {:<40} {:>4} {:>4} {:>8} {:>11} {}",
                "SYMBOL", "NAME", "SOPH", "LSE", "CHARGE", "LAUNCHED", "DIVIDEND"
            )?;
            for r in table.records() {
                let f = &r.factsheet_fields;
                writeln!(
                    out,
                    "{:<8} {:<40} {:>4} {:>4} {:>8} {:>11} {}",
                    r.row.symbol,
                    truncate(&r.row.name, 40),
                    yes_no(r.row.is_sophisticated),
                    yes_no(r.row.lse),
                    fmt_ratio(f.charge),
                    fmt_date(f.launch_date),
                    f.dividend.as_deref().unwrap_or("—"),
                )?;
            }
        }
        OutputFormat::Csv => {
            // Written by hand: `dividend` is skipped by serde when absent,
            // but every CSV row needs the same columns.
            let mut wtr = csv::Writer::from_writer(out);
            wtr.write_record(ETF_HEADER)?;
            for r in table.records() {
                let f = &r.factsheet_fields;
                wtr.write_record([
                    r.row.symbol.clone(),
                    r.row.company.clone(),
                    r.row.is_sophisticated.to_string(),
                    r.row.lse.to_string(),
                    r.row.name.clone(),
                    r.row.factsheet.clone(),
                    f.launch_date.map(|d| d.to_string()).unwrap_or_default(),
                    f.charge.map(|c| c.to_string()).unwrap_or_default(),
                    f.dividend.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, table)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// ── Price bars ────────────────────────────────────────────────────────────────

pub fn write_bars<W: Write>(bars: &[DailyBar], format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}", "DATE", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME")?;
            for b in bars {
                writeln!(
                    out,
                    "{:<10} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>12}",
                    b.date,
                    b.open,
                    b.high,
                    b.low,
                    b.close,
                    b.volume.map(|v| v.to_string()).unwrap_or_else(|| "—".into()),
                )?;
            }
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for b in bars {
                wtr.serialize(b)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, bars)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b { "Y" } else { "N" }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max - 1).collect();
        t.push('…');
        t
    }
}
