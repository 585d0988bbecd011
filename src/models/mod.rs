use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Sector ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sector {
    pub sector_id: String,
    pub sector: String,
}

// ── Listing row ───────────────────────────────────────────────────────────────

/// One six-cell row of the ETF search results table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EtfRow {
    pub symbol: String,
    pub company: String,
    pub is_sophisticated: bool,
    pub lse: bool,
    pub name: String,
    pub factsheet: String,
}

// ── Fact sheet ────────────────────────────────────────────────────────────────

/// Best-effort fields scraped from a fact-sheet page.
///
/// `launch_date` and `charge` always serialize (as `null` when missing);
/// `dividend` is left out entirely when the page has no such label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FactsheetFields {
    pub launch_date: Option<NaiveDate>,
    pub charge: Option<f64>, // ratio, 0.0025 == 0.25%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend: Option<String>,
}

// ── ETF record ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EtfRecord {
    #[serde(flatten)]
    pub row: EtfRow,
    #[serde(flatten)]
    pub factsheet_fields: FactsheetFields,
}

impl EtfRecord {
    pub fn new(row: EtfRow, factsheet_fields: FactsheetFields) -> Self {
        Self { row, factsheet_fields }
    }

    pub fn symbol(&self) -> &str {
        &self.row.symbol
    }
}

/// ETF records indexed by symbol, kept in page-visit order.
///
/// Rows repeated across result pages are not merged.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct EtfTable {
    records: Vec<EtfRecord>,
}

impl EtfTable {
    pub fn new(records: Vec<EtfRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EtfRecord] {
        &self.records
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(EtfRecord::symbol)
    }

    pub fn has_unique_symbols(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.symbols().all(|s| seen.insert(s))
    }
}

#[cfg(test)]
impl EtfTable {
    /// First record carrying `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&EtfRecord> {
        self.records.iter().find(|r| r.symbol() == symbol)
    }
}

// ── Daily price bar ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}
