use crate::error::{Result, ScrapeError};
use crate::models::{EtfRow, FactsheetFields, Sector};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, warn};
use url::Url;

use super::cleaner::{normalise_value, parse_launch_date, parse_page_number, percent_to_ratio};
use super::document::{Document, Element};

static SECTOR_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[0-9]+").expect("Failed to compile SECTOR_ID_RE"));
static VIEW_PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^View page").expect("Failed to compile VIEW_PAGE_RE"));
static LAUNCH_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^Launch date").expect("Failed to compile LAUNCH_DATE_RE"));
static ONGOING_CHARGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^Ongoing Charge").expect("Failed to compile ONGOING_CHARGE_RE"));
static DIVIDEND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^Income or accumulation").expect("Failed to compile DIVIDEND_RE"));

const RESULTS_TABLE_SUMMARY: &str = "ETF search results";
const RESULT_ROW_CELLS: usize = 6;

// ── Sector list ───────────────────────────────────────────────────────────────

pub fn parse_sectors(html: &str) -> Result<Vec<Sector>> {
    let doc = Document::parse(html);
    let select = doc
        .find_by_attr("select", "id", "sectorid")
        .ok_or_else(|| ScrapeError::missing("select#sectorid on sector page"))?;

    let sectors = select
        .find_all("option")
        .into_iter()
        .filter_map(|option| {
            let value = option.attr("value")?;
            if !SECTOR_ID_RE.is_match(value) {
                return None;
            }
            Some(Sector {
                sector_id: value.to_string(),
                sector: option.text(),
            })
        })
        .collect();

    Ok(sectors)
}

// ── Fact sheet ────────────────────────────────────────────────────────────────

/// Ways of locating the element whose parent row holds a field's value.
/// Tried in order; the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStrategy {
    /// `<th>Label</th>` — the header cell itself.
    TableHeader,
    /// `<span>Label</span>` — the block wrapping the span.
    InlineLabel,
}

pub const LABEL_STRATEGIES: [LabelStrategy; 2] =
    [LabelStrategy::TableHeader, LabelStrategy::InlineLabel];

impl LabelStrategy {
    pub fn locate<'a>(&self, doc: &'a Document, label: &Regex) -> Option<Element<'a>> {
        match self {
            Self::TableHeader => doc.find_by_text("th", label).into_iter().next(),
            Self::InlineLabel => doc
                .find_by_text("span", label)
                .into_iter()
                .next()
                .and_then(|span| span.parent()),
        }
    }
}

/// Lower-cased text of the first `td` in the row holding `label`.
pub fn extract_field(doc: &Document, label: &Regex) -> Option<String> {
    let (strategy, anchor) = LABEL_STRATEGIES
        .iter()
        .find_map(|s| s.locate(doc, label).map(|el| (s, el)))?;

    let value = anchor.parent()?.find("td").map(|td| normalise_value(&td.text()));
    if value.is_none() {
        debug!("{:?} matched {:?} but its row has no <td>", strategy, label.as_str());
    }
    value
}

pub fn parse_factsheet(html: &str) -> FactsheetFields {
    let doc = Document::parse(html);

    FactsheetFields {
        launch_date: extract_field(&doc, &LAUNCH_DATE_RE).and_then(|s| parse_launch_date(&s)),
        charge: extract_field(&doc, &ONGOING_CHARGE_RE).and_then(|s| percent_to_ratio(&s)),
        dividend: extract_field(&doc, &DIVIDEND_RE),
    }
}

// ── Search results ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ResultsPage {
    pub rows: Vec<EtfRow>,
    /// Row offsets linked from this page, ascending. May include 0.
    pub offsets: BTreeSet<u32>,
}

/// Parse one page of the ETF search listing.
///
/// Relative fact-sheet links are resolved against `page_url`.
pub fn parse_results_page(html: &str, page_url: &Url, page_size: u32) -> Result<ResultsPage> {
    let doc = Document::parse(html);
    let table = doc
        .find_by_attr("table", "summary", RESULTS_TABLE_SUMMARY)
        .ok_or_else(|| ScrapeError::missing(format!("table[summary=\"{RESULTS_TABLE_SUMMARY}\"]")))?;

    let mut rows = Vec::new();
    for tr in table.find_all("tr") {
        let cells = tr.find_all("td");
        if cells.len() != RESULT_ROW_CELLS {
            continue;
        }
        rows.push(parse_result_row(&cells, page_url)?);
    }

    Ok(ResultsPage {
        rows,
        offsets: discover_offsets(table, page_size),
    })
}

fn parse_result_row(cells: &[Element<'_>], page_url: &Url) -> Result<EtfRow> {
    let symbol = cells[0].text();
    let link = cells[1]
        .find("a")
        .ok_or_else(|| ScrapeError::missing(format!("fact-sheet link for {symbol}")))?;
    let href = link
        .attr("href")
        .ok_or_else(|| ScrapeError::missing(format!("fact-sheet href for {symbol}")))?;

    Ok(EtfRow {
        company: link.text(),
        is_sophisticated: cells[2].has_content(),
        lse: cells[3].has_content(),
        name: cells[4].text(),
        factsheet: page_url.join(href)?.to_string(),
        symbol,
    })
}

/// Row offsets for every "View page N" link inside the results table.
pub fn discover_offsets(table: Element<'_>, page_size: u32) -> BTreeSet<u32> {
    table
        .find_all_by_attr_pattern("a", "title", &VIEW_PAGE_RE)
        .into_iter()
        .filter_map(|a| {
            let text = a.text();
            let page = parse_page_number(&text);
            if page.is_none() {
                warn!("Ignoring pagination link with text {:?}", text);
            }
            page
        })
        .collect::<BTreeSet<u32>>()
        .into_iter()
        .filter_map(|page| (page - 1).checked_mul(page_size))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
