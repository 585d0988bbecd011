use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9.\-]+)%").expect("Failed to compile PERCENT_RE"));

// ── Parsers ───────────────────────────────────────────────────────────────────

/// First `<number>%` in the text, as a ratio.
/// "5.25%" → 0.0525 | "0.07% (as at 01/01/2024)" → 0.0007 | "no data" → None
pub fn percent_to_ratio(s: &str) -> Option<f64> {
    let number = PERCENT_RE.captures(s)?.get(1)?.as_str();
    let value: f64 = number.parse().ok()?;
    Some(value / 100.0)
}

/// Fact-sheet dates arrive lower-cased, e.g. "06 september 2010".
/// Slash dates are read day-first, then month-first: "06/09/2010" is 6 Sep,
/// "12/31/2010" is 31 Dec.
pub fn parse_launch_date(s: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 8] = [
        "%d %B %Y",
        "%d %b %Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%m/%d/%Y",
        "%d-%m-%Y",
    ];

    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Collapse runs of whitespace (HTML text nodes carry newlines and indents).
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fact-sheet cell values are compared lower-case.
pub fn normalise_value(s: &str) -> String {
    clean_text(s).to_lowercase()
}

/// "3" → Some(3); "Next", "0" → None
pub fn parse_page_number(s: &str) -> Option<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_ratio() {
        let r = percent_to_ratio("5.25%").unwrap();
        assert!((r - 0.0525).abs() < 1e-12);
        assert_eq!(percent_to_ratio("no data"), None);
        assert_eq!(percent_to_ratio(""), None);
    }

    #[test]
    fn test_percent_to_ratio_embedded() {
        let r = percent_to_ratio("ongoing charge: 0.07% p.a.").unwrap();
        assert!((r - 0.0007).abs() < 1e-12);
        let neg = percent_to_ratio("-1.5%").unwrap();
        assert!((neg + 0.015).abs() < 1e-12);
        // captured but not a number
        assert_eq!(percent_to_ratio("1.2.3%"), None);
    }

    #[test]
    fn test_parse_launch_date() {
        let d = NaiveDate::from_ymd_opt(2010, 9, 6);
        assert_eq!(parse_launch_date("06 september 2010"), d);
        assert_eq!(parse_launch_date("06 Sep 2010"), d);
        assert_eq!(parse_launch_date("2010-09-06"), d);
        assert_eq!(parse_launch_date("06/09/2010"), d);
        assert_eq!(parse_launch_date("n/a"), None);
        assert_eq!(parse_launch_date("  "), None);
    }

    #[test]
    fn test_parse_launch_date_month_first_fallback() {
        assert_eq!(parse_launch_date("12/31/2010"), NaiveDate::from_ymd_opt(2010, 12, 31));
        assert_eq!(parse_launch_date("13/13/2010"), None);
    }

    #[test]
    fn test_normalise_value() {
        assert_eq!(normalise_value("  Accumulation\n  "), "accumulation");
        assert_eq!(clean_text("iShares  Core\nFTSE 100"), "iShares Core FTSE 100");
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number(" 3 "), Some(3));
        assert_eq!(parse_page_number("Next"), None);
        assert_eq!(parse_page_number("0"), None);
    }
}
