use chrono::NaiveDate;
use std::time::Instant;
use tracing::info;

/// Logs how long a command took when dropped.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("⏱  {} done in {:.2?}", self.label, self.start.elapsed());
    }
}

/// 0.0007 → "0.07%"
pub fn fmt_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.2}%", r * 100.0),
        None => "—".to_string(),
    }
}

pub fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "—".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_ratio() {
        assert_eq!(fmt_ratio(Some(0.0007)), "0.07%");
        assert_eq!(fmt_ratio(Some(0.0525)), "5.25%");
        assert_eq!(fmt_ratio(None), "—");
    }

    #[test]
    fn test_fmt_date() {
        assert_eq!(fmt_date(NaiveDate::from_ymd_opt(2010, 9, 6)), "2010-09-06");
        assert_eq!(fmt_date(None), "—");
    }
}
