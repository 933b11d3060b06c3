//! Type guards and duplicate detection over untrusted JSON
//!
//! Everything here is a pure predicate; none of these functions allocate
//! beyond what they return.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::canonical::canonicalize;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Milliseconds in an average Gregorian year
pub const MS_PER_YEAR: f64 = 365.2425 * 24.0 * 60.0 * 60.0 * 1000.0;

pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

pub fn is_number(value: &Value) -> bool {
    value.is_number()
}

/// Field lookup that treats an explicit `null` like an absent key
pub fn present<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

/// Plausibility window for epoch-millisecond timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampWindow {
    /// Reference "now" in epoch milliseconds
    pub now_ms: f64,
    /// Oldest accepted age in milliseconds
    pub max_age_ms: f64,
    /// How far past `now_ms` a timestamp may sit; `None` accepts any future value
    pub future_tolerance_ms: Option<f64>,
}

impl TimestampWindow {
    pub fn new(now_ms: f64, max_age_years: f64) -> Self {
        Self {
            now_ms,
            max_age_ms: max_age_years * MS_PER_YEAR,
            future_tolerance_ms: None,
        }
    }

    /// Reject timestamps more than `tolerance_ms` in the future
    pub fn bounded_future(mut self, tolerance_ms: f64) -> Self {
        self.future_tolerance_ms = Some(tolerance_ms.max(0.0));
        self
    }

    pub fn contains(&self, ts: f64) -> bool {
        is_valid_timestamp(ts, self)
    }
}

/// Non-negative, finite, not older than the window, and (when bounded) not
/// beyond the allowed future skew
pub fn is_valid_timestamp(ts: f64, window: &TimestampWindow) -> bool {
    if !ts.is_finite() || ts < 0.0 {
        return false;
    }
    if ts < window.now_ms - window.max_age_ms {
        return false;
    }
    match window.future_tolerance_ms {
        Some(tolerance) => ts <= window.now_ms + tolerance,
        None => true,
    }
}

/// Parse the date formats persisted deployment records use in practice
pub fn parse_date_like(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn is_date_like(text: &str) -> bool {
    parse_date_like(text).is_some()
}

/// Ids that occur more than once, with their occurrence counts
/// Comparable text of a `contractId` value; `None` when absent or null.
///
/// Strings are used as-is, anything else by its canonical JSON text, so `7`
/// and `7.0` group together.
pub fn contract_id_key(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(canonicalize(other).unwrap_or_else(|_| other.clone()).to_string()),
    }
}

pub fn find_duplicate_ids<'a, I>(ids: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id.to_string()).or_insert(0) += 1;
    }
    counts.retain(|_, count| *count > 1);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: f64 = 1_700_000_000_000.0;

    #[test]
    fn test_type_guards() {
        assert!(is_object(&json!({})));
        assert!(!is_object(&json!([])));
        assert!(is_string(&json!("x")));
        assert!(is_number(&json!(1.5)));
        assert!(!is_number(&json!("1")));
    }

    #[test]
    fn test_present_skips_null() {
        let map = json!({ "a": null, "b": 1 });
        let map = map.as_object().unwrap();
        assert!(present(map, "a").is_none());
        assert!(present(map, "b").is_some());
        assert!(present(map, "c").is_none());
    }

    #[test]
    fn test_timestamp_window() {
        let window = TimestampWindow::new(NOW, 100.0);
        assert!(window.contains(NOW));
        assert!(window.contains(NOW + 1_000_000.0));
        assert!(!window.contains(-5.0));
        assert!(!window.contains(NOW - 101.0 * MS_PER_YEAR));
        assert!(!window.contains(f64::NAN));

        let strict = window.bounded_future(0.0);
        assert!(strict.contains(NOW));
        assert!(!strict.contains(NOW + 1.0));
    }

    #[test]
    fn test_zero_is_too_old_for_recent_now() {
        // Epoch zero is only valid while "now" is within the window
        let window = TimestampWindow::new(NOW, 100.0);
        assert!(window.contains(0.0));
        let far_future = TimestampWindow::new(NOW + 100.0 * MS_PER_YEAR, 100.0);
        assert!(!far_future.contains(0.0));
    }

    #[test]
    fn test_date_parsing() {
        assert!(is_date_like("2024-01-15T10:30:00Z"));
        assert!(is_date_like("2024-01-15T10:30:00.123+02:00"));
        assert!(is_date_like("2024-01-15"));
        assert!(is_date_like("2024-01-15T10:30:00"));
        assert!(is_date_like("Mon, 15 Jan 2024 10:30:00 +0000"));
        assert!(!is_date_like("not-a-date"));
        assert!(!is_date_like("2024-13-45"));
        assert!(!is_date_like(""));
    }

    #[test]
    fn test_contract_id_key() {
        assert_eq!(contract_id_key(Some(&json!("CABC"))).as_deref(), Some("CABC"));
        assert_eq!(contract_id_key(Some(&json!(""))).as_deref(), Some(""));
        assert_eq!(contract_id_key(Some(&json!(7))), contract_id_key(Some(&json!(7.0))));
        assert_eq!(contract_id_key(Some(&json!(7))).as_deref(), Some("7"));
        assert!(contract_id_key(Some(&Value::Null)).is_none());
        assert!(contract_id_key(None).is_none());
    }

    #[test]
    fn test_find_duplicate_ids() {
        let dupes = find_duplicate_ids(["a", "b", "a", "c", "a", "b"]);
        assert_eq!(dupes.len(), 2);
        assert_eq!(dupes["a"], 3);
        assert_eq!(dupes["b"], 2);
        assert!(find_duplicate_ids(["x", "y"]).is_empty());
    }
}
