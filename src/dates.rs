use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Tristate, UNKNOWN};

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+-]\d{2}:\d{2}$").expect("valid offset regex"));
static TARGET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid target date regex"));

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses the ISO shapes the sources emit. Offsets and a trailing `Z` are dropped,
/// not applied, so the result is the wall-clock time the source wrote down.
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN {
        return None;
    }

    let without_offset = OFFSET_RE.replace(trimmed, "");
    let cleaned = without_offset
        .strip_suffix('Z')
        .unwrap_or(&without_offset);

    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(cleaned, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Strict `YYYY-MM-DD` only.
pub fn parse_target(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if !TARGET_RE.is_match(trimmed) {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

pub fn calendar_date(input: &str) -> Option<NaiveDate> {
    parse_date(input).map(|dt| dt.date())
}

pub fn check_date_match(event_date: &str, target_date: &str) -> Tristate {
    match (calendar_date(event_date), parse_target(target_date)) {
        (Some(event), Some(target)) => Tristate::from(Some(event == target)),
        _ => Tristate::Unknown,
    }
}
