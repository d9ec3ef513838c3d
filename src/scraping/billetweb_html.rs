use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::base;
use super::{PageStrategy, Platform};
use crate::models::{EventRecord, Source, UNKNOWN};

const TITLE_SEPARATOR: &str = " - ";
const NOTE: &str = "parsed from page html, no structured data";

static LONG_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+ \w+ \d+, \d{4})").expect("long date regex"));
static DAY_MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}\s+\w+\s+\d{4})").expect("day month year regex"));

pub struct BilletwebFallback;

impl PageStrategy for BilletwebFallback {
    fn id(&self) -> &'static str {
        "billetweb-html"
    }

    fn platform(&self) -> Option<Platform> {
        Some(Platform::Billetweb)
    }

    fn extract(&self, url: &str, html: &str) -> Option<EventRecord> {
        let document = Html::parse_document(html);
        let title = base::page_title(&document)?;
        let name = event_name(&title);
        let start = base::first_capture(&LONG_DATE_RE, html)
            .or_else(|| base::first_capture(&DAY_MONTH_YEAR_RE, html))
            .map(|text| base::clean_text(&text))
            .unwrap_or_else(|| UNKNOWN.to_string());

        let mut record = EventRecord::new(Source::PlatformHtmlFallback, name, start, url);
        record.note = Some(NOTE.to_string());
        Some(record)
    }
}

fn event_name(title: &str) -> String {
    match title.split_once(TITLE_SEPARATOR) {
        Some((name, _)) => name.trim().to_string(),
        None => title.to_string(),
    }
}
