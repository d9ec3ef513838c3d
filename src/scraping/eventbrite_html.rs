use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use super::base;
use super::{PageStrategy, Platform};
use crate::models::{EventRecord, Source, UNKNOWN};

static DATETIME_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"datetime="(\d{4}-\d{2}-\d{2}T\d{2}:\d{2})"#).expect("datetime attr regex")
});

/// Eventbrite pages without ld+json still carry `<time datetime="...">`.
pub struct EventbriteFallback;

impl PageStrategy for EventbriteFallback {
    fn id(&self) -> &'static str {
        "eventbrite-html"
    }

    fn platform(&self) -> Option<Platform> {
        Some(Platform::Eventbrite)
    }

    fn extract(&self, url: &str, html: &str) -> Option<EventRecord> {
        let start = base::first_capture(&DATETIME_ATTR_RE, html)?;
        let document = Html::parse_document(html);
        let name = base::page_title(&document).unwrap_or_else(|| UNKNOWN.to_string());
        Some(EventRecord::new(
            Source::PlatformHtmlFallback,
            name,
            start,
            url,
        ))
    }
}
