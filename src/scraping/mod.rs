pub mod base;
pub mod billetweb_html;
pub mod eventbrite_html;
pub mod json_ld;

use tracing::debug;

use crate::models::{EventRecord, SourceOutcome};
use crate::utils;

pub const PAGE_NOT_FOUND_REASON: &str = "page not found — event deleted or nonexistent";

const NOT_FOUND_MARKERS: [&str; 1] = ["Impossible de trouver"];
const NOT_FOUND_PREFIX_CHARS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Eventbrite,
    Billetweb,
}

impl Platform {
    pub fn detect(url: &str) -> Option<Platform> {
        let host = utils::host_of(url)?;
        if host.contains("eventbrite") {
            Some(Platform::Eventbrite)
        } else if host.contains("billetweb") {
            Some(Platform::Billetweb)
        } else {
            None
        }
    }

    pub fn has_api(&self) -> bool {
        matches!(self, Platform::Eventbrite)
    }
}

/// One tier of page extraction. Tiers never fetch; they only read the body they are given.
pub trait PageStrategy: Send + Sync {
    fn id(&self) -> &'static str;
    /// Platform this tier is limited to, `None` for every page.
    fn platform(&self) -> Option<Platform>;
    fn extract(&self, url: &str, html: &str) -> Option<EventRecord>;
}

fn active_strategies() -> Vec<Box<dyn PageStrategy>> {
    vec![
        Box::new(json_ld::StructuredData),
        Box::new(eventbrite_html::EventbriteFallback),
        Box::new(billetweb_html::BilletwebFallback),
    ]
}

pub fn strategy_ids() -> Vec<&'static str> {
    active_strategies()
        .iter()
        .map(|strategy| strategy.id())
        .collect()
}

/// Runs the tiers in order and returns the first hit. A page that only says the
/// event is gone yields `Missing`; a page with nothing usable yields `None`.
pub fn verify_page(url: &str, html: &str) -> Option<SourceOutcome> {
    let platform = Platform::detect(url);

    for strategy in active_strategies() {
        if let Some(required) = strategy.platform() {
            if platform != Some(required) {
                continue;
            }
        }
        if let Some(record) = strategy.extract(url, html) {
            debug!(strategy = strategy.id(), "page tier matched");
            return Some(SourceOutcome::Record(record));
        }
    }

    if looks_not_found(html) {
        debug!(url, "page reports the event as missing");
        return Some(SourceOutcome::Missing {
            reason: PAGE_NOT_FOUND_REASON.to_string(),
        });
    }

    debug!(url, "no page tier produced an event");
    None
}

fn looks_not_found(html: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|marker| html.contains(marker))
        || base::head(html, NOT_FOUND_PREFIX_CHARS).contains("404")
}
