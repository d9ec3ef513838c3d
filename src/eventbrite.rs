use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::http::Fetcher;
use crate::models::{EventRecord, FieldValue, Source};

static LONG_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(\d{10,})(?:\?|$|/)").expect("long id regex"));
static SHORT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/e/(\d+)").expect("short id regex"));

#[derive(Debug, Error)]
pub enum EventbriteError {
    #[error("missing eventbrite token")]
    MissingToken,
    #[error("no event id in url: {0}")]
    MissingEventId(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("event {0} not found")]
    NotFound(String),
}

pub struct EventbriteApi {
    token: String,
    base_url: String,
}

impl EventbriteApi {
    pub fn from_config(config: &AppConfig) -> Result<Self, EventbriteError> {
        let token = config
            .api_key
            .as_ref()
            .ok_or(EventbriteError::MissingToken)?
            .trim()
            .to_string();
        if token.is_empty() {
            return Err(EventbriteError::MissingToken);
        }

        Ok(Self {
            token,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Canonical record for the event behind `url`, or `None` for any failure.
    pub fn lookup(&self, fetcher: &dyn Fetcher, url: &str) -> Option<EventRecord> {
        match self.fetch_event(fetcher, url) {
            Ok(record) => {
                info!(url, "api confirmed event");
                Some(record)
            }
            Err(err) => {
                debug!(url, "api source contributed nothing: {err}");
                None
            }
        }
    }

    fn fetch_event(&self, fetcher: &dyn Fetcher, url: &str) -> Result<EventRecord, EventbriteError> {
        let event_id =
            extract_event_id(url).ok_or_else(|| EventbriteError::MissingEventId(url.to_string()))?;
        let endpoint = format!("{}/events/{}/?expand=venue", self.base_url, event_id);

        let payload = fetcher
            .fetch_json(&endpoint, &self.token)
            .map_err(|err| EventbriteError::Http(format!("{err:#}")))?;
        if payload.get("id").is_none() {
            return Err(EventbriteError::NotFound(event_id));
        }

        Ok(event_record(&payload, url))
    }
}

pub fn extract_event_id(url: &str) -> Option<String> {
    LONG_ID_RE
        .captures(url)
        .or_else(|| SHORT_ID_RE.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn event_record(payload: &Value, url: &str) -> EventRecord {
    let address = FieldValue::at(payload, &["venue", "address", "localized_address_display"])
        .or_else(|| FieldValue::at(payload, &["venue", "address", "address_1"]));
    let canonical_url = FieldValue::at(payload, &["url"])
        .text()
        .unwrap_or(url)
        .to_string();

    let mut record = EventRecord::new(
        Source::Api,
        FieldValue::at(payload, &["name", "text"]).or_unknown(),
        FieldValue::at(payload, &["start", "local"]).or_unknown(),
        &canonical_url,
    );
    record.end_date = Some(FieldValue::at(payload, &["end", "local"]).or_unknown());
    record.timezone = Some(FieldValue::at(payload, &["start", "timezone"]).or_unknown());
    record.location = Some(FieldValue::at(payload, &["venue", "name"]).or_unknown());
    record.address = Some(address.or_unknown());
    record.status = Some(FieldValue::at(payload, &["status"]).or_unknown());
    record
}
