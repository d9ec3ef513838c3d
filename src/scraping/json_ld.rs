use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::{PageStrategy, Platform};
use crate::models::{EventRecord, FieldValue, Source, UNKNOWN};

const EVENT_TYPES: [&str; 5] = [
    "Event",
    "SocialEvent",
    "BusinessEvent",
    "MusicEvent",
    "SportEvent",
];
const ITEM_LIST_TYPE: &str = "ItemList";

static LD_JSON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("ld+json selector")
});

pub struct StructuredData;

impl PageStrategy for StructuredData {
    fn id(&self) -> &'static str {
        "structured-data"
    }

    fn platform(&self) -> Option<Platform> {
        None
    }

    fn extract(&self, url: &str, html: &str) -> Option<EventRecord> {
        let events = extract_events(html);
        if events.len() > 1 {
            debug!(count = events.len(), "several events on page, keeping the first");
        }
        events.first().map(|event| event_record(event, url))
    }
}

/// Every event-like object embedded in the page's ld+json blocks, in document order.
/// Blocks that do not parse are skipped.
pub fn extract_events(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let mut events = Vec::new();

    for script in document.select(&LD_JSON_SELECTOR) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(data) => collect_events(data, &mut events),
            Err(err) => debug!("skipping malformed ld+json block: {err}"),
        }
    }

    events
}

fn collect_events(data: Value, out: &mut Vec<Value>) {
    match data {
        Value::Array(items) => {
            for item in items {
                if is_event(&item) {
                    out.push(item);
                }
            }
        }
        Value::Object(_) => {
            if is_event(&data) {
                out.push(data);
            } else if has_type(&data, ITEM_LIST_TYPE) {
                if let Some(Value::Array(items)) = data.get("itemListElement") {
                    out.extend(items.iter().filter(|item| is_event(item)).cloned());
                }
            } else if let Some(graph @ Value::Array(_)) = data.get("@graph") {
                collect_events(graph.clone(), out);
            }
        }
        _ => {}
    }
}

fn is_event(value: &Value) -> bool {
    EVENT_TYPES.iter().any(|kind| has_type(value, kind))
}

fn has_type(value: &Value, kind: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(declared)) => declared == kind,
        Some(Value::Array(declared)) => declared.iter().any(|entry| entry.as_str() == Some(kind)),
        _ => false,
    }
}

pub fn event_record(event: &Value, url: &str) -> EventRecord {
    let (location, address) = location_fields(event.get("location"));

    let mut record = EventRecord::new(
        Source::StructuredData,
        FieldValue::at(event, &["name"]).or_unknown(),
        FieldValue::at(event, &["startDate"]).or_unknown(),
        url,
    );
    record.end_date = Some(FieldValue::at(event, &["endDate"]).or_unknown());
    record.location = Some(location);
    record.address = Some(address);
    record
}

fn location_fields(location: Option<&Value>) -> (String, String) {
    let place = match location {
        Some(value @ Value::Object(_)) => value,
        _ => return (UNKNOWN.to_string(), UNKNOWN.to_string()),
    };

    let name = FieldValue::at(place, &["name"]).or_unknown();
    let address = match place.get("address") {
        Some(addr @ Value::Object(_)) => FieldValue::at(addr, &["streetAddress"])
            .or_else(|| FieldValue::at(addr, &["name"]))
            .or_unknown(),
        Some(addr @ Value::String(_)) => FieldValue::from_json(addr).or_unknown(),
        _ => UNKNOWN.to_string(),
    };
    (name, address)
}
