use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Sentinel stored in place of a value a source did not provide in a usable shape.
pub const UNKNOWN: &str = "unknown";

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Api,
    StructuredData,
    PlatformHtmlFallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Api => "api",
            Source::StructuredData => "structured-data",
            Source::PlatformHtmlFallback => "platform-html-fallback",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-valued answer that serializes as `true`, `false` or `null`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tristate {
    Yes,
    No,
    Unknown,
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Tristate::Yes,
            Some(false) => Tristate::No,
            None => Tristate::Unknown,
        }
    }
}

impl Serialize for Tristate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tristate::Yes => serializer.serialize_bool(true),
            Tristate::No => serializer.serialize_bool(false),
            Tristate::Unknown => serializer.serialize_none(),
        }
    }
}

/// A single field pulled out of a loosely-shaped JSON payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Absent,
    Malformed,
}

impl FieldValue {
    /// Walks `path` through nested objects. A non-object met midway is `Malformed`.
    pub fn at(root: &Value, path: &[&str]) -> FieldValue {
        let mut current = root;
        for key in path {
            match current {
                Value::Object(map) => match map.get(*key) {
                    Some(next) => current = next,
                    None => return FieldValue::Absent,
                },
                Value::Null => return FieldValue::Absent,
                _ => return FieldValue::Malformed,
            }
        }
        FieldValue::from_json(current)
    }

    pub fn from_json(value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Absent,
            Value::String(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    FieldValue::Absent
                } else {
                    FieldValue::Text(trimmed.to_string())
                }
            }
            Value::Number(num) => FieldValue::Text(num.to_string()),
            _ => FieldValue::Malformed,
        }
    }

    pub fn or_else<F>(self, fallback: F) -> FieldValue
    where
        F: FnOnce() -> FieldValue,
    {
        match self {
            FieldValue::Text(_) => self,
            _ => fallback(),
        }
    }

    pub fn or_unknown(self) -> String {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Absent | FieldValue::Malformed => UNKNOWN.to_string(),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

pub fn is_known(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != UNKNOWN
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub source: Source,
    pub name: String,
    #[serde(rename = "date")]
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub url: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl EventRecord {
    pub fn new(source: Source, name: String, start: String, url: &str) -> Self {
        Self {
            source,
            name,
            start,
            end_date: None,
            timezone: None,
            location: None,
            address: None,
            status: None,
            url: url.to_string(),
            verified: true,
            note: None,
        }
    }
}

/// What one source contributed to a verification run.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceOutcome {
    Record(EventRecord),
    /// The page exists but says the event is gone.
    Missing { reason: String },
}

impl SourceOutcome {
    pub fn start(&self) -> Option<&str> {
        match self {
            SourceOutcome::Record(record) => Some(&record.start),
            SourceOutcome::Missing { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceOutcome::Record(record) => record.source.as_str(),
            SourceOutcome::Missing { .. } => "page",
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct VerificationResult {
    #[serde(flatten)]
    pub record: EventRecord,
    pub cross_verified: Tristate,
    pub verification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_date: Option<String>,
    pub sources_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_matches_target: Option<Tristate>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Unverified {
    pub verified: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources_checked: Vec<String>,
}

impl Unverified {
    pub fn new(reason: impl Into<String>, sources_checked: Vec<String>) -> Self {
        Self {
            verified: false,
            reason: reason.into(),
            sources_checked,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Verdict {
    Verified(VerificationResult),
    Unverified(Unverified),
}

impl Verdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified(_))
    }
}
