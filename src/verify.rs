use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::dates;
use crate::eventbrite::EventbriteApi;
use crate::http::Fetcher;
use crate::models::{
    EventRecord, SourceOutcome, Tristate, Unverified, Verdict, VerificationResult,
};
use crate::scraping::{self, Platform};

pub const NO_SOURCE_REASON: &str = "no source could verify this event";

const API_SLOT: &str = "api";
const PAGE_SLOT: &str = "page";

/// Runs both sources for one URL and merges what they report.
pub struct Verifier<F: Fetcher> {
    fetcher: F,
    api: Option<EventbriteApi>,
}

impl<F: Fetcher> Verifier<F> {
    pub fn new(fetcher: F, config: &AppConfig) -> Self {
        let api = match EventbriteApi::from_config(config) {
            Ok(api) => Some(api),
            Err(err) => {
                debug!("api source unavailable: {err}");
                None
            }
        };
        Self { fetcher, api }
    }

    pub fn verify(&self, url: &str, target_date: Option<&str>) -> Verdict {
        let api_capable = Platform::detect(url).is_some_and(|platform| platform.has_api());
        let mut outcomes = Vec::with_capacity(2);

        if api_capable {
            if let Some(record) = self.lookup_api(url) {
                outcomes.push(SourceOutcome::Record(record));
            }
        }

        match self.fetcher.fetch_html(url) {
            Ok(html) => {
                if let Some(outcome) = scraping::verify_page(url, &html) {
                    outcomes.push(outcome);
                }
            }
            Err(err) => warn!("page fetch failed: {err:#}"),
        }

        reconcile(outcomes, api_capable, target_date)
    }

    fn lookup_api(&self, url: &str) -> Option<EventRecord> {
        match &self.api {
            Some(api) => api.lookup(&self.fetcher, url),
            None => {
                debug!(url, "skipping api source, no credential");
                None
            }
        }
    }
}

/// Merges the outcomes, which must be in source priority order (api first).
pub fn reconcile(
    outcomes: Vec<SourceOutcome>,
    api_capable: bool,
    target_date: Option<&str>,
) -> Verdict {
    let sources_count = outcomes.len();
    let mut outcomes = outcomes.into_iter();

    let primary = match outcomes.next() {
        Some(SourceOutcome::Record(record)) => record,
        Some(SourceOutcome::Missing { reason }) => {
            return Verdict::Unverified(Unverified::new(reason, sources_checked(api_capable)))
        }
        None => {
            return Verdict::Unverified(Unverified::new(
                NO_SOURCE_REASON,
                sources_checked(api_capable),
            ))
        }
    };
    let secondary = outcomes.next();

    let mut secondary_date = None;
    let (cross_verified, verification) = match &secondary {
        Some(other) => {
            let primary_day = dates::calendar_date(&primary.start);
            let other_day = other.start().and_then(dates::calendar_date);
            match (primary_day, other_day) {
                (Some(a), Some(b)) if a == b => (
                    Tristate::Yes,
                    format!(
                        "sources concur: {} and {} both report {}",
                        primary.source,
                        other.label(),
                        a
                    ),
                ),
                (Some(_), Some(b)) => {
                    secondary_date = Some(b.format("%Y-%m-%d").to_string());
                    (
                        Tristate::No,
                        format!(
                            "sources disagree: {} reports {}, {} reports {}",
                            primary.source,
                            primary.start,
                            other.label(),
                            other.start().unwrap_or_default()
                        ),
                    )
                }
                _ => (
                    Tristate::Unknown,
                    "only one source carried a usable date".to_string(),
                ),
            }
        }
        None => (
            Tristate::Unknown,
            format!("single source: {}", primary.source),
        ),
    };

    let date_matches_target =
        target_date.map(|target| dates::check_date_match(&primary.start, target));

    info!(
        source = %primary.source,
        sources_count,
        ?cross_verified,
        "event verified"
    );

    Verdict::Verified(VerificationResult {
        record: primary,
        cross_verified,
        verification,
        secondary_date,
        sources_count,
        target_date: target_date.map(str::to_string),
        date_matches_target,
    })
}

fn sources_checked(api_capable: bool) -> Vec<String> {
    let mut checked = Vec::with_capacity(2);
    if api_capable {
        checked.push(API_SLOT.to_string());
    }
    checked.push(PAGE_SLOT.to_string());
    checked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Source, UNKNOWN};
    use anyhow::anyhow;
    use serde_json::{json, Value};

    const JAZZ_HTML: &str = r#"
    <html><head>
        <title>Jazz Night</title>
        <script type="application/ld+json">
            {"@type": "Event", "name": "Jazz Night", "startDate": "2024-06-01T20:00"}
        </script>
    </head><body></body></html>
    "#;

    struct StubFetcher {
        html: Option<String>,
        json: Option<Value>,
    }

    impl Fetcher for StubFetcher {
        fn fetch_html(&self, _url: &str) -> anyhow::Result<String> {
            self.html.clone().ok_or_else(|| anyhow!("connection refused"))
        }

        fn fetch_json(&self, _url: &str, _token: &str) -> anyhow::Result<Value> {
            self.json.clone().ok_or_else(|| anyhow!("timed out"))
        }
    }

    fn config_with_key(key: Option<&str>) -> AppConfig {
        AppConfig {
            api_key: key.map(str::to_string),
            ..AppConfig::default()
        }
    }

    fn record(source: Source, start: &str) -> SourceOutcome {
        SourceOutcome::Record(EventRecord::new(
            source,
            "Jazz Night".to_string(),
            start.to_string(),
            "https://www.eventbrite.fr/e/jazz-1234567890",
        ))
    }

    fn verified(verdict: Verdict) -> VerificationResult {
        match verdict {
            Verdict::Verified(result) => result,
            Verdict::Unverified(other) => panic!("expected verified, got {other:?}"),
        }
    }

    fn unverified(verdict: Verdict) -> Unverified {
        match verdict {
            Verdict::Unverified(result) => result,
            Verdict::Verified(other) => panic!("expected unverified, got {other:?}"),
        }
    }

    #[test]
    fn matching_dates_cross_verify() {
        let result = verified(reconcile(
            vec![
                record(Source::Api, "2024-03-15T19:00:00"),
                record(Source::StructuredData, "2024-03-15T19:00:00+01:00"),
            ],
            true,
            None,
        ));
        assert_eq!(result.cross_verified, Tristate::Yes);
        assert!(result.verification.contains("concur"));
        assert_eq!(result.sources_count, 2);
        assert_eq!(result.record.source, Source::Api);
        assert!(result.secondary_date.is_none());
    }

    #[test]
    fn mismatched_dates_are_flagged() {
        let result = verified(reconcile(
            vec![
                record(Source::Api, "2024-03-15"),
                record(Source::StructuredData, "2024-03-16"),
            ],
            true,
            None,
        ));
        assert_eq!(result.cross_verified, Tristate::No);
        assert!(result.verification.contains("2024-03-15"));
        assert!(result.verification.contains("2024-03-16"));
        assert_eq!(result.secondary_date.as_deref(), Some("2024-03-16"));
    }

    #[test]
    fn unparseable_secondary_date_is_unknown() {
        let result = verified(reconcile(
            vec![
                record(Source::Api, "2024-03-15T19:00:00"),
                record(Source::PlatformHtmlFallback, "Friday March 15, 2024"),
            ],
            true,
            None,
        ));
        assert_eq!(result.cross_verified, Tristate::Unknown);
        assert!(result.verification.contains("only one source"));
    }

    #[test]
    fn zero_sources_is_unverified() {
        let result = unverified(reconcile(Vec::new(), false, None));
        assert!(!result.verified);
        assert_eq!(result.reason, NO_SOURCE_REASON);
        assert_eq!(result.sources_checked, vec!["page".to_string()]);

        let result = unverified(reconcile(Vec::new(), true, Some("2024-03-15")));
        assert_eq!(
            result.sources_checked,
            vec!["api".to_string(), "page".to_string()]
        );
    }

    #[test]
    fn target_date_is_checked_against_primary() {
        let result = verified(reconcile(
            vec![
                record(Source::Api, "2024-03-15T19:00:00"),
                record(Source::StructuredData, "2024-03-16"),
            ],
            true,
            Some("2024-03-15"),
        ));
        assert_eq!(result.target_date.as_deref(), Some("2024-03-15"));
        assert_eq!(result.date_matches_target, Some(Tristate::Yes));

        let result = verified(reconcile(
            vec![record(Source::StructuredData, UNKNOWN)],
            false,
            Some("2024-03-15"),
        ));
        assert_eq!(result.date_matches_target, Some(Tristate::Unknown));

        let result = verified(reconcile(
            vec![record(Source::StructuredData, "2024-03-15")],
            false,
            Some("15/03/2024"),
        ));
        assert_eq!(result.date_matches_target, Some(Tristate::Unknown));
    }

    #[test]
    fn missing_page_alongside_api_keeps_api_record() {
        let result = verified(reconcile(
            vec![
                record(Source::Api, "2024-03-15T19:00:00"),
                SourceOutcome::Missing {
                    reason: scraping::PAGE_NOT_FOUND_REASON.to_string(),
                },
            ],
            true,
            None,
        ));
        assert_eq!(result.record.source, Source::Api);
        assert_eq!(result.cross_verified, Tristate::Unknown);
        assert_eq!(result.sources_count, 2);
    }

    #[test]
    fn no_credential_and_dead_page_is_unverified() {
        let verifier = Verifier::new(
            StubFetcher {
                html: None,
                json: Some(json!({"id": "1234567890"})),
            },
            &config_with_key(None),
        );
        let result = unverified(
            verifier.verify("https://www.eventbrite.fr/e/jazz-1234567890", None),
        );
        assert_eq!(result.reason, NO_SOURCE_REASON);
        assert_eq!(
            result.sources_checked,
            vec!["api".to_string(), "page".to_string()]
        );
    }

    #[test]
    fn single_structured_data_source() {
        let verifier = Verifier::new(
            StubFetcher {
                html: Some(JAZZ_HTML.to_string()),
                json: None,
            },
            &config_with_key(Some("token")),
        );
        let result = verified(verifier.verify("https://example.com/jazz", Some("2024-06-01")));
        assert_eq!(result.record.source, Source::StructuredData);
        assert_eq!(result.record.name, "Jazz Night");
        assert!(result.record.verified);
        assert_eq!(result.cross_verified, Tristate::Unknown);
        assert_eq!(result.verification, "single source: structured-data");
        assert_eq!(result.sources_count, 1);
        assert_eq!(result.date_matches_target, Some(Tristate::Yes));
    }

    #[test]
    fn api_and_page_agree() {
        let verifier = Verifier::new(
            StubFetcher {
                html: Some(JAZZ_HTML.to_string()),
                json: Some(json!({
                    "id": "1234567890",
                    "name": {"text": "Jazz Night"},
                    "start": {"local": "2024-06-01T20:00:00", "timezone": "Europe/Paris"},
                    "status": "live"
                })),
            },
            &config_with_key(Some("token")),
        );
        let result = verified(verifier.verify("https://www.eventbrite.fr/e/jazz-1234567890", None));
        assert_eq!(result.record.source, Source::Api);
        assert_eq!(result.record.status.as_deref(), Some("live"));
        assert_eq!(result.cross_verified, Tristate::Yes);
        assert_eq!(result.sources_count, 2);
    }

    #[test]
    fn early_404_page_is_unverified() {
        let verifier = Verifier::new(
            StubFetcher {
                html: Some("<html><head><title>404</title></head><body>gone</body></html>".to_string()),
                json: None,
            },
            &config_with_key(None),
        );
        let result = unverified(verifier.verify("https://example.com/gone", None));
        assert!(result.reason.contains("deleted or nonexistent"));
        assert_eq!(result.sources_checked, vec!["page".to_string()]);
    }

    #[test]
    fn non_eventbrite_url_never_calls_api() {
        let verifier = Verifier::new(
            StubFetcher {
                html: None,
                json: Some(json!({"id": "1"})),
            },
            &config_with_key(Some("token")),
        );
        let result = unverified(verifier.verify("https://example.com/e/1", None));
        assert_eq!(result.sources_checked, vec!["page".to_string()]);
    }
}
