use std::fmt::Write as _;

use crate::models::{is_known, Tristate, Verdict, VerificationResult, UNKNOWN};

pub const JSON_MARKER: &str = "---JSON---";

/// Human summary followed by the JSON block.
pub fn render(verdict: &Verdict) -> String {
    let mut out = render_summary(verdict);
    out.push('\n');
    out.push_str(JSON_MARKER);
    out.push('\n');
    match serde_json::to_string_pretty(verdict) {
        Ok(json) => out.push_str(&json),
        Err(err) => {
            let _ = write!(out, "{{\"error\": \"{err}\"}}");
        }
    }
    out.push('\n');
    out
}

pub fn render_summary(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Verified(result) => render_verified(result),
        Verdict::Unverified(result) => format!("NOT VERIFIED\n   Reason: {}\n", result.reason),
    }
}

fn render_verified(result: &VerificationResult) -> String {
    let record = &result.record;
    let mut out = String::new();

    let banner = match result.cross_verified {
        Tristate::Yes => format!(
            "VERIFIED TWICE ({} concurring sources)",
            result.sources_count
        ),
        Tristate::No => "VERIFIED, BUT SOURCES DISAGREE".to_string(),
        Tristate::Unknown => format!("VERIFIED (source: {})", record.source),
    };
    let _ = writeln!(out, "{banner}");
    let _ = writeln!(out, "   Name: {}", record.name);
    let _ = writeln!(out, "   Date: {}", record.start);
    optional_line(&mut out, "End", record.end_date.as_deref());
    optional_line(&mut out, "TZ", record.timezone.as_deref());
    let _ = writeln!(
        out,
        "   Location: {}",
        record.location.as_deref().unwrap_or(UNKNOWN)
    );
    optional_line(&mut out, "Address", record.address.as_deref());
    optional_line(&mut out, "Status", record.status.as_deref());
    let _ = writeln!(out, "   Verification: {}", result.verification);
    let _ = writeln!(out, "   URL: {}", record.url);

    if let Some(target) = &result.target_date {
        let line = match result.date_matches_target {
            Some(Tristate::Yes) => format!("Date matches {target}"),
            Some(Tristate::No) => format!("DATE DOES NOT MATCH {target}"),
            _ => "Unable to check the target date".to_string(),
        };
        let _ = writeln!(out, "   {line}");
    }
    out
}

fn optional_line(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| is_known(v)) {
        let _ = writeln!(out, "   {label}: {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRecord, Source, Unverified};

    fn sample(cross: Tristate) -> Verdict {
        let mut record = EventRecord::new(
            Source::Api,
            "Jazz Night".to_string(),
            "2024-06-01T20:00:00".to_string(),
            "https://www.eventbrite.fr/e/jazz-1234567890",
        );
        record.end_date = Some(UNKNOWN.to_string());
        record.timezone = Some("Europe/Paris".to_string());
        record.location = Some("Le Caveau".to_string());
        Verdict::Verified(VerificationResult {
            record,
            cross_verified: cross,
            verification: "sources concur".to_string(),
            secondary_date: None,
            sources_count: 2,
            target_date: Some("2024-06-02".to_string()),
            date_matches_target: Some(Tristate::No),
        })
    }

    #[test]
    fn summary_skips_unknown_optional_lines() {
        let text = render_summary(&sample(Tristate::Yes));
        assert!(text.starts_with("VERIFIED TWICE (2 concurring sources)"));
        assert!(text.contains("   TZ: Europe/Paris\n"));
        assert!(!text.contains("End:"));
        assert!(!text.contains("Address:"));
        assert!(text.contains("   Location: Le Caveau\n"));
        assert!(text.contains("DATE DOES NOT MATCH 2024-06-02"));
    }

    #[test]
    fn banner_reflects_disagreement() {
        let text = render_summary(&sample(Tristate::No));
        assert!(text.starts_with("VERIFIED, BUT SOURCES DISAGREE"));
    }

    #[test]
    fn json_block_follows_summary() {
        let verdict = Verdict::Unverified(Unverified::new(
            "no source could verify this event",
            vec!["page".to_string()],
        ));
        let text = render(&verdict);
        let (summary, json) = text.split_once(JSON_MARKER).expect("marker");
        assert!(summary.contains("NOT VERIFIED"));
        let parsed: serde_json::Value = serde_json::from_str(json.trim()).expect("valid json");
        assert_eq!(parsed["verified"], false);
        assert_eq!(parsed["sources_checked"][0], "page");
    }
}
