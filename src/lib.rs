pub mod config;
pub mod dates;
pub mod eventbrite;
pub mod http;
pub mod models;
pub mod report;
pub mod scraping;
mod utils;
pub mod verify;

use anyhow::Result;

pub use config::AppConfig;
pub use http::{Fetcher, HttpFetcher};
pub use models::{EventRecord, Source, Tristate, Unverified, Verdict, VerificationResult};
pub use verify::{reconcile, Verifier};

/// One-shot verification using the environment's configuration and real HTTP clients.
pub fn verify_event(url: &str, target_date: Option<&str>) -> Result<Verdict> {
    let config = AppConfig::from_env();
    let fetcher = HttpFetcher::new(&config)?;
    Ok(Verifier::new(fetcher, &config).verify(url, target_date))
}
