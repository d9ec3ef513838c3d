use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::AppConfig;

pub const PAGE_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";
pub const API_USER_AGENT: &str = "Mozilla/5.0";

/// Network seam for the source adapters.
pub trait Fetcher {
    fn fetch_html(&self, url: &str) -> Result<String>;
    fn fetch_json(&self, url: &str, token: &str) -> Result<Value>;
}

pub struct HttpFetcher {
    page_client: Client,
    api_client: Client,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let page_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(PAGE_USER_AGENT)
            .build()
            .context("failed to build page client")?;
        let api_client = Client::builder()
            .timeout(config.timeout())
            .user_agent(API_USER_AGENT)
            .build()
            .context("failed to build api client")?;
        Ok(Self {
            page_client,
            api_client,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .page_client
            .get(url)
            .send()
            .with_context(|| format!("request failed for {url}"))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("non-success status for {url}"))?;
        let bytes = response
            .bytes()
            .with_context(|| format!("unable to read response body for {url}"))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn fetch_json(&self, url: &str, token: &str) -> Result<Value> {
        let response = self
            .api_client
            .get(url)
            .bearer_auth(token)
            .send()
            .with_context(|| format!("request failed for {url}"))?;
        let response = response
            .error_for_status()
            .with_context(|| format!("non-success status for {url}"))?;
        response
            .json::<Value>()
            .with_context(|| format!("unable to decode json from {url}"))
    }
}
