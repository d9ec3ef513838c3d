use std::{fs, path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::utils;

pub const DEFAULT_API_BASE: &str = "https://www.eventbriteapi.com/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

const API_KEY_PATH_VAR: &str = "EVENTBRITE_API_KEY_PATH";
const API_BASE_VAR: &str = "EVENTBRITE_API_BASE";
const TIMEOUT_VAR: &str = "VERIFY_EVENT_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_key_path: PathBuf,
    pub api_base_url: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key_path: utils::default_api_key_path(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Reads the environment and the credential file once. Nothing here fails:
    /// a missing or unreadable credential only disables the API source.
    pub fn from_env() -> Self {
        let api_key_path = std::env::var_os(API_KEY_PATH_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(utils::default_api_key_path);
        let api_base_url = std::env::var(API_BASE_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = std::env::var(TIMEOUT_VAR)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut config = Self {
            api_key_path,
            api_base_url,
            timeout_secs,
            api_key: None,
        };
        config.load_api_key();
        config
    }

    pub fn load_api_key(&mut self) {
        self.api_key = match read_api_key(&self.api_key_path) {
            Ok(key) => key,
            Err(err) => {
                warn!(path = %self.api_key_path.display(), "failed to read api key: {err}");
                None
            }
        };
        if self.api_key.is_none() {
            debug!(path = %self.api_key_path.display(), "no api key, api source disabled");
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn read_api_key(path: &Path) -> Result<Option<String>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}
