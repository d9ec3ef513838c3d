use dirs::config_dir;
use once_cell::sync::Lazy;
use std::path::PathBuf;

static CONFIG_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
});

pub fn config_root() -> PathBuf {
    CONFIG_ROOT.clone()
}

pub fn default_api_key_path() -> PathBuf {
    config_root().join("eventbrite").join("api_key")
}

/// Lowercased host of `url`, or `None` when it does not parse as an absolute URL.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url.trim()).ok()?;
    parsed.host_str().map(|host| host.to_ascii_lowercase())
}
