use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_MS: u64 = 3_000;

pub const ENV_BASE_URL: &str = "PODIUM_API_URL";
pub const ENV_POLL_MS: &str = "PODIUM_POLL_INTERVAL_MS";

/// Backend location and poll cadence. Injected into every network-facing component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// No trailing slash.
    pub base_url: String,
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Defaults overridden by `PODIUM_API_URL` / `PODIUM_POLL_INTERVAL_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(ms) = lookup(ENV_POLL_MS) {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of milliseconds, got {:?}", ENV_POLL_MS, ms))?;
            anyhow::ensure!(ms > 0, "{} must be positive", ENV_POLL_MS);
            config.poll_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed).with_context(|| format!("Invalid backend URL {:?}", raw))?;
    Ok(trimmed.to_string())
}
