use std::time::Duration;

use thiserror::Error;
use xroute_core::{ExecutorConfig, TrackOptions, DEFAULT_GAS_MULTIPLIER};

pub const DEFAULT_API_URL: &str = "https://api.skip.money/v1";
/// Sent with every routing service call unless `XROUTE_CLIENT_ID` names another.
pub const DEFAULT_CLIENT_ID: &str = "xroute";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct XrouteConfig {
    pub api_url: String,
    pub client_id: String,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub track_timeout_ms: Option<u64>,
    pub gas_multiplier: f64,
    pub registry_path: Option<String>,
}

impl Default for XrouteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            request_timeout_ms: 15_000,
            poll_interval_ms: 1_000,
            track_timeout_ms: None,
            gas_multiplier: DEFAULT_GAS_MULTIPLIER,
            registry_path: None,
        }
    }
}

impl XrouteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable source; unset or blank
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(url) = get("XROUTE_API_URL") {
            cfg.api_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(client_id) = get("XROUTE_CLIENT_ID") {
            cfg.client_id = client_id.trim().to_owned();
        }
        if let Some(raw) = get("XROUTE_REQUEST_TIMEOUT_MS") {
            cfg.request_timeout_ms = parse("XROUTE_REQUEST_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = get("XROUTE_POLL_INTERVAL_MS") {
            cfg.poll_interval_ms = parse("XROUTE_POLL_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = get("XROUTE_TRACK_TIMEOUT_MS") {
            cfg.track_timeout_ms = Some(parse("XROUTE_TRACK_TIMEOUT_MS", &raw)?);
        }
        if let Some(raw) = get("XROUTE_GAS_MULTIPLIER") {
            let multiplier: f64 = parse("XROUTE_GAS_MULTIPLIER", &raw)?;
            if !multiplier.is_finite() || multiplier < 1.0 {
                return Err(ConfigError::Invalid {
                    var: "XROUTE_GAS_MULTIPLIER",
                    value: raw,
                    reason: "must be a finite number >= 1.0".to_owned(),
                });
            }
            cfg.gas_multiplier = multiplier;
        }
        cfg.registry_path = get("XROUTE_REGISTRY_PATH");
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn track_options(&self) -> TrackOptions {
        TrackOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_duration: self.track_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            gas_multiplier: self.gas_multiplier,
            ..ExecutorConfig::default()
        }
    }
}

fn parse<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_owned(),
        reason: e.to_string(),
    })
}
