use crate::modules::reviews::use_cases::resync_pending_reviews::worker::DEFAULT_RESYNC_INTERVAL;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const API_BASE_URL_VAR: &str = "REVIEWS_API_BASE_URL";
pub const STORE_DIR_VAR: &str = "REVIEWS_STORE_DIR";
pub const RESYNC_INTERVAL_VAR: &str = "REVIEWS_RESYNC_INTERVAL_SECS";
pub const HTTP_TIMEOUT_VAR: &str = "REVIEWS_HTTP_TIMEOUT_SECS";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_STORE_DIR: &str = ".reviews";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub store_dir: PathBuf,
    pub resync_interval: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url: String = try_load(&lookup, API_BASE_URL_VAR, DEFAULT_API_BASE_URL)?;
        if api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: API_BASE_URL_VAR,
                value: api_base_url,
                reason: "must not be empty".into(),
            });
        }
        Ok(Self {
            api_base_url,
            store_dir: try_load(&lookup, STORE_DIR_VAR, DEFAULT_STORE_DIR)?,
            resync_interval: load_secs(
                &lookup,
                RESYNC_INTERVAL_VAR,
                DEFAULT_RESYNC_INTERVAL.as_secs(),
            )?,
            http_timeout: load_secs(&lookup, HTTP_TIMEOUT_VAR, DEFAULT_HTTP_TIMEOUT_SECS)?,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value: raw,
    })
}

fn load_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = try_load(lookup, key, &default.to_string())?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}
