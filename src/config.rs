//! Startup configuration read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CACHE_TTL_MS` | `60000` | result cache time-to-live |
//! | `CATALOG_BIND_ADDR` | `127.0.0.1:3000` | HTTP listen address |
//! | `CATALOG_ROWS_PATH` | unset | JSON rows for the in-memory store |
//! | `APP_ENV` | unset | `production` hides error stacks |
//! | `CACHE_SWEEP_INTERVAL_MS` | unset | periodic purge of expired entries |

use crate::error::{Error, Result};
use crate::store::DEFAULT_TTL;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_CACHE_TTL_MS: &str = "CACHE_TTL_MS";
pub const ENV_BIND_ADDR: &str = "CATALOG_BIND_ADDR";
pub const ENV_ROWS_PATH: &str = "CATALOG_ROWS_PATH";
pub const ENV_APP_ENV: &str = "APP_ENV";
pub const ENV_SWEEP_INTERVAL_MS: &str = "CACHE_SWEEP_INTERVAL_MS";

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Process-wide settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub cache_ttl: Duration,
    pub bind_addr: String,
    pub rows_path: Option<PathBuf>,
    /// Production mode: 500 bodies carry no `stack`.
    pub production: bool,
    pub sweep_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_ttl: DEFAULT_TTL,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            rows_path: None,
            production: false,
            sweep_interval: None,
        }
    }
}

impl Config {
    /// Read the process environment.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if a numeric variable is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    ///
    /// # Errors
    /// Returns `Error::ConfigError` if a numeric variable is not a positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let config = Config {
            cache_ttl: match var(ENV_CACHE_TTL_MS) {
                Some(raw) => parse_millis(ENV_CACHE_TTL_MS, &raw)?,
                None => defaults.cache_ttl,
            },
            bind_addr: var(ENV_BIND_ADDR)
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.bind_addr),
            rows_path: var(ENV_ROWS_PATH).map(PathBuf::from),
            production: var(ENV_APP_ENV)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("production")),
            sweep_interval: var(ENV_SWEEP_INTERVAL_MS)
                .map(|raw| parse_millis(ENV_SWEEP_INTERVAL_MS, &raw))
                .transpose()?,
        };

        debug!("Loaded {:?}", config);
        Ok(config)
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(Error::ConfigError(format!("{} must be positive", name))),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(e) => Err(Error::ConfigError(format!(
            "{}={:?} is not a number of milliseconds: {}",
            name, raw, e
        ))),
    }
}
