use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_STORAGE_KEY: &str = "tasks";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Key under which the whole collection is stored.
    pub storage_key: String,
    /// SQLite URL. `None` keeps the collection in memory.
    pub database_url: Option<String>,
    pub reminder_interval: Duration,
    /// Delay between delete phase 1 and phase 2.
    pub removal_delay: Duration,
    pub seed_on_empty: bool,
    pub upcoming_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            database_url: None,
            reminder_interval: Duration::from_secs(60),
            removal_delay: Duration::from_millis(300),
            seed_on_empty: true,
            upcoming_limit: 3,
        }
    }
}

impl TrackerConfig {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            storage_key: lookup("TASKFLOW_STORAGE_KEY")
                .filter(|key| !key.trim().is_empty())
                .unwrap_or(defaults.storage_key),
            database_url: lookup("DATABASE_URL").or(defaults.database_url),
            reminder_interval: parse_positive(&lookup, "TASKFLOW_REMINDER_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.reminder_interval),
            removal_delay: parse(&lookup, "TASKFLOW_REMOVAL_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.removal_delay),
            seed_on_empty: parse(&lookup, "TASKFLOW_SEED")?.unwrap_or(defaults.seed_on_empty),
            upcoming_limit: parse(&lookup, "TASKFLOW_UPCOMING_LIMIT")?
                .unwrap_or(defaults.upcoming_limit),
        })
    }
}

fn parse<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            }),
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse::<F, u64>(lookup, key)? {
        Some(0) => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: lookup(key).unwrap_or_default(),
        }),
        value => Ok(value),
    }
}
