use crate::domain::Decimal;
use crate::engine::fragments::DEFAULT_MIN_CLAIMABLE_USD;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub subgraph_url: String,
    pub subgraph_timeout: Duration,
    pub subgraph_max_elapsed: Duration,
    pub min_claimable_usd: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = required(&env_map, "DATABASE_PATH")?;
        let subgraph_url = required(&env_map, "SUBGRAPH_URL")?;

        let subgraph_timeout = parse_millis(&env_map, "SUBGRAPH_TIMEOUT_MS", 10_000)?;
        let subgraph_max_elapsed = parse_millis(&env_map, "SUBGRAPH_MAX_ELAPSED_MS", 30_000)?;

        let min_claimable_usd = match env_map.get("MIN_CLAIMABLE_USD") {
            Some(raw) => Decimal::from_str_canonical(raw)
                .ok()
                .filter(|d| *d >= Decimal::zero())
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "MIN_CLAIMABLE_USD".to_string(),
                        format!("must be a non-negative decimal, got {}", raw),
                    )
                })?,
            None => Decimal::from_i64(DEFAULT_MIN_CLAIMABLE_USD),
        };

        Ok(Config {
            port,
            database_path,
            subgraph_url,
            subgraph_timeout,
            subgraph_max_elapsed,
            min_claimable_usd,
        })
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_millis(
    env_map: &HashMap<String, String>,
    key: &str,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .ok_or_else(|| {
                ConfigError::InvalidValue(key.to_string(), "must be a positive integer".to_string())
            }),
        None => Ok(Duration::from_millis(default_ms)),
    }
}
