use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub rate_lookup_url: String,
    pub rate_lookup_timeout: Duration,
    pub rate_lookup_max_elapsed: Duration,
    pub rate_tiers_csv: Option<String>,
    /// Pins the year that decides the 365/366 day count; `None` uses the current year.
    pub year_basis_override: Option<i32>,
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
        let rate_lookup_url = required(&env_map, "RATE_LOOKUP_URL")?;
        if !rate_lookup_url.starts_with("http://") && !rate_lookup_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "RATE_LOOKUP_URL".to_string(),
                format!("must be an http(s) URL, got {}", rate_lookup_url),
            ));
        }

        let rate_lookup_timeout = millis(&env_map, "RATE_LOOKUP_TIMEOUT_MS", 10_000)?;
        let rate_lookup_max_elapsed = millis(&env_map, "RATE_LOOKUP_MAX_ELAPSED_MS", 30_000)?;

        let rate_tiers_csv = env_map
            .get("RATE_TIERS_CSV")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let year_basis_override = match env_map.get("YEAR_BASIS_OVERRIDE") {
            Some(s) => Some(s.trim().parse::<i32>().map_err(|_| {
                ConfigError::InvalidValue(
                    "YEAR_BASIS_OVERRIDE".to_string(),
                    "must be a calendar year".to_string(),
                )
            })?),
            None => None,
        };

        Ok(Config {
            port,
            database_path,
            rate_lookup_url,
            rate_lookup_timeout,
            rate_lookup_max_elapsed,
            rate_tiers_csv,
            year_basis_override,
        })
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn millis(
    env_map: &HashMap<String, String>,
    key: &str,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    match env_map.get(key) {
        None => Ok(Duration::from_millis(default_ms)),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                "must be a positive number of milliseconds".to_string(),
            )),
        },
    }
}
