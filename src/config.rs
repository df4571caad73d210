use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::engine::RetryPolicy;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub listen_addr: SocketAddr,
    pub conflict_max_retries: usize,
    pub conflict_retry_delay: Duration,
    pub log_filter: String,
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to honour a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            database_max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            listen_addr: parsed(&lookup, "LISTEN_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            conflict_max_retries: parsed(&lookup, "CONFLICT_MAX_RETRIES", 5)?,
            conflict_retry_delay: Duration::from_millis(parsed(
                &lookup,
                "CONFLICT_RETRY_DELAY_MS",
                10,
            )?),
            log_filter: lookup("LOG_FILTER").unwrap_or_else(|| "info".into()),
        })
    }

    /// The backoff ceiling never drops below the configured first delay.
    pub fn retry_policy(&self) -> RetryPolicy {
        let max_delay = RetryPolicy::default()
            .max_delay
            .max(self.conflict_retry_delay);

        RetryPolicy::builder()
            .max_retries(self.conflict_max_retries)
            .initial_delay(self.conflict_retry_delay)
            .max_delay(max_delay)
            .build()
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars: HashMap<&'static str, String> = vars
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();

        move |name: &'static str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgresql://localhost/seatline")]))
                .unwrap();

        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.listen_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.conflict_max_retries, 5);
        assert_eq!(config.conflict_retry_delay, Duration::from_millis(10));
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.retry_policy().max_retries, 5);
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();

        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/seatline"),
            ("CONFLICT_MAX_RETRIES", "many"),
        ]))
        .unwrap_err();

        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "CONFLICT_MAX_RETRIES",
                value: "many".into()
            }
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/seatline"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("LISTEN_ADDR", "0.0.0.0:8080"),
            ("CONFLICT_RETRY_DELAY_MS", "25"),
        ]))
        .unwrap();

        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.listen_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.conflict_retry_delay, Duration::from_millis(25));
    }

    #[test]
    fn long_retry_delay_is_not_clamped() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/seatline"),
            ("CONFLICT_RETRY_DELAY_MS", "500"),
        ]))
        .unwrap();

        let policy = config.retry_policy();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_millis(500));
    }

    #[test]
    fn short_retry_delay_keeps_default_ceiling() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/seatline"),
            ("CONFLICT_RETRY_DELAY_MS", "25"),
        ]))
        .unwrap();

        let policy = config.retry_policy();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(25));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_millis(200));
    }
}
