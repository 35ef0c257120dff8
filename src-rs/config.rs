use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::github::API_BASE;

pub const DEFAULT_TOKEN_FILE: &str = "./auth.secret";
pub const DEFAULT_ERROR_LOG: &str = "./collector_errors.log";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
/// Request deadline while collecting, unless one is configured.
pub const DEFAULT_COLLECT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ChroniclerConfig {
    pub token_file: PathBuf,
    pub api_base: String,
    pub error_log: PathBuf,
    pub interval: Duration,
    pub max_failures: Option<u32>,
    pub max_samples: Option<u64>,
    pub keep_samples: Option<usize>,
    pub timeout: Option<Duration>,
}

impl Default for ChroniclerConfig {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            api_base: API_BASE.to_string(),
            error_log: PathBuf::from(DEFAULT_ERROR_LOG),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            max_failures: None,
            max_samples: None,
            keep_samples: None,
            timeout: None,
        }
    }
}

impl ChroniclerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset, blank or
    /// unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            token_file: get("CHRONICLER_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),
            api_base: get("CHRONICLER_API_BASE").unwrap_or(defaults.api_base),
            error_log: get("CHRONICLER_ERROR_LOG")
                .map(PathBuf::from)
                .unwrap_or(defaults.error_log),
            interval: parsed::<u64>(get("CHRONICLER_INTERVAL_SECS"))
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            max_failures: parsed(get("CHRONICLER_MAX_FAILURES")).or(defaults.max_failures),
            max_samples: parsed(get("CHRONICLER_MAX_SAMPLES")).or(defaults.max_samples),
            keep_samples: parsed(get("CHRONICLER_KEEP")).or(defaults.keep_samples),
            timeout: parsed::<u64>(get("CHRONICLER_TIMEOUT_SECS"))
                .map(Duration::from_secs)
                .or(defaults.timeout),
        }
    }

    /// A collector must never block on one request forever.
    pub fn collector_timeout(&self) -> Duration {
        self.timeout
            .unwrap_or(Duration::from_secs(DEFAULT_COLLECT_TIMEOUT_SECS))
    }
}

fn parsed<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|value| value.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = ChroniclerConfig::from_lookup(|_| None);
        assert_eq!(cfg.token_file, PathBuf::from("./auth.secret"));
        assert_eq!(cfg.error_log, PathBuf::from("./collector_errors.log"));
        assert_eq!(cfg.api_base, "https://api.github.com/repos");
        assert_eq!(cfg.interval, Duration::from_secs(60));
        assert!(cfg.max_failures.is_none());
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn env_overrides_defaults() {
        let cfg = ChroniclerConfig::from_lookup(lookup_from(&[
            ("CHRONICLER_TOKEN_FILE", "/etc/chronicler/token"),
            ("CHRONICLER_INTERVAL_SECS", "5"),
            ("CHRONICLER_MAX_FAILURES", "3"),
            ("CHRONICLER_KEEP", "100"),
            ("CHRONICLER_TIMEOUT_SECS", "10"),
        ]));
        assert_eq!(cfg.token_file, PathBuf::from("/etc/chronicler/token"));
        assert_eq!(cfg.interval, Duration::from_secs(5));
        assert_eq!(cfg.max_failures, Some(3));
        assert_eq!(cfg.keep_samples, Some(100));
        assert_eq!(cfg.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn collector_always_has_a_deadline() {
        let cfg = ChroniclerConfig::default();
        assert!(cfg.timeout.is_none());
        assert_eq!(cfg.collector_timeout(), Duration::from_secs(30));

        let cfg = ChroniclerConfig {
            timeout: Some(Duration::from_secs(5)),
            ..ChroniclerConfig::default()
        };
        assert_eq!(cfg.collector_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn garbage_values_fall_back() {
        let cfg = ChroniclerConfig::from_lookup(lookup_from(&[
            ("CHRONICLER_INTERVAL_SECS", "soon"),
            ("CHRONICLER_MAX_SAMPLES", "-4"),
            ("CHRONICLER_API_BASE", "   "),
        ]));
        assert_eq!(cfg.interval, Duration::from_secs(60));
        assert!(cfg.max_samples.is_none());
        assert_eq!(cfg.api_base, "https://api.github.com/repos");
    }
}
