//! Provider configuration loaded from the environment.

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_APP_TITLE: &str = "CyberAI-Ultimate";
pub const DEFAULT_REFERER: &str = "https://cyberai.rf.gd";

const API_KEY_VARS: [&str; 2] = ["CYBERAI_API_KEY", "OPENROUTER_API_KEY"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable '{0}'")]
    Missing(String),
    #[error("environment variable '{0}' is empty")]
    Empty(String),
    #[error("environment variable '{var}' is not a valid URL: {reason}")]
    InvalidUrl { var: String, reason: String },
    #[error("environment variable '{var}' must be a positive integer, got '{value}'")]
    InvalidNumber { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub app_title: Option<String>,
    pub referer: Option<String>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            app_title: Some(DEFAULT_APP_TITLE.to_string()),
            referer: Some(DEFAULT_REFERER.to_string()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (key_var, api_key) = API_KEY_VARS
            .iter()
            .find_map(|var| lookup(var).map(|value| (*var, value)))
            .ok_or_else(|| ConfigError::Missing(API_KEY_VARS[0].to_string()))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::Empty(key_var.to_string()));
        }

        let base_url = lookup("CYBERAI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Url::parse(&base_url).map_err(|err| ConfigError::InvalidUrl {
            var: "CYBERAI_API_BASE".to_string(),
            reason: err.to_string(),
        })?;

        let timeout_secs = match lookup("CYBERAI_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "CYBERAI_TIMEOUT_SECS".to_string(),
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            app_title: Some(
                lookup("CYBERAI_APP_TITLE").unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
            ),
            referer: Some(lookup("CYBERAI_REFERER").unwrap_or_else(|| DEFAULT_REFERER.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = ProviderConfig::from_lookup(lookup_from(&[("CYBERAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.app_title.as_deref(), Some(DEFAULT_APP_TITLE));
        assert_eq!(config.referer.as_deref(), Some(DEFAULT_REFERER));
    }

    #[test]
    fn openrouter_key_is_accepted() {
        let config =
            ProviderConfig::from_lookup(lookup_from(&[("OPENROUTER_API_KEY", "sk-or")])).unwrap();
        assert_eq!(config.api_key, "sk-or");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = ProviderConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("CYBERAI_API_KEY".to_string()));
    }

    #[test]
    fn blank_key_is_an_error() {
        let err = ProviderConfig::from_lookup(lookup_from(&[("CYBERAI_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty("CYBERAI_API_KEY".to_string()));
    }

    #[test]
    fn rejects_bad_url_and_timeout() {
        let err = ProviderConfig::from_lookup(lookup_from(&[
            ("CYBERAI_API_KEY", "k"),
            ("CYBERAI_API_BASE", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let err = ProviderConfig::from_lookup(lookup_from(&[
            ("CYBERAI_API_KEY", "k"),
            ("CYBERAI_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CYBERAI_TIMEOUT_SECS"));
    }

    #[test]
    fn from_env_reads_process_environment() {
        let _guard = env_lock().lock().unwrap();
        std::env::set_var("CYBERAI_API_KEY", "env-key");
        std::env::set_var("CYBERAI_TIMEOUT_SECS", "30");

        let config = ProviderConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.timeout, Duration::from_secs(30));

        std::env::remove_var("CYBERAI_API_KEY");
        std::env::remove_var("CYBERAI_TIMEOUT_SECS");
    }
}
