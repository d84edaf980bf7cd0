use anyhow::{Context, Result};

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
///
/// Only numeric values are validated at startup. A missing `GEMINI_API_KEY`
/// is not fatal: the service starts degraded and every analysis fails upstream.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub completion_timeout_secs: u64,
    pub completion_max_retries: u32,
    pub max_body_bytes: usize,
    pub max_document_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            completion_timeout_secs: parse_or(get("COMPLETION_TIMEOUT_SECS"), 120)
                .context("COMPLETION_TIMEOUT_SECS must be a whole number of seconds")?,
            completion_max_retries: parse_or(get("COMPLETION_MAX_RETRIES"), 0)
                .context("COMPLETION_MAX_RETRIES must be a non-negative integer")?,
            max_body_bytes: parse_or(get("MAX_BODY_BYTES"), 50 * 1024 * 1024)
                .context("MAX_BODY_BYTES must be a byte count")?,
            max_document_bytes: parse_or(get("MAX_DOCUMENT_BYTES"), 10 * 1024 * 1024)
                .context("MAX_DOCUMENT_BYTES must be a byte count")?,
            port: parse_or(get("PORT"), 3001).context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.port, 3001);
        assert_eq!(config.completion_max_retries, 0);
        assert_eq!(config.max_body_bytes, 52_428_800);
        assert_eq!(config.max_document_bytes, 10_485_760);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "   ")]).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("PORT", "8080"),
            ("COMPLETION_MAX_RETRIES", "2"),
        ])
        .unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.port, 8080);
        assert_eq!(config.completion_max_retries, 2);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
