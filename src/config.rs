use std::time::Duration;

use crate::errors::AppError;

const DEFAULT_BASE_URL: &str = "http://dataservice.accuweather.com";
const DEFAULT_LANGUAGE: &str = "en-us";
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PORT: u16 = 8080;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    /// Language code passed to the location search.
    pub language: String,
    /// Upper bound for every single external call.
    pub request_timeout: Duration,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process environment
    /// in production, a map in tests).
    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ACCUWEATHER_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Config("ACCUWEATHER_API_KEY must be set".to_string()))?;

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "REQUEST_TIMEOUT_SECS must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {}", e)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            base_url: lookup("ACCUWEATHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            language: lookup("ACCUWEATHER_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            port,
        })
    }
}
