//! Environment-backed settings.
//!
//! Values come from the process environment, with a `.env` file in the working
//! directory loaded first. CLI flags override them (see `app`).

use std::time::Duration;

use crate::error::AppError;

pub const ENV_NVD_API_KEY: &str = "NVD_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "THREAT_DIGEST_TIMEOUT_SECS";
pub const ENV_C2_URL_TEMPLATE: &str = "THREAT_DIGEST_C2_URL_TEMPLATE";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub nvd_api_key: Option<String>,
    pub timeout: Duration,
    pub c2_url_template: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nvd_api_key: None,
            timeout: DEFAULT_TIMEOUT,
            c2_url_template: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_timeout_secs(&raw)
                .map_err(|e| AppError::usage(format!("Invalid {ENV_TIMEOUT_SECS}: {e}")))?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            nvd_api_key: get(ENV_NVD_API_KEY),
            timeout,
            c2_url_template: get(ENV_C2_URL_TEMPLATE),
        })
    }
}

/// Parse a positive whole number of seconds.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a whole number of seconds"))?;
    if secs == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn reads_all_keys() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_NVD_API_KEY, "abc123"),
            (ENV_TIMEOUT_SECS, " 10 "),
            (ENV_C2_URL_TEMPLATE, "https://c2.test/{month}/Feed-{date}.txt"),
        ]))
        .unwrap();
        assert_eq!(settings.nvd_api_key.as_deref(), Some("abc123"));
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(settings.c2_url_template.is_some());
    }

    #[test]
    fn blank_values_are_unset() {
        let settings = Settings::from_lookup(lookup(&[(ENV_NVD_API_KEY, "   ")])).unwrap();
        assert_eq!(settings.nvd_api_key, None);
    }

    #[test]
    fn bad_timeout_is_a_usage_error() {
        let err = Settings::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
        assert!(parse_timeout_secs("0").is_err());
    }
}
