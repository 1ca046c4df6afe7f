//! # Configuration
//!
//! [`OrreryConfig`] gathers the knobs of the fetch pipeline. It is built in code with
//! [`Default`] or loaded from a TOML document where every key is optional:
//!
//! ```toml
//! horizons_url = "https://ssd.jpl.nasa.gov/horizons_batch.cgi"
//! http_timeout_secs = 30
//! trial_count_limit = 4
//! trial_backoff_secs = 0.5
//! job_stagger_secs = 0.4
//! fetch_strategy = "exponential_backoff"   # or "sequential"
//! fetch_mode = "mixed"                     # local_only | prefer_local | online_only | mixed
//! ```
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::horizons::fetch::{FetchStrategy, RetryPolicy};
use crate::orrery_errors::OrreryError;

pub const DEFAULT_HORIZONS_URL: &str = "https://ssd.jpl.nasa.gov/horizons_batch.cgi";

/// Where the façade looks for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Cache only, never reach the network
    LocalOnly,
    /// Cache when it has something, network otherwise
    PreferLocal,
    /// Network only, the cache is still fed with the results
    OnlineOnly,
    /// Cache snapshot first, then the network merged with it
    #[default]
    Mixed,
}

impl FetchMode {
    pub fn reads_cache(&self) -> bool {
        !matches!(self, FetchMode::OnlineOnly)
    }

    pub fn reaches_network(&self) -> bool {
        !matches!(self, FetchMode::LocalOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    pub horizons_url: String,
    pub http_timeout_secs: u64,
    pub trial_count_limit: u32,
    pub trial_backoff_secs: f64,
    pub job_stagger_secs: f64,
    pub fetch_strategy: FetchStrategy,
    pub fetch_mode: FetchMode,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        OrreryConfig {
            horizons_url: DEFAULT_HORIZONS_URL.to_string(),
            http_timeout_secs: 30,
            trial_count_limit: 4,
            trial_backoff_secs: 0.5,
            job_stagger_secs: 0.4,
            fetch_strategy: FetchStrategy::default(),
            fetch_mode: FetchMode::default(),
        }
    }
}

impl OrreryConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, OrreryError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML configuration file
    ///
    /// Arguments
    /// ---------
    /// * `path`: the file to read
    ///
    /// Return
    /// ------
    /// * the configuration, missing keys set to their default
    /// * [`OrreryError::IoError`] or [`OrreryError::ConfigError`] on failure
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OrreryError> {
        let content = std::fs::read_to_string(path)?;
        OrreryConfig::from_toml_str(&content)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Negative delays read as zero.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            trial_count_limit: self.trial_count_limit,
            base_backoff: Duration::from_secs_f64(self.trial_backoff_secs.max(0.0)),
            job_stagger: Duration::from_secs_f64(self.job_stagger_secs.max(0.0)),
        }
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = OrreryConfig::default();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch_mode, FetchMode::Mixed);
    }

    #[test]
    fn test_partial_toml() {
        let config = OrreryConfig::from_toml_str(
            r#"
            trial_count_limit = 2
            trial_backoff_secs = 1.5
            fetch_strategy = "sequential"
            fetch_mode = "prefer_local"
            "#,
        )
        .unwrap();
        assert_eq!(config.trial_count_limit, 2);
        assert_eq!(config.fetch_strategy, FetchStrategy::Sequential);
        assert_eq!(config.fetch_mode, FetchMode::PreferLocal);
        assert_eq!(config.horizons_url, DEFAULT_HORIZONS_URL);
        assert_eq!(config.retry_policy().base_backoff, Duration::from_millis(1500));
        assert_eq!(config.retry_policy().job_stagger, Duration::from_millis(400));
    }

    #[test]
    fn test_invalid_toml() {
        let error = OrreryConfig::from_toml_str("fetch_mode = \"sometimes\"").unwrap_err();
        assert!(matches!(error, OrreryError::ConfigError(_)));
        let missing = OrreryConfig::from_file("tests/data/does_not_exist.toml").unwrap_err();
        assert!(matches!(missing, OrreryError::IoError(_)));
    }

    #[test]
    fn test_modes() {
        assert!(!FetchMode::OnlineOnly.reads_cache());
        assert!(!FetchMode::LocalOnly.reaches_network());
        assert!(FetchMode::Mixed.reads_cache() && FetchMode::Mixed.reaches_network());
    }
}
