//! # Orrery environment state
//!
//! [`OrreryEnv`] is the production [`HorizonsSource`]: a persistent [`reqwest::Client`] and the
//! [`OrreryConfig`] it was built from.
//!
//! ## Structure
//!
//! ```text
//! OrreryEnv
//! ├── http_client (reqwest::Client, timeout from the configuration)
//! └── config      (OrreryConfig)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orrery::config::OrreryConfig;
//! use orrery::env_state::OrreryEnv;
//! use orrery::orrery_errors::OrreryError;
//!
//! let env = OrreryEnv::new(OrreryConfig::default())?;
//! let url = reqwest::Url::parse("https://ssd.jpl.nasa.gov/horizons_batch.cgi?batch=1")
//!     .map_err(|e| OrreryError::InvalidUrl(e.to_string()))?;
//! let raw = env.get_from_url(url).await?;
//! ```
//!
//! The client keeps its connection pool, build one environment and share it (it is cheap to
//! clone) rather than one per request.
use log::debug;

use crate::config::OrreryConfig;
use crate::horizons::fetch::HorizonsSource;
use crate::horizons::query::HorizonsQuery;
use crate::orrery_errors::OrreryError;

#[derive(Debug, Clone)]
pub struct OrreryEnv {
    pub http_client: reqwest::Client,
    pub config: OrreryConfig,
}

impl OrreryEnv {
    /// Create a new environment
    ///
    /// Arguments
    /// ---------
    /// * `config`: provides the Horizons endpoint and the request timeout
    ///
    /// Return
    /// ------
    /// * the environment, or [`OrreryError::ReqwestError`] when the TLS backend cannot be set up
    pub fn new(config: OrreryConfig) -> Result<Self, OrreryError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(OrreryEnv {
            http_client,
            config,
        })
    }

    /// Body of a GET request, non success statuses are errors.
    pub async fn get_from_url(&self, url: reqwest::Url) -> Result<String, OrreryError> {
        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OrreryError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

impl HorizonsSource for OrreryEnv {
    async fn fetch(&self, query: &HorizonsQuery) -> Result<String, OrreryError> {
        let url = query.url(&self.config.horizons_url)?;
        debug!("GET {url}");
        self.get_from_url(url).await
    }
}
