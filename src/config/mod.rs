//! Configuration module for the ERP forms client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ClientError;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the ERP backend
    pub api_base_url: String,
    /// Path to the SQLite file holding the persisted session
    pub session_db_path: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("ERP_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "Invalid ERP_API_BASE_URL: {}",
                api_base_url
            )));
        }

        let session_db_path = env::var("ERP_SESSION_DB")
            .unwrap_or_else(|_| "./data/session.sqlite".to_string())
            .into();

        let timeout_secs = env::var("ERP_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|e| {
                ClientError::Config(format!("Invalid ERP_REQUEST_TIMEOUT_SECS format: {}", e))
            })?;

        let log_level = env::var("ERP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_base_url,
            session_db_path,
            request_timeout: Duration::from_secs(timeout_secs),
            log_level,
        })
    }
}
