//! Client configuration.
//!
//! All fields have defaults, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! endpoint = "https://api.devnet.solana.com"
//! commitment = "confirmed"
//!
//! [extra_headers]
//! x-api-key = "..."
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commitment::CommitmentLevel;
use crate::error::ConfigError;

/// Overrides the default endpoint when set.
pub const ENDPOINT_ENV: &str = "SOLANARPC_HTTP_URI";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8899";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// HTTP(S) JSON-RPC endpoint.
    pub endpoint: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Commitment used when a call does not specify one.
    pub commitment: CommitmentLevel,

    /// Headers added to every request (API keys and the like).
    pub extra_headers: BTreeMap<String, String>,

    /// Transport-level retries for transient failures.
    pub max_retries: u32,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,

    /// How long confirmation polls without a block height bound.
    pub confirm_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: 10,
            commitment: CommitmentLevel::Finalized,
            extra_headers: BTreeMap::new(),
            max_retries: 3,
            retry_base_ms: 200,
            retry_max_ms: 5_000,
            confirm_timeout_secs: 90,
            poll_interval_ms: 500,
        }
    }
}

fn default_endpoint() -> String {
    std::env::var(ENDPOINT_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

impl RpcConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_commitment(mut self, commitment: CommitmentLevel) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Collects every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            Ok(url) => errors.push(format!(
                "endpoint {:?} must be an http(s) URL with a host (scheme {:?})",
                self.endpoint,
                url.scheme()
            )),
            Err(e) => errors.push(format!("endpoint {:?} is not a URL: {e}", self.endpoint)),
        }
        if self.timeout_secs == 0 {
            errors.push("timeout_secs must be non-zero".into());
        }
        if self.confirm_timeout_secs == 0 {
            errors.push("confirm_timeout_secs must be non-zero".into());
        }
        if self.poll_interval_ms == 0 {
            errors.push("poll_interval_ms must be non-zero".into());
        }
        if self.retry_base_ms > self.retry_max_ms {
            errors.push(format!(
                "retry_base_ms ({}) exceeds retry_max_ms ({})",
                self.retry_base_ms, self.retry_max_ms
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RpcConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    RpcConfig::from_toml_str(&content)
}
