//! Endpoints, timeouts and retry settings.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dispatch::RetryPolicy;
use crate::error::{IssuerAgentError, Result};

/// Default base URL of the identity directory and media API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.global.id";
/// Default base URL of the credential-exchange service.
pub const DEFAULT_SSI_BASE_URL: &str = "https://ssi.global.id";

/// Configuration shared by every collaborator of an [`crate::IssuerClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerAgentConfig {
    /// Base URL of the identity directory and media upload API.
    pub api_base_url: String,
    /// Base URL of the credential-exchange service.
    pub ssi_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// How many times an idempotent request is retried on a transient failure.
    pub max_transport_retries: u32,
    /// Re-submission policy for credential offers.
    pub offer_retry: RetryPolicy,
    /// Application identifier forwarded to the exchange service, if any.
    pub app_uuid: Option<String>,
}

impl Default for IssuerAgentConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ssi_base_url: DEFAULT_SSI_BASE_URL.to_string(),
            timeout_secs: 5,
            max_transport_retries: 3,
            offer_retry: RetryPolicy::default(),
            app_uuid: None,
        }
    }
}

impl IssuerAgentConfig {
    /// Parses a JSON configuration; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::SerializationError`] for malformed JSON and
    /// [`IssuerAgentError::InvalidInput`] if [`Self::validate`] fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks base URLs and the offer retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        for (attribute, value) in [
            ("api_base_url", &self.api_base_url),
            ("ssi_base_url", &self.ssi_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| IssuerAgentError::invalid_input(attribute, e.to_string()))?;
        }
        if self.timeout_secs == 0 {
            return Err(IssuerAgentError::invalid_input(
                "timeout_secs",
                "must be positive",
            ));
        }
        self.offer_retry.validate()
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
