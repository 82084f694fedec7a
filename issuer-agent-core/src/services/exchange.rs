//! Credential-exchange service client: offers and error reports.
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::ensure_success;
use crate::config::IssuerAgentConfig;
use crate::dispatch::DeliveryError;
use crate::error::Result;
use crate::error_code::ErrorCode;
use crate::http_request::Request;
use crate::offer::CredentialOffer;
use crate::traits::{AccessTokenProvider, ErrorReporter, OfferSink};

const OFFERS_PATH: &str = "/v2/aries-management/external-party/credentials/offers";
const ERROR_REPORTS_PATH: &str = "/v2/aries-management/external-party/credentials/error-reports";
const APP_UUID_HEADER: &str = "X-App-Uuid";

#[derive(Debug, Serialize)]
struct ErrorReport<'a> {
    thread_id: &'a str,
    code: &'a str,
    description: &'static str,
}

/// Error body the exchange service answers rejected calls with.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the credential-exchange service.
pub struct CredentialExchangeClient {
    base_url: String,
    app_uuid: Option<String>,
    tokens: Arc<dyn AccessTokenProvider>,
    request: Request,
}

impl CredentialExchangeClient {
    /// Creates a client for the exchange base URL in `config`.
    #[must_use]
    pub fn new(config: &IssuerAgentConfig, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            base_url: config.ssi_base_url.trim_end_matches('/').to_string(),
            app_uuid: config.app_uuid.clone(),
            tokens,
            request: Request::new(config.timeout(), config.max_transport_retries),
        }
    }

    fn authorized_post(&self, path: &str, bearer: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self.request.post(&url).bearer_auth(bearer);
        match &self.app_uuid {
            Some(app_uuid) => builder.header(APP_UUID_HEADER, app_uuid),
            None => builder,
        }
    }
}

#[async_trait]
impl OfferSink for CredentialExchangeClient {
    async fn submit(&self, offer: &CredentialOffer) -> std::result::Result<(), DeliveryError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| DeliveryError::transport(e.to_string()))?;
        let builder = self
            .authorized_post(OFFERS_PATH, token.expose_secret())
            .json(offer);
        let response = self
            .request
            .send_once(builder)
            .await
            .map_err(|e| DeliveryError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_default();
        let message = body.message.unwrap_or_else(|| {
            if text.is_empty() {
                format!("offer rejected with status {status}")
            } else {
                text
            }
        });
        Err(DeliveryError::rejected(
            status.as_u16(),
            body.error_code,
            message,
        ))
    }
}

#[async_trait]
impl ErrorReporter for CredentialExchangeClient {
    async fn report(&self, thread_id: &str, error_code: ErrorCode) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let report = ErrorReport {
            thread_id,
            code: error_code.code(),
            description: error_code.description(),
        };
        let builder = self
            .authorized_post(ERROR_REPORTS_PATH, token.expose_secret())
            .json(&report);
        let response = self.request.send_once(builder).await?;
        ensure_success(response).await?;
        log::info!("reported {error_code} for thread {thread_id}");
        Ok(())
    }
}
