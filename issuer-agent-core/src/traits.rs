//! Interfaces to the external services the protocol layer depends on.
//!
//! HTTP implementations live in [`crate::services`]; tests substitute
//! in-memory ones.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::dispatch::DeliveryError;
use crate::error::Result;
use crate::error_code::ErrorCode;
use crate::keys::PublicKeyMaterial;
use crate::offer::{CredentialOffer, MediaType};

/// Resolves a holder identifier to the holder's public key material.
#[async_trait]
pub trait KeyMaterialSource: Send + Sync {
    /// Looks up the key material for `holder_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IssuerAgentError::IdentityNotFound`] if the lookup itself
    /// fails and [`crate::IssuerAgentError::PublicKeyNotFound`] if the identity
    /// lacks the expected key fields.
    async fn resolve(&self, holder_id: &str) -> Result<PublicKeyMaterial>;
}

/// Notifies the credential-exchange counterpart about a failed thread.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Reports `error_code` for the thread `thread_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the report could not be delivered.
    async fn report(&self, thread_id: &str, error_code: ErrorCode) -> Result<()>;
}

/// Retrieves raw bytes from a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads the content at `url`.
    ///
    /// # Errors
    ///
    /// Transport errors are returned unmodified.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Accepts credential offers for delivery to a holder.
#[async_trait]
pub trait OfferSink: Send + Sync {
    /// Submits `offer` once.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] carrying the service's structured error code
    /// when one was available.
    async fn submit(&self, offer: &CredentialOffer) -> std::result::Result<(), DeliveryError>;
}

/// Stores encrypted files and returns the URL they are served from.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Uploads already-encrypted `content` on behalf of `holder_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload slot could not be obtained or the upload failed.
    async fn store(
        &self,
        holder_id: &str,
        file_name: &str,
        media_type: MediaType,
        content: Vec<u8>,
    ) -> Result<String>;
}

/// Supplies bearer tokens for protected endpoints.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a currently valid access token.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be obtained.
    async fn access_token(&self) -> Result<SecretString>;
}

/// An [`AccessTokenProvider`] that always hands out the same token.
pub struct StaticAccessToken(SecretString);

impl StaticAccessToken {
    /// Wraps a pre-issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl std::fmt::Debug for StaticAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticAccessToken").field(&"[REDACTED]").finish()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessToken {
    async fn access_token(&self) -> Result<SecretString> {
        Ok(self.0.clone())
    }
}
