//! Issuer-facing entry point tying the protocol components together.
use std::sync::Arc;

use uuid::Uuid;

use crate::config::IssuerAgentConfig;
use crate::crypto::{sha512sum, KeyWrapCipher};
use crate::dispatch::{OfferDispatcher, RetryPolicy};
use crate::download::{DownloadOptions, IntegrityDownloader};
use crate::error::{IssuerAgentError, Result};
use crate::error_code::ErrorCode;
use crate::offer::{CredentialOffer, FileClaim, MediaType};
use crate::request::CredentialRequest;
use crate::services::{CredentialExchangeClient, HttpFetcher, HttpFileStore, IdentityDirectory};
use crate::traits::{
    AccessTokenProvider, ErrorReporter, Fetcher, FileStore, KeyMaterialSource, OfferSink,
};
use crate::validation::RequestValidator;

/// A file to be encrypted for a holder and attached to an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileObject {
    /// Plaintext file content.
    pub content: Vec<u8>,
    /// File name presented to the file store.
    pub name: String,
    /// Media type of `content`.
    pub media_type: MediaType,
}

/// Collaborators an [`IssuerClient`] is assembled from.
pub struct IssuerClientParts {
    /// Holder key lookup.
    pub keys: Arc<dyn KeyMaterialSource>,
    /// Error report destination.
    pub reporter: Arc<dyn ErrorReporter>,
    /// Offer destination.
    pub offers: Arc<dyn OfferSink>,
    /// Encrypted file storage.
    pub files: Arc<dyn FileStore>,
    /// Raw byte retrieval for downloads.
    pub fetcher: Arc<dyn Fetcher>,
    /// Offer re-submission policy.
    pub offer_retry: RetryPolicy,
}

/// Client used by an issuer to take part in credential exchanges.
pub struct IssuerClient {
    keys: Arc<dyn KeyMaterialSource>,
    reporter: Arc<dyn ErrorReporter>,
    files: Arc<dyn FileStore>,
    validator: RequestValidator,
    dispatcher: OfferDispatcher,
    downloader: IntegrityDownloader,
}

impl IssuerClient {
    /// Creates a client talking to the HTTP services described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] if `config` does not validate.
    pub fn new(config: &IssuerAgentConfig, tokens: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        config.validate()?;
        let exchange = Arc::new(CredentialExchangeClient::new(config, tokens.clone()));
        Ok(Self::from_parts(IssuerClientParts {
            keys: Arc::new(IdentityDirectory::new(config)),
            reporter: exchange.clone(),
            offers: exchange,
            files: Arc::new(HttpFileStore::new(config, tokens)),
            fetcher: Arc::new(HttpFetcher::new(config)),
            offer_retry: config.offer_retry.clone(),
        }))
    }

    /// Creates a client from explicit collaborators.
    #[must_use]
    pub fn from_parts(parts: IssuerClientParts) -> Self {
        Self {
            validator: RequestValidator::new(parts.keys.clone(), parts.reporter.clone()),
            dispatcher: OfferDispatcher::new(parts.offers, parts.offer_retry),
            downloader: IntegrityDownloader::new(parts.fetcher),
            keys: parts.keys,
            reporter: parts.reporter,
            files: parts.files,
        }
    }

    /// Validates an inbound credential request.
    ///
    /// Malformed requests (empty thread ID, non-UUID holder ID) are rejected
    /// without a report. Any later failure is reported on the request's thread
    /// before being returned.
    ///
    /// # Errors
    ///
    /// See [`RequestValidator::validate`].
    pub async fn validate_request(&self, request: &CredentialRequest) -> Result<()> {
        request.check_well_formed()?;
        self.validator.validate(request).await
    }

    /// Reports `error_code` on `thread_id` to the exchange service.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] for an empty thread ID, or
    /// the reporter's error.
    pub async fn report_error(&self, thread_id: &str, error_code: ErrorCode) -> Result<()> {
        require_thread_id(thread_id)?;
        self.reporter.report(thread_id, error_code).await
    }

    /// Delivers `offer`, retrying while the exchange record is not yet visible.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::Delivery`] with the final rejection.
    pub async fn send_offer(&self, offer: &CredentialOffer) -> Result<()> {
        require_thread_id(&offer.thread_id)?;
        Ok(self.dispatcher.send_offer(offer).await?)
    }

    /// Encrypts `file` for `holder_id`, uploads it and returns the claim to attach to an offer.
    ///
    /// The file key is sealed to the holder's encryption key; the checksum is
    /// computed over the plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] for a non-UUID holder ID,
    /// key resolution errors, and file store errors.
    pub async fn upload_file(&self, holder_id: &str, file: FileObject) -> Result<FileClaim> {
        Uuid::parse_str(holder_id).map_err(|e| {
            IssuerAgentError::invalid_input("holder_id", format!("not a valid UUID: {e}"))
        })?;
        let recipient = self.keys.resolve(holder_id).await?.encryption_key();

        let (ciphertext, decryption_key) =
            KeyWrapCipher::for_recipient(recipient).encrypt(&file.content)?;
        let sha_512_sum = sha512sum(&file.content);
        let url = self
            .files
            .store(holder_id, &file.name, file.media_type, ciphertext)
            .await?;

        Ok(FileClaim {
            decryption_key,
            media_type: file.media_type,
            sha_512_sum,
            url,
        })
    }

    /// Downloads `url`, decrypting and verifying it as `options` ask.
    ///
    /// # Errors
    ///
    /// See [`IntegrityDownloader::download`].
    pub async fn download_file(&self, url: &str, options: &DownloadOptions) -> Result<Vec<u8>> {
        self.downloader.download(url, options).await
    }
}

fn require_thread_id(thread_id: &str) -> Result<()> {
    if thread_id.trim().is_empty() {
        return Err(IssuerAgentError::invalid_input(
            "thread_id",
            "must not be empty",
        ));
    }
    Ok(())
}
