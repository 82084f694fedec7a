//! Retrieval of (optionally encrypted) files with integrity checking.
use std::sync::Arc;

use url::Url;

use crate::crypto::{
    checksum_matches, sha512sum, EncryptionEnvelope, HybridCipher, KeyAgreementCipher,
    KeyWrapCipher,
};
use crate::error::{IssuerAgentError, Result};
use crate::traits::Fetcher;

/// Per-call options for [`IntegrityDownloader::download`].
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    decryption: Option<(HybridCipher, Option<String>)>,
    expected_checksum: Option<String>,
}

impl DownloadOptions {
    /// Decrypts the payload with `cipher` using the key from a [`crate::FileClaim`].
    #[must_use]
    pub fn with_key_wrap(
        mut self,
        cipher: KeyWrapCipher,
        decryption_key: impl Into<String>,
    ) -> Self {
        self.decryption = Some((
            HybridCipher::KeyWrap(cipher),
            Some(decryption_key.into()),
        ));
        self
    }

    /// Decrypts the payload with the key both parties agree on.
    #[must_use]
    pub fn with_key_agreement(mut self, cipher: KeyAgreementCipher) -> Self {
        self.decryption = Some((HybridCipher::KeyAgreement(cipher), None));
        self
    }

    /// Requires the (decrypted) payload to hash to `sha_512_sum`.
    #[must_use]
    pub fn with_checksum(mut self, sha_512_sum: impl Into<String>) -> Self {
        self.expected_checksum = Some(sha_512_sum.into());
        self
    }
}

/// Downloads payloads through a [`Fetcher`], decrypting and verifying them.
pub struct IntegrityDownloader {
    fetcher: Arc<dyn Fetcher>,
}

impl IntegrityDownloader {
    /// Creates a downloader over `fetcher`.
    #[must_use]
    pub const fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches `url`, decrypts it if asked to, then verifies the checksum of the result.
    ///
    /// # Errors
    ///
    /// - [`IssuerAgentError::InvalidInput`] if `url` is not an absolute URL.
    /// - Fetcher and decryption errors as they occur.
    /// - [`IssuerAgentError::DataIntegrity`] if the checksum does not match; no
    ///   bytes are returned in that case.
    pub async fn download(&self, url: &str, options: &DownloadOptions) -> Result<Vec<u8>> {
        Url::parse(url).map_err(|e| IssuerAgentError::invalid_input("url", e.to_string()))?;

        let mut data = self.fetcher.fetch(url).await?;

        if let Some((cipher, wrapped_key)) = &options.decryption {
            data = cipher.decrypt(&EncryptionEnvelope {
                ciphertext: data,
                wrapped_key: wrapped_key.clone(),
            })?;
        }

        if let Some(expected) = &options.expected_checksum {
            if !checksum_matches(expected, &data) {
                let actual = sha512sum(&data);
                log::warn!("checksum mismatch for {url}: expected {expected}, got {actual}");
                return Err(IssuerAgentError::DataIntegrity {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(data)
    }
}
