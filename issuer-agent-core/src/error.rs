use thiserror::Error;

use crate::dispatch::DeliveryError;

/// Result type for issuer agent operations.
pub type Result<T> = std::result::Result<T, IssuerAgentError>;

/// Error outputs from the issuer agent.
#[derive(Debug, Error)]
pub enum IssuerAgentError {
    /// The request signature does not verify against the holder's signing key
    #[error("invalid_signature: credential request signature is invalid")]
    InvalidSignature,
    /// The request timestamp is older than the staleness threshold
    #[error("stale_request: credential request timestamp ({timestamp}) is before staleness threshold ({threshold})")]
    StaleRequest {
        /// Request timestamp (RFC 3339).
        timestamp: String,
        /// Staleness threshold computed at validation time (RFC 3339).
        threshold: String,
    },
    /// The request timestamp is further in the future than the eagerness threshold
    #[error("eager_request: credential request timestamp ({timestamp}) is after eagerness threshold ({threshold})")]
    EagerRequest {
        /// Request timestamp (RFC 3339).
        timestamp: String,
        /// Eagerness threshold computed at validation time (RFC 3339).
        threshold: String,
    },
    /// The identity directory could not produce an identity for the holder
    #[error("identity_not_found: no identity found with holder id {holder_id}")]
    IdentityNotFound {
        /// Holder the lookup was made for.
        holder_id: String,
    },
    /// The holder identity does not expose the expected key
    #[error("public_key_not_found: no public key found for holder id {holder_id}")]
    PublicKeyNotFound {
        /// Holder the lookup was made for.
        holder_id: String,
    },
    /// A downloaded payload does not match its expected checksum
    #[error("data_integrity: checksum mismatch (expected {expected}, got {actual})")]
    DataIntegrity {
        /// Checksum supplied by the caller.
        expected: String,
        /// Checksum computed over the (possibly decrypted) payload.
        actual: String,
    },
    /// Credential offer delivery failed
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    /// Network connection error with details
    #[error("network_error: {url} (status: {status:?}): {error}")]
    NetworkError {
        /// Requested URL.
        url: String,
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Error description.
        error: String,
    },
    /// An Ed25519 key or signature was rejected by the curve library
    #[error("ed25519_error: {0}")]
    Ed25519(#[from] ed25519_dalek::SignatureError),
    /// The AEAD rejected its input, e.g. a wrong key or a tampered ciphertext
    #[error("aead_error: {0}")]
    Aead(#[from] chacha20poly1305::Error),
    /// A key-exchange or framing rule was violated
    #[error("crypto_error: {0}")]
    Crypto(String),
    /// Unexpected error serializing information
    #[error("serialization_error: {error}")]
    SerializationError {
        /// Error description.
        error: String,
    },
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// Offending attribute.
        attribute: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The file store did not return an upload slot for the file
    #[error("file_upload: failed to upload file {file_name}")]
    FileUpload {
        /// Name of the file that could not be uploaded.
        file_name: String,
    },
    /// HTTP request failure
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl IssuerAgentError {
    /// Returns `true` for failures of the request itself (signature or
    /// timestamp) as opposed to failures to evaluate it.
    #[must_use]
    pub const fn is_request_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature | Self::StaleRequest { .. } | Self::EagerRequest { .. }
        )
    }

    pub(crate) fn invalid_input(attribute: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for IssuerAgentError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError {
            error: error.to_string(),
        }
    }
}
