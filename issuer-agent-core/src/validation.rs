//! Validation pipeline for inbound credential requests.
//!
//! Resolves the holder's signing key, verifies the request signature and checks
//! the timestamp window. Any failure is reported to the counterpart service
//! with a coarse [`ErrorCode`] and then returned to the caller unchanged:
//!
//! * invalid signature, stale or eager timestamp → [`ErrorCode::RequestValidationFailed`]
//! * everything else, key resolution included → [`ErrorCode::ServiceUnavailable`]

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{IssuerAgentError, Result};
use crate::error_code::ErrorCode;
use crate::request::CredentialRequest;
use crate::signature::verify_signature;
use crate::timestamp::validate_timestamp_at;
use crate::traits::{ErrorReporter, KeyMaterialSource};

/// Validates credential requests and reports failures upstream.
pub struct RequestValidator {
    keys: Arc<dyn KeyMaterialSource>,
    reporter: Arc<dyn ErrorReporter>,
}

impl RequestValidator {
    /// Creates a validator from its collaborators.
    #[must_use]
    pub const fn new(
        keys: Arc<dyn KeyMaterialSource>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self { keys, reporter }
    }

    /// Validates `request` against the holder's key and the current time.
    ///
    /// # Errors
    ///
    /// Returns the original validation or resolution error after it has been
    /// reported. If the report itself fails, that error is returned instead.
    pub async fn validate(&self, request: &CredentialRequest) -> Result<()> {
        self.validate_at(request, Utc::now()).await
    }

    /// Validates `request` as of `now`.
    ///
    /// # Errors
    ///
    /// See [`RequestValidator::validate`].
    pub async fn validate_at(&self, request: &CredentialRequest, now: DateTime<Utc>) -> Result<()> {
        let Err(error) = self.check(request, now).await else {
            return Ok(());
        };

        let code = classify(&error);
        log::warn!(
            "credential request on thread {} failed validation ({error}); reporting {code}",
            request.thread_id
        );
        self.reporter.report(&request.thread_id, code).await?;
        Err(error)
    }

    async fn check(&self, request: &CredentialRequest, now: DateTime<Utc>) -> Result<()> {
        let key_material = self.keys.resolve(&request.holder_id).await?;
        verify_signature(request, key_material.signing_key())?;
        validate_timestamp_at(request, now)
    }
}

/// Maps a failure to the code reported to the counterpart service.
#[must_use]
pub const fn classify(error: &IssuerAgentError) -> ErrorCode {
    if error.is_request_validation_failure() {
        ErrorCode::RequestValidationFailed
    } else {
        ErrorCode::ServiceUnavailable
    }
}
