//! Resilient delivery of credential offers.
//!
//! The exchange service is eventually consistent: an offer sent right after a
//! holder opened a thread may be rejected because the exchange record does not
//! exist yet. Only failures whose structured error code is in the policy's
//! retryable set are retried, with geometric backoff, up to `retry_limit`
//! times. Every other failure, including a transport failure without a
//! response, is returned at once since re-submitting an offer of unknown fate
//! could deliver it twice.
//!
//! The retry decision is the pure function [`RetryPolicy::transition`]; the
//! dispatcher only performs submissions and sleeps.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{IssuerAgentError, Result};
use crate::offer::CredentialOffer;
use crate::traits::OfferSink;

/// Error code the exchange service returns while the exchange record is not yet visible.
pub const RECORD_NOT_FOUND_CODE: &str = "ERR_CREDENTIAL_EXCHANGE_RECORD_NOT_FOUND";

/// Structured failure of a single offer submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("delivery_error: {message} (status: {status:?}, error_code: {error_code:?}, retries: {retries:?})")]
pub struct DeliveryError {
    /// HTTP status of the rejected submission, if a response was received.
    pub status: Option<u16>,
    /// Machine-readable error code from the response body, if any.
    pub error_code: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// Number of retries spent before giving up; set only when retries ran out.
    pub retries: Option<u32>,
}

impl DeliveryError {
    /// A failure without any response from the service.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            error_code: None,
            message: message.into(),
            retries: None,
        }
    }

    /// A failure the service answered with `status` and an optional `error_code`.
    #[must_use]
    pub fn rejected(status: u16, error_code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            error_code,
            message: message.into(),
            retries: None,
        }
    }
}

/// Backoff and eligibility rules for re-submitting offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Delay before the first retry, in milliseconds.
    pub base_backoff_ms: u64,
    /// Factor the delay is multiplied by after each retry.
    pub growth_factor: u32,
    /// Maximum number of retries (total submissions = `retry_limit + 1`).
    pub retry_limit: u32,
    /// Error codes that mark a failure as transient.
    pub retryable_codes: BTreeSet<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_backoff_ms: 500,
            growth_factor: 2,
            retry_limit: 5,
            retryable_codes: BTreeSet::from([RECORD_NOT_FOUND_CODE.to_string()]),
        }
    }
}

/// Progress of one dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Retries performed so far.
    pub attempt_count: u32,
    /// Delay to wait before the next retry.
    pub current_backoff: Duration,
}

/// Outcome of feeding one submission result into the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The offer was accepted.
    Succeeded,
    /// Wait `delay`, then submit again from `next`.
    RetryScheduled {
        /// Delay before the next submission.
        delay: Duration,
        /// State for the next submission.
        next: RetryState,
    },
    /// Give up with this error.
    Failed(DeliveryError),
}

impl RetryPolicy {
    /// Checks that the policy describes a usable, non-shrinking schedule.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] for a zero base backoff or
    /// growth factor.
    pub fn validate(&self) -> Result<()> {
        if self.base_backoff_ms == 0 {
            return Err(IssuerAgentError::invalid_input(
                "base_backoff_ms",
                "must be positive",
            ));
        }
        if self.growth_factor == 0 {
            return Err(IssuerAgentError::invalid_input(
                "growth_factor",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// State at the start of a dispatch call.
    #[must_use]
    pub const fn initial_state(&self) -> RetryState {
        RetryState {
            attempt_count: 0,
            current_backoff: Duration::from_millis(self.base_backoff_ms),
        }
    }

    /// Whether `error` carries one of the retryable codes.
    #[must_use]
    pub fn is_retryable(&self, error: &DeliveryError) -> bool {
        error
            .error_code
            .as_ref()
            .is_some_and(|code| self.retryable_codes.contains(code))
    }

    /// Decides what happens after a submission in `state` produced `outcome`.
    #[must_use]
    pub fn transition(
        &self,
        state: RetryState,
        outcome: std::result::Result<(), DeliveryError>,
    ) -> Transition {
        let mut error = match outcome {
            Ok(()) => return Transition::Succeeded,
            Err(error) => error,
        };

        if !self.is_retryable(&error) {
            return Transition::Failed(error);
        }

        if state.attempt_count < self.retry_limit {
            return Transition::RetryScheduled {
                delay: state.current_backoff,
                next: RetryState {
                    attempt_count: state.attempt_count + 1,
                    current_backoff: state.current_backoff.saturating_mul(self.growth_factor),
                },
            };
        }

        error.retries = Some(state.attempt_count);
        Transition::Failed(error)
    }
}

/// Submits offers through an [`OfferSink`], retrying transient rejections.
pub struct OfferDispatcher {
    sink: Arc<dyn OfferSink>,
    policy: RetryPolicy,
}

impl OfferDispatcher {
    /// Creates a dispatcher over `sink` governed by `policy`.
    #[must_use]
    pub const fn new(sink: Arc<dyn OfferSink>, policy: RetryPolicy) -> Self {
        Self { sink, policy }
    }

    /// Returns the retry policy in effect.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sends `offer`, retrying while the policy allows.
    ///
    /// # Errors
    ///
    /// Returns the last [`DeliveryError`]; when retries ran out its `retries`
    /// field holds the number of retries performed.
    pub async fn send_offer(
        &self,
        offer: &CredentialOffer,
    ) -> std::result::Result<(), DeliveryError> {
        let mut state = self.policy.initial_state();
        loop {
            let outcome = self.sink.submit(offer).await;
            match self.policy.transition(state, outcome) {
                Transition::Succeeded => {
                    log::debug!(
                        "offer on thread {} delivered after {} retries",
                        offer.thread_id,
                        state.attempt_count
                    );
                    return Ok(());
                }
                Transition::RetryScheduled { delay, next } => {
                    log::warn!(
                        "offer on thread {} not accepted yet, retry {} in {}ms",
                        offer.thread_id,
                        next.attempt_count,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    state = next;
                }
                Transition::Failed(error) => {
                    if error.retries.is_some() {
                        log::error!(
                            "giving up on offer for thread {}: {error}",
                            offer.thread_id
                        );
                    }
                    return Err(error);
                }
            }
        }
    }
}
