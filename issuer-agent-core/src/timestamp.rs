//! Freshness window for credential request timestamps.
use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::error::{IssuerAgentError, Result};
use crate::request::CredentialRequest;

/// How far in the past a request timestamp may lie.
pub const STALENESS_TOLERANCE: Duration = Duration::minutes(5);

/// How far in the future a request timestamp may lie.
pub const EAGERNESS_TOLERANCE: Duration = Duration::minutes(1);

/// Validates the `timestamp` of the given credential request against the current time.
///
/// # Errors
///
/// * [`IssuerAgentError::StaleRequest`] if the timestamp is more than 5 minutes in the past.
/// * [`IssuerAgentError::EagerRequest`] if the timestamp is more than 1 minute in the future.
pub fn validate_timestamp(request: &CredentialRequest) -> Result<()> {
    validate_timestamp_at(request, Utc::now())
}

/// Validates the `timestamp` of the given credential request against `now`.
///
/// Both thresholds are derived from the same `now`. Timestamps exactly on a
/// threshold are accepted.
///
/// # Errors
///
/// See [`validate_timestamp`].
pub fn validate_timestamp_at(request: &CredentialRequest, now: DateTime<Utc>) -> Result<()> {
    let timestamp = request.timestamp;
    let staleness_threshold = now - STALENESS_TOLERANCE;
    if timestamp < staleness_threshold.timestamp_millis() {
        return Err(IssuerAgentError::StaleRequest {
            timestamp: format_millis(timestamp),
            threshold: format_instant(staleness_threshold),
        });
    }

    let eagerness_threshold = now + EAGERNESS_TOLERANCE;
    if timestamp > eagerness_threshold.timestamp_millis() {
        return Err(IssuerAgentError::EagerRequest {
            timestamp: format_millis(timestamp),
            threshold: format_instant(eagerness_threshold),
        });
    }

    Ok(())
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map_or_else(|| format!("{millis}ms"), format_instant)
}
