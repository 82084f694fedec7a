//! Holder-originated credential requests.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{IssuerAgentError, Result};

/// A holder-signed request asking the issuer to act on a credential thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    /// Thread ID received from the holder.
    pub thread_id: String,
    /// UUID of the holder's identity.
    #[serde(alias = "gidUuid")]
    pub holder_id: String,
    /// Time of the request in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Data about the credential being requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Base64-encoded signature over [`CredentialRequest::canonical_message`].
    pub signature: String,
}

impl CredentialRequest {
    /// Builds the message the holder signs: `thread_id || timestamp || json(payload)`.
    ///
    /// An absent payload contributes the empty string. The field order is fixed.
    #[must_use]
    pub fn canonical_message(&self) -> Vec<u8> {
        let payload = self
            .payload
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
        format!("{}{}{}", self.thread_id, self.timestamp, payload).into_bytes()
    }

    /// Checks the request is well formed before any key lookup happens.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] when the thread ID is empty or the
    /// holder ID is not a UUID.
    pub fn check_well_formed(&self) -> Result<()> {
        if self.thread_id.trim().is_empty() {
            return Err(IssuerAgentError::invalid_input(
                "thread_id",
                "must not be empty",
            ));
        }
        Uuid::parse_str(&self.holder_id).map_err(|e| {
            IssuerAgentError::invalid_input("holder_id", format!("not a valid UUID: {e}"))
        })?;
        Ok(())
    }
}
