//! Error codes understood by the credential-exchange counterpart.
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Coarse error taxonomy reported to the credential-exchange service.
///
/// The set is closed; each code maps to a fixed human-readable description.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum ErrorCode {
    /// The supplied document type is not supported.
    #[strum(serialize = "300-8")]
    #[serde(rename = "300-8")]
    DocumentUnsupported,
    /// Some information required for the credential could not be verified.
    #[strum(serialize = "600-1")]
    #[serde(rename = "600-1")]
    CredentialRequestFailed,
    /// The holder cancelled the verification.
    #[strum(serialize = "600-3")]
    #[serde(rename = "600-3")]
    VerificationCancelled,
    /// The identity platform erred or is not available.
    #[strum(serialize = "600-7")]
    #[serde(rename = "600-7")]
    ServiceUnavailable,
    /// The issuer erred or is not available.
    #[strum(serialize = "600-8")]
    #[serde(rename = "600-8")]
    IssuerUnavailable,
    /// The inbound credential request failed validation.
    #[strum(serialize = "600-16")]
    #[serde(rename = "600-16")]
    RequestValidationFailed,
}

impl ErrorCode {
    /// Returns the wire representation of the code, e.g. `600-16`.
    #[must_use]
    pub fn code(&self) -> &str {
        self.as_ref()
    }

    /// Returns the description sent alongside the code.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::DocumentUnsupported => {
                "The document provided is not supported and could not be verified"
            }
            Self::CredentialRequestFailed => {
                "Credential request failed because some information could not be verified"
            }
            Self::VerificationCancelled => "Verification process was cancelled by the user",
            Self::ServiceUnavailable => "GlobaliD erred or is not available at the moment",
            Self::IssuerUnavailable => "Issuer erred or is not available at the moment",
            Self::RequestValidationFailed => "Validation of credential request failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_code_strings() {
        assert_eq!(ErrorCode::RequestValidationFailed.code(), "600-16");
        assert_eq!(ErrorCode::ServiceUnavailable.code(), "600-7");
        assert_eq!(ErrorCode::DocumentUnsupported.to_string(), "300-8");
    }

    #[test]
    fn test_parse_every_code() {
        for code in ErrorCode::iter() {
            assert_eq!(ErrorCode::from_str(code.code()).unwrap(), code);
            assert!(!code.description().is_empty());
        }
        assert!(ErrorCode::from_str("999-9").is_err());
    }

    #[test]
    fn test_serde_uses_code_string() {
        let json = serde_json::to_string(&ErrorCode::IssuerUnavailable).unwrap();
        assert_eq!(json, "\"600-8\"");
        let parsed: ErrorCode = serde_json::from_str("\"600-3\"").unwrap();
        assert_eq!(parsed, ErrorCode::VerificationCancelled);
    }
}
