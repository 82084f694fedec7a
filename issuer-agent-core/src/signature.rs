//! Verification of holder signatures over credential requests.
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signature, VerifyingKey};

use crate::error::{IssuerAgentError, Result};
use crate::request::CredentialRequest;

/// Verifies the `signature` of the given credential request.
///
/// The signature is checked with strict Ed25519 verification over
/// [`CredentialRequest::canonical_message`].
///
/// # Errors
///
/// Returns [`IssuerAgentError::InvalidSignature`] if the signature is not valid
/// base64, not 64 bytes long, or does not verify under `public_key`.
pub fn verify_signature(request: &CredentialRequest, public_key: &VerifyingKey) -> Result<()> {
    let signature_bytes = STANDARD
        .decode(request.signature.trim())
        .map_err(|_| IssuerAgentError::InvalidSignature)?;
    let signature = Signature::from_slice(&signature_bytes)
        .map_err(|_| IssuerAgentError::InvalidSignature)?;

    public_key
        .verify_strict(&request.canonical_message(), &signature)
        .map_err(|_| IssuerAgentError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;
    use serde_json::json;

    use super::*;

    fn signed_request(signing_key: &SigningKey) -> CredentialRequest {
        let mut request = CredentialRequest {
            thread_id: "a3f1c9".to_string(),
            holder_id: "0b0f2a6e-3a55-4c1b-9d7e-7a1f4c2b9e10".to_string(),
            timestamp: 1_700_000_000_000,
            payload: Some(json!({ "document": "passport" })),
            signature: String::new(),
        };
        let signature = signing_key.sign(&request.canonical_message());
        request.signature = STANDARD.encode(signature.to_bytes());
        request
    }

    #[test]
    fn test_valid_signature() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let request = signed_request(&signing_key);
        assert!(verify_signature(&request, &signing_key.verifying_key()).is_ok());
    }

    #[test]
    fn test_signature_from_other_key() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let other = SigningKey::generate(&mut OsRng);
        let request = signed_request(&signing_key);
        assert!(matches!(
            verify_signature(&request, &other.verifying_key()),
            Err(IssuerAgentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_payload() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let mut request = signed_request(&signing_key);
        request.payload = Some(json!({ "document": "drivers_license" }));
        assert!(matches!(
            verify_signature(&request, &signing_key.verifying_key()),
            Err(IssuerAgentError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_signature_encoding() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let mut request = signed_request(&signing_key);

        request.signature = "%%% not base64 %%%".to_string();
        assert!(matches!(
            verify_signature(&request, &signing_key.verifying_key()),
            Err(IssuerAgentError::InvalidSignature)
        ));

        request.signature = STANDARD.encode([1u8; 12]);
        assert!(matches!(
            verify_signature(&request, &signing_key.verifying_key()),
            Err(IssuerAgentError::InvalidSignature)
        ));
    }
}
