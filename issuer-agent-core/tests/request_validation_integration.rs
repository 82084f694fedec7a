//! Integration tests for request validation.

mod common;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use ed25519_dalek::{Signer, SigningKey};
use issuer_agent_core::dispatch::RetryPolicy;
use issuer_agent_core::keys::{EncryptionSecret, PublicKeyMaterial};
use issuer_agent_core::{CredentialRequest, ErrorCode, IssuerAgentError};
use rand::rngs::OsRng;
use serde_json::json;

use common::{harness, signed_request, ScriptedSink, HOLDER_ID};

fn split_holder() -> (SigningKey, PublicKeyMaterial) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let material = PublicKeyMaterial::Split {
        signing: signing_key.verifying_key(),
        encryption: EncryptionSecret::generate().public_key(),
    };
    (signing_key, material)
}

#[tokio::test]
async fn test_valid_request_with_payload() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());
    let (signing_key, material) = split_holder();
    h.directory.insert(HOLDER_ID, material);

    let request = signed_request(
        &signing_key,
        "thread-1",
        Utc::now().timestamp_millis(),
        Some(json!({ "z": 1, "a": [true, null], "nested": { "b": "c" } })),
    );

    h.client.validate_request(&request).await.unwrap();
    assert!(h.reporter.reports().is_empty());
}

#[tokio::test]
async fn test_foreign_signature_is_reported_once() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());
    let (_, material) = split_holder();
    h.directory.insert(HOLDER_ID, material);
    let impostor = SigningKey::generate(&mut OsRng);

    let request = signed_request(&impostor, "thread-2", Utc::now().timestamp_millis(), None);
    let err = h.client.validate_request(&request).await.unwrap_err();

    assert!(matches!(err, IssuerAgentError::InvalidSignature));
    assert_eq!(
        h.reporter.reports(),
        vec![("thread-2".to_string(), ErrorCode::RequestValidationFailed)]
    );
}

#[tokio::test]
async fn test_tampered_payload_is_rejected() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());
    let (signing_key, material) = split_holder();
    h.directory.insert(HOLDER_ID, material);

    let mut request = signed_request(
        &signing_key,
        "thread-3",
        Utc::now().timestamp_millis(),
        Some(json!({ "document": "passport" })),
    );
    request.payload = Some(json!({ "document": "driving-licence" }));

    let err = h.client.validate_request(&request).await.unwrap_err();
    assert!(matches!(err, IssuerAgentError::InvalidSignature));
}

#[tokio::test]
async fn test_eager_request_is_reported() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());
    let (signing_key, material) = split_holder();
    h.directory.insert(HOLDER_ID, material);

    let in_two_minutes = Utc::now().timestamp_millis() + 2 * 60_000;
    let request = signed_request(&signing_key, "thread-4", in_two_minutes, None);

    let err = h.client.validate_request(&request).await.unwrap_err();
    assert!(matches!(err, IssuerAgentError::EagerRequest { .. }));
    assert_eq!(
        h.reporter.reports(),
        vec![("thread-4".to_string(), ErrorCode::RequestValidationFailed)]
    );
}

#[tokio::test]
async fn test_unknown_holder_is_reported_as_unavailable() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());
    let signing_key = SigningKey::generate(&mut OsRng);

    let request = signed_request(&signing_key, "thread-5", Utc::now().timestamp_millis(), None);
    let err = h.client.validate_request(&request).await.unwrap_err();

    assert!(matches!(err, IssuerAgentError::IdentityNotFound { .. }));
    assert_eq!(
        h.reporter.reports(),
        vec![("thread-5".to_string(), ErrorCode::ServiceUnavailable)]
    );
}

#[tokio::test]
async fn test_malformed_holder_id_is_not_reported() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());
    let signing_key = SigningKey::generate(&mut OsRng);

    let mut request = signed_request(&signing_key, "thread-6", Utc::now().timestamp_millis(), None);
    request.holder_id = "not-a-uuid".to_string();

    let err = h.client.validate_request(&request).await.unwrap_err();
    assert!(matches!(
        err,
        IssuerAgentError::InvalidInput { attribute, .. } if attribute == "holder_id"
    ));
    assert!(h.reporter.reports().is_empty());
}

#[tokio::test]
async fn test_explicit_error_report() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());

    h.client
        .report_error("thread-7", ErrorCode::DocumentUnsupported)
        .await
        .unwrap();
    assert!(h.client.report_error("", ErrorCode::IssuerUnavailable).await.is_err());

    assert_eq!(
        h.reporter.reports(),
        vec![("thread-7".to_string(), ErrorCode::DocumentUnsupported)]
    );
}

#[tokio::test]
async fn test_signature_over_wire_number_text() {
    let h = harness(ScriptedSink::default(), RetryPolicy::default());
    let (signing_key, material) = split_holder();
    h.directory.insert(HOLDER_ID, material);

    let timestamp = Utc::now().timestamp_millis();
    let payload = r#"{"n":100000000000000000000,"f":1e+21}"#;
    let signature = STANDARD.encode(
        signing_key
            .sign(format!("thread-8{timestamp}{payload}").as_bytes())
            .to_bytes(),
    );
    let request: CredentialRequest = serde_json::from_str(&format!(
        r#"{{"threadId":"thread-8","holderId":"{HOLDER_ID}","timestamp":{timestamp},"payload":{payload},"signature":"{signature}"}}"#
    ))
    .unwrap();

    h.client.validate_request(&request).await.unwrap();
    assert!(h.reporter.reports().is_empty());
}
