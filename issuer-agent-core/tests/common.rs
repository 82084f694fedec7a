//! Shared helpers for integration tests.

#![allow(dead_code, missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signer, SigningKey};
use issuer_agent_core::dispatch::{DeliveryError, RetryPolicy};
use issuer_agent_core::keys::PublicKeyMaterial;
use issuer_agent_core::traits::{ErrorReporter, Fetcher, FileStore, KeyMaterialSource, OfferSink};
use issuer_agent_core::{
    CredentialOffer, CredentialRequest, ErrorCode, IssuerAgentError, IssuerClient,
    IssuerClientParts, MediaType, Result,
};
use serde_json::Value;
use tokio::time::Instant;

pub const HOLDER_ID: &str = "0b0f2a6e-3a55-4c1b-9d7e-7a1f4c2b9e10";

/// Directory backed by a fixed map of holders.
#[derive(Default)]
pub struct InMemoryDirectory(Mutex<HashMap<String, PublicKeyMaterial>>);

impl InMemoryDirectory {
    pub fn insert(&self, holder_id: &str, material: PublicKeyMaterial) {
        self.0
            .lock()
            .unwrap()
            .insert(holder_id.to_string(), material);
    }
}

#[async_trait]
impl KeyMaterialSource for InMemoryDirectory {
    async fn resolve(&self, holder_id: &str) -> Result<PublicKeyMaterial> {
        self.0
            .lock()
            .unwrap()
            .get(holder_id)
            .cloned()
            .ok_or_else(|| IssuerAgentError::IdentityNotFound {
                holder_id: holder_id.to_string(),
            })
    }
}

#[derive(Default)]
pub struct RecordingReporter(Mutex<Vec<(String, ErrorCode)>>);

impl RecordingReporter {
    pub fn reports(&self) -> Vec<(String, ErrorCode)> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorReporter for RecordingReporter {
    async fn report(&self, thread_id: &str, error_code: ErrorCode) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .push((thread_id.to_string(), error_code));
        Ok(())
    }
}

/// Answers submissions from a script, then accepts everything.
#[derive(Default)]
pub struct ScriptedSink {
    script: Mutex<VecDeque<DeliveryError>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedSink {
    pub fn failing_with(errors: impl IntoIterator<Item = DeliveryError>) -> Self {
        Self {
            script: Mutex::new(errors.into_iter().collect()),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OfferSink for ScriptedSink {
    async fn submit(&self, _offer: &CredentialOffer) -> std::result::Result<(), DeliveryError> {
        self.calls.lock().unwrap().push(Instant::now());
        self.script.lock().unwrap().pop_front().map_or(Ok(()), Err)
    }
}

/// File store and fetcher sharing one map, so uploads can be downloaded again.
#[derive(Default)]
pub struct InMemoryFiles(Mutex<HashMap<String, Vec<u8>>>);

impl InMemoryFiles {
    pub fn stored(&self, url: &str) -> Option<Vec<u8>> {
        self.0.lock().unwrap().get(url).cloned()
    }
}

#[async_trait]
impl FileStore for InMemoryFiles {
    async fn store(
        &self,
        holder_id: &str,
        file_name: &str,
        _media_type: MediaType,
        content: Vec<u8>,
    ) -> Result<String> {
        let url = format!("https://files.example/{holder_id}/{file_name}");
        self.0.lock().unwrap().insert(url.clone(), content);
        Ok(url)
    }
}

#[async_trait]
impl Fetcher for InMemoryFiles {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.stored(url).ok_or_else(|| IssuerAgentError::NetworkError {
            url: url.to_string(),
            status: Some(404),
            error: "not found".to_string(),
        })
    }
}

pub struct Harness {
    pub client: IssuerClient,
    pub directory: Arc<InMemoryDirectory>,
    pub reporter: Arc<RecordingReporter>,
    pub sink: Arc<ScriptedSink>,
    pub files: Arc<InMemoryFiles>,
}

pub fn harness(sink: ScriptedSink, offer_retry: RetryPolicy) -> Harness {
    let directory = Arc::new(InMemoryDirectory::default());
    let reporter = Arc::new(RecordingReporter::default());
    let sink = Arc::new(sink);
    let files = Arc::new(InMemoryFiles::default());
    let client = IssuerClient::from_parts(IssuerClientParts {
        keys: directory.clone(),
        reporter: reporter.clone(),
        offers: sink.clone(),
        files: files.clone(),
        fetcher: files.clone(),
        offer_retry,
    });
    Harness {
        client,
        directory,
        reporter,
        sink,
        files,
    }
}

pub fn signed_request(
    signing_key: &SigningKey,
    thread_id: &str,
    timestamp: i64,
    payload: Option<Value>,
) -> CredentialRequest {
    let mut request = CredentialRequest {
        thread_id: thread_id.to_string(),
        holder_id: HOLDER_ID.to_string(),
        timestamp,
        payload,
        signature: String::new(),
    };
    request.signature = STANDARD.encode(signing_key.sign(&request.canonical_message()).to_bytes());
    request
}

pub fn offer(thread_id: &str) -> CredentialOffer {
    serde_json::from_value(serde_json::json!({
        "thread_id": thread_id,
        "name": "Proof of age",
        "context_iri": "https://schema.example/age",
        "subject_type": "AgeCredential",
        "claims": { "over_18": { "type": "boolean", "value": true } }
    }))
    .unwrap()
}
