//! Two-step file upload: request a pre-signed slot, then post the file to it.
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::ensure_success;
use crate::config::IssuerAgentConfig;
use crate::error::{IssuerAgentError, Result};
use crate::http_request::Request;
use crate::offer::MediaType;
use crate::traits::{AccessTokenProvider, FileStore};

#[derive(Debug, Serialize)]
struct MediaUploadRequest<'a> {
    gid_uuid: &'a str,
    media: [MediaSpec<'a>; 1],
}

#[derive(Debug, Serialize)]
struct MediaSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    file_name: &'a str,
    content_type: &'a str,
}

/// A pre-signed upload slot.
#[derive(Debug, Clone, Deserialize)]
struct MediaUploadInfo {
    s3_upload_url: String,
    s3_upload_fields: BTreeMap<String, String>,
    base_serve_url: String,
}

/// [`FileStore`] backed by the media upload API and pre-signed object storage posts.
pub struct HttpFileStore {
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
    request: Request,
}

impl HttpFileStore {
    /// Creates a file store for the API base URL in `config`.
    #[must_use]
    pub fn new(config: &IssuerAgentConfig, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
            request: Request::new(config.timeout(), config.max_transport_retries),
        }
    }

    async fn upload_slot(
        &self,
        holder_id: &str,
        file_name: &str,
        media_type: MediaType,
    ) -> Result<MediaUploadInfo> {
        let token = self.tokens.access_token().await?;
        let body = MediaUploadRequest {
            gid_uuid: holder_id,
            media: [MediaSpec {
                kind: "encrypted",
                file_name,
                content_type: media_type.as_ref(),
            }],
        };
        let builder = self
            .request
            .post(&format!("{}/v2/upload", self.base_url))
            .bearer_auth(token.expose_secret())
            .json(&body);
        let response = self.request.send_once(builder).await?;
        let response = ensure_success(response).await?;
        let slots = response.json::<Vec<MediaUploadInfo>>().await?;
        slots
            .into_iter()
            .next()
            .ok_or_else(|| IssuerAgentError::FileUpload {
                file_name: file_name.to_string(),
            })
    }
}

#[async_trait]
impl FileStore for HttpFileStore {
    async fn store(
        &self,
        holder_id: &str,
        file_name: &str,
        media_type: MediaType,
        content: Vec<u8>,
    ) -> Result<String> {
        let slot = self.upload_slot(holder_id, file_name, media_type).await?;
        let key = slot
            .s3_upload_fields
            .get("key")
            .cloned()
            .ok_or_else(|| IssuerAgentError::FileUpload {
                file_name: file_name.to_string(),
            })?;

        let form = slot
            .s3_upload_fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let file = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(media_type.as_ref())?;
        let builder = self
            .request
            .post(&slot.s3_upload_url)
            .multipart(form.part("file", file));
        let response = self.request.send_once(builder).await?;
        ensure_success(response).await?;

        let url = format!("{}/{key}", slot.base_serve_url.trim_end_matches('/'));
        log::debug!("uploaded {file_name} for {holder_id} to {url}");
        Ok(url)
    }
}
