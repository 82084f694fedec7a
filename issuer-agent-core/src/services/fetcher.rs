//! HTTP fetcher for raw file bytes.
use async_trait::async_trait;

use super::ensure_success;
use crate::config::IssuerAgentConfig;
use crate::error::Result;
use crate::http_request::Request;
use crate::traits::Fetcher;

/// Plain HTTP GET fetcher with transport retries.
pub struct HttpFetcher {
    request: Request,
}

impl HttpFetcher {
    /// Creates a fetcher using the timeout and retry settings in `config`.
    #[must_use]
    pub fn new(config: &IssuerAgentConfig) -> Self {
        Self {
            request: Request::new(config.timeout(), config.max_transport_retries),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.request.handle(self.request.get(url)).await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;

    use super::*;
    use crate::error::IssuerAgentError;

    #[tokio::test]
    async fn test_fetch_bytes() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/files/1")
            .with_status(200)
            .with_body([0_u8, 1, 2, 255])
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&IssuerAgentConfig::default());
        let bytes = fetcher
            .fetch(&format!("{}/files/1", server.url()))
            .await
            .unwrap();

        assert_eq!(bytes, vec![0, 1, 2, 255]);
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/files/2")
            .with_status(404)
            .with_body("no such file")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&IssuerAgentConfig::default());
        let result = fetcher.fetch(&format!("{}/files/2", server.url())).await;

        match result {
            Err(IssuerAgentError::NetworkError { status, error, .. }) => {
                assert_eq!(status, Some(404));
                assert_eq!(error, "no such file");
            }
            other => panic!("expected NetworkError, got {other:?}"),
        }
    }
}
