//! HTTP implementations of the collaborator traits in [`crate::traits`].

mod directory;
mod exchange;
mod fetcher;
mod upload;

pub use directory::IdentityDirectory;
pub use exchange::CredentialExchangeClient;
pub use fetcher::HttpFetcher;
pub use upload::HttpFileStore;

use reqwest::Response;

use crate::error::{IssuerAgentError, Result};

/// Turns a non-2xx response into [`IssuerAgentError::NetworkError`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let error = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("Unknown error"));
    Err(IssuerAgentError::NetworkError {
        url,
        status: Some(status.as_u16()),
        error,
    })
}
