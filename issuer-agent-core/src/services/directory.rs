//! Identity directory client resolving holder keys.
use async_trait::async_trait;
use serde::Deserialize;

use super::ensure_success;
use crate::config::IssuerAgentConfig;
use crate::error::{IssuerAgentError, Result};
use crate::http_request::Request;
use crate::keys::{parse_encryption_key, parse_signing_key, PublicKeyMaterial};
use crate::traits::KeyMaterialSource;

/// Public part of an identity as served by the directory.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub(crate) struct Identity {
    #[serde(default)]
    pub(crate) public_key: Option<String>,
    #[serde(default)]
    pub(crate) public_signing_key: Option<String>,
    #[serde(default)]
    pub(crate) public_encryption_key: Option<String>,
}

impl Identity {
    /// Resolves the key for each role separately.
    ///
    /// Role-specific keys take precedence; `public_key` fills in whichever role
    /// has no key of its own. Without any signing key the identity is unusable.
    fn key_material(&self, holder_id: &str) -> Result<PublicKeyMaterial> {
        let Some(signing) = self
            .public_signing_key
            .as_deref()
            .or(self.public_key.as_deref())
        else {
            return Err(IssuerAgentError::PublicKeyNotFound {
                holder_id: holder_id.to_string(),
            });
        };
        let signing = parse_signing_key(signing)?;
        let encryption = match (
            self.public_encryption_key.as_deref(),
            self.public_key.as_deref(),
        ) {
            (Some(encryption), _) => parse_encryption_key(encryption)?,
            (None, Some(combined)) if self.public_signing_key.is_some() => {
                PublicKeyMaterial::combined_from_hex(combined)?.encryption_key()
            }
            (None, _) => return Ok(PublicKeyMaterial::Combined(signing)),
        };
        Ok(PublicKeyMaterial::Split {
            signing,
            encryption,
        })
    }
}

/// Identity directory API client
pub struct IdentityDirectory {
    base_url: String,
    request: Request,
}

impl IdentityDirectory {
    /// Creates a directory client for the API base URL in `config`.
    #[must_use]
    pub fn new(config: &IssuerAgentConfig) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            request: Request::new(config.timeout(), config.max_transport_retries),
        }
    }

    async fn identity(&self, holder_id: &str) -> Result<Identity> {
        let url = format!("{}/v1/directory/{holder_id}", self.base_url);
        let response = self.request.handle(self.request.get(&url)).await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Identity>().await?)
    }
}

#[async_trait]
impl KeyMaterialSource for IdentityDirectory {
    async fn resolve(&self, holder_id: &str) -> Result<PublicKeyMaterial> {
        let identity = self.identity(holder_id).await.map_err(|e| {
            log::debug!("identity lookup for {holder_id} failed: {e}");
            IssuerAgentError::IdentityNotFound {
                holder_id: holder_id.to_string(),
            }
        })?;
        identity.key_material(holder_id)
    }
}

#[cfg(test)]
impl IdentityDirectory {
    /// Create a directory client with a custom base URL (for testing).
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(&IssuerAgentConfig {
            api_base_url: base_url.to_string(),
            max_transport_retries: 0,
            ..IssuerAgentConfig::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use mockito::Server;
    use rand::rngs::OsRng;

    use super::*;
    use crate::keys::EncryptionSecret;

    const HOLDER: &str = "0b0f2a6e-3a55-4c1b-9d7e-7a1f4c2b9e10";

    #[tokio::test]
    async fn test_resolve_split_keys() {
        let mut server = Server::new_async().await;
        let signing = SigningKey::generate(&mut OsRng);
        let encryption = EncryptionSecret::generate();
        let body = serde_json::json!({
            "gid_uuid": HOLDER,
            "name": "holder",
            "public_signing_key": hex::encode(signing.verifying_key().as_bytes()),
            "public_encryption_key": hex::encode(encryption.public_key().as_bytes()),
        });
        let mock = server
            .mock("GET", format!("/v1/directory/{HOLDER}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let directory = IdentityDirectory::with_base_url(&server.url());
        let material = directory.resolve(HOLDER).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            material,
            PublicKeyMaterial::Split {
                signing: signing.verifying_key(),
                encryption: encryption.public_key(),
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_combined_key() {
        let mut server = Server::new_async().await;
        let signing = SigningKey::generate(&mut OsRng);
        let body = serde_json::json!({
            "gid_uuid": HOLDER,
            "public_key": hex::encode(signing.verifying_key().as_bytes()),
        });
        server
            .mock("GET", format!("/v1/directory/{HOLDER}").as_str())
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let material = IdentityDirectory::with_base_url(&server.url())
            .resolve(HOLDER)
            .await
            .unwrap();

        assert_eq!(material, PublicKeyMaterial::Combined(signing.verifying_key()));
    }

    #[tokio::test]
    async fn test_missing_keys() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", format!("/v1/directory/{HOLDER}").as_str())
            .with_status(200)
            .with_body(r#"{"gid_uuid": "x", "name": "no keys"}"#)
            .create_async()
            .await;

        let result = IdentityDirectory::with_base_url(&server.url())
            .resolve(HOLDER)
            .await;

        assert!(matches!(
            result,
            Err(IssuerAgentError::PublicKeyNotFound { holder_id }) if holder_id == HOLDER
        ));
    }

    #[tokio::test]
    async fn test_unknown_identity() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", format!("/v1/directory/{HOLDER}").as_str())
            .with_status(404)
            .create_async()
            .await;

        let result = IdentityDirectory::with_base_url(&server.url())
            .resolve(HOLDER)
            .await;

        assert!(matches!(
            result,
            Err(IssuerAgentError::IdentityNotFound { .. })
        ));
    }

    #[test]
    fn test_encryption_key_wins_over_combined() {
        let combined = SigningKey::generate(&mut OsRng);
        let encryption = EncryptionSecret::generate();
        let identity = Identity {
            public_key: Some(hex::encode(combined.verifying_key().as_bytes())),
            public_signing_key: None,
            public_encryption_key: Some(hex::encode(encryption.public_key().as_bytes())),
        };

        let material = identity.key_material(HOLDER).unwrap();

        assert_eq!(material.signing_key(), &combined.verifying_key());
        assert_eq!(material.encryption_key(), encryption.public_key());
    }

    #[test]
    fn test_signing_key_wins_over_combined() {
        let combined = SigningKey::generate(&mut OsRng);
        let signing = SigningKey::generate(&mut OsRng);
        let identity = Identity {
            public_key: Some(hex::encode(combined.verifying_key().as_bytes())),
            public_signing_key: Some(hex::encode(signing.verifying_key().as_bytes())),
            public_encryption_key: None,
        };

        let material = identity.key_material(HOLDER).unwrap();

        assert_eq!(material.signing_key(), &signing.verifying_key());
        assert_eq!(
            material.encryption_key(),
            EncryptionSecret::from_signing_key(&combined).public_key()
        );
    }

    #[test]
    fn test_lone_signing_key_serves_both_roles() {
        let signing = SigningKey::generate(&mut OsRng);
        let identity = Identity {
            public_key: None,
            public_signing_key: Some(hex::encode(signing.verifying_key().as_bytes())),
            public_encryption_key: None,
        };

        assert_eq!(
            identity.key_material(HOLDER).unwrap(),
            PublicKeyMaterial::Combined(signing.verifying_key())
        );
    }

    #[test]
    fn test_encryption_key_alone_is_not_enough() {
        let identity = Identity {
            public_key: None,
            public_signing_key: None,
            public_encryption_key: Some(hex::encode(
                EncryptionSecret::generate().public_key().as_bytes(),
            )),
        };

        assert!(matches!(
            identity.key_material(HOLDER),
            Err(IssuerAgentError::PublicKeyNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_combined_key_with_encryption_override() {
        let mut server = Server::new_async().await;
        let combined = SigningKey::generate(&mut OsRng);
        let encryption = EncryptionSecret::generate();
        let body = serde_json::json!({
            "gid_uuid": HOLDER,
            "public_key": hex::encode(combined.verifying_key().as_bytes()),
            "public_encryption_key": hex::encode(encryption.public_key().as_bytes()),
        });
        server
            .mock("GET", format!("/v1/directory/{HOLDER}").as_str())
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let material = IdentityDirectory::with_base_url(&server.url())
            .resolve(HOLDER)
            .await
            .unwrap();

        assert_eq!(
            material,
            PublicKeyMaterial::Split {
                signing: combined.verifying_key(),
                encryption: encryption.public_key(),
            }
        );
    }
}
