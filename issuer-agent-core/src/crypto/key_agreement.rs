//! File key agreed through X25519 Diffie-Hellman.
//!
//! Both parties derive the same shared secret from their own secret key and
//! the other party's public key; the secret is the symmetric file key. No key
//! artifact travels with the ciphertext.

use x25519_dalek::PublicKey;

use super::symmetric::SymmetricKey;
use crate::error::{IssuerAgentError, Result};
use crate::keys::EncryptionSecret;

/// Key-agreement strategy bound to one pair of parties.
#[derive(Debug, Clone)]
pub struct KeyAgreementCipher {
    own_secret: EncryptionSecret,
    peer_public: PublicKey,
}

impl KeyAgreementCipher {
    /// Creates a cipher between `own_secret` and the peer's `peer_public` key.
    #[must_use]
    pub const fn new(own_secret: EncryptionSecret, peer_public: PublicKey) -> Self {
        Self {
            own_secret,
            peer_public,
        }
    }

    /// Encrypts `plaintext` under the shared key.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::Crypto`] if the peer key is degenerate and
    /// [`IssuerAgentError::Aead`] if encryption fails.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.shared_key()?.encrypt(plaintext)
    }

    /// Decrypts `ciphertext` under the shared key.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::Crypto`] if the peer key is degenerate and
    /// [`IssuerAgentError::Aead`] if the ciphertext does not authenticate.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.shared_key()?.decrypt(ciphertext)
    }

    fn shared_key(&self) -> Result<SymmetricKey> {
        let shared_secret = self
            .own_secret
            .as_static_secret()
            .diffie_hellman(&self.peer_public);
        if !shared_secret.was_contributory() {
            return Err(IssuerAgentError::Crypto(
                "peer key produced a non-contributory shared secret".to_string(),
            ));
        }
        Ok(SymmetricKey::from_bytes(*shared_secret.as_bytes()))
    }
}
