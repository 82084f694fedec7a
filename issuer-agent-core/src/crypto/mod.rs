//! Hybrid encryption for files attached to credential offers.
//!
//! Two mutually exclusive strategies exist, picked when the cipher is built:
//!
//! - [`KeyWrapCipher`]: a random 256-bit key encrypts the payload and is
//!   handed out either as plaintext hex or sealed to the recipient's X25519 key.
//!   Only the recipient's public key is needed to encrypt.
//! - [`KeyAgreementCipher`]: the payload key is the X25519 shared secret of the
//!   two parties. Both key pairs must be known up front and nothing but the
//!   ciphertext is transmitted.
//!
//! Payloads are encrypted with XChaCha20-Poly1305; see [`symmetric`].

mod checksum;
mod key_agreement;
mod key_wrap;
pub mod symmetric;

pub use checksum::{checksum_matches, sha512sum};
pub use key_agreement::KeyAgreementCipher;
pub use key_wrap::{unwrap_key, wrap_key, KeyWrapCipher};
pub use symmetric::SymmetricKey;

use crate::error::{IssuerAgentError, Result};

/// Output of [`HybridCipher::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionEnvelope {
    /// Encrypted payload (`nonce || ciphertext || tag`).
    pub ciphertext: Vec<u8>,
    /// The payload key as produced by the key-wrap strategy; `None` under key agreement.
    pub wrapped_key: Option<String>,
}

/// A hybrid encryption strategy selected at construction time.
#[derive(Debug, Clone)]
pub enum HybridCipher {
    /// Random key, optionally wrapped for the recipient.
    KeyWrap(KeyWrapCipher),
    /// Key derived from both parties' X25519 keys.
    KeyAgreement(KeyAgreementCipher),
}

impl HybridCipher {
    /// Encrypts `plaintext`.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying primitives.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptionEnvelope> {
        match self {
            Self::KeyWrap(cipher) => {
                let (ciphertext, wrapped_key) = cipher.encrypt(plaintext)?;
                Ok(EncryptionEnvelope {
                    ciphertext,
                    wrapped_key: Some(wrapped_key),
                })
            }
            Self::KeyAgreement(cipher) => Ok(EncryptionEnvelope {
                ciphertext: cipher.encrypt(plaintext)?,
                wrapped_key: None,
            }),
        }
    }

    /// Decrypts an envelope produced by [`HybridCipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] when a key-wrap envelope has
    /// no key, and propagates errors from the underlying primitives.
    pub fn decrypt(&self, envelope: &EncryptionEnvelope) -> Result<Vec<u8>> {
        match self {
            Self::KeyWrap(cipher) => {
                let wrapped_key = envelope.wrapped_key.as_deref().ok_or_else(|| {
                    IssuerAgentError::invalid_input("decryption_key", "missing for key-wrap cipher")
                })?;
                cipher.decrypt(&envelope.ciphertext, wrapped_key)
            }
            Self::KeyAgreement(cipher) => cipher.decrypt(&envelope.ciphertext),
        }
    }
}
