//! XChaCha20-Poly1305 encryption under a 256-bit symmetric key.
//!
//! Ciphertexts are laid out as `nonce (24 bytes) || ciphertext || tag (16 bytes)`.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{IssuerAgentError, Result};

/// Size of the symmetric key in bytes.
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Size of the XChaCha20 nonce in bytes.
pub const NONCE_SIZE: usize = 24;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A 256-bit symmetric file key.
///
/// The key is zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh key from the operating system's CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SYMMETRIC_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parses a key transported as a plaintext hex string.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] on malformed hex or length.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let mut bytes = hex::decode(hex_key.trim()).map_err(|e| {
            IssuerAgentError::invalid_input("decryption_key", format!("invalid hex: {e}"))
        })?;
        if bytes.len() != SYMMETRIC_KEY_SIZE {
            let len = bytes.len();
            bytes.zeroize();
            return Err(IssuerAgentError::invalid_input(
                "decryption_key",
                format!("expected {SYMMETRIC_KEY_SIZE} bytes, got {len}"),
            ));
        }
        let mut key = [0u8; SYMMETRIC_KEY_SIZE];
        key.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(key))
    }

    /// Returns the key as a lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns a reference to the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }

    /// Encrypts `plaintext` under this key with a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::Aead`] if the AEAD rejects the input.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encrypt_with_aad(plaintext, &[])
    }

    /// Decrypts a `nonce || ciphertext` buffer produced by [`SymmetricKey::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::Crypto`] if the buffer is truncated and
    /// [`IssuerAgentError::Aead`] if authentication fails (wrong key or
    /// tampered data).
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_with_aad(ciphertext, &[])
    }

    pub(crate) fn encrypt_with_aad(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.0));

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(IssuerAgentError::Aead)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    pub(crate) fn decrypt_with_aad(&self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(IssuerAgentError::Crypto(format!(
                "ciphertext too short: {} bytes",
                ciphertext.len()
            )));
        }
        let (nonce, body) = ciphertext.split_at(NONCE_SIZE);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.0));

        cipher
            .decrypt(XNonce::from_slice(nonce), Payload { msg: body, aad })
            .map_err(IssuerAgentError::Aead)
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
