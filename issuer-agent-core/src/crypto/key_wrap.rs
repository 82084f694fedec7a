//! Random file key protected by asymmetric key wrapping.
//!
//! A fresh [`SymmetricKey`] encrypts the payload. The key itself is either
//! handed out as plaintext hex or sealed to the recipient's X25519 public key:
//!
//! 1. Generate an ephemeral X25519 key pair
//! 2. ECDH between the ephemeral secret and the recipient's public key
//! 3. Derive a wrapping key with HKDF-SHA256
//! 4. Seal the file key with XChaCha20-Poly1305
//!
//! The wrapped key is `base64(ephemeral_public || nonce || sealed_key || tag)`.

use base64::{engine::general_purpose::STANDARD, Engine};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey};
use zeroize::Zeroize;

use super::symmetric::{SymmetricKey, NONCE_SIZE, SYMMETRIC_KEY_SIZE, TAG_SIZE};
use crate::error::{IssuerAgentError, Result};
use crate::keys::{EncryptionSecret, KEY_SIZE};

/// Label for HKDF key derivation.
const HKDF_LABEL: &[u8] = b"issuer-agent:file-key-wrap";

/// Label for AEAD associated data.
const AEAD_LABEL: &[u8] = b"issuer-agent:wrapped-file-key";

/// Exact size of a decoded wrapped key.
const WRAPPED_KEY_SIZE: usize = KEY_SIZE + NONCE_SIZE + SYMMETRIC_KEY_SIZE + TAG_SIZE;

/// Key-wrap strategy: encrypt with a random key, wrap the key for the recipient.
#[derive(Debug, Clone, Default)]
pub struct KeyWrapCipher {
    recipient: Option<PublicKey>,
    private_key: Option<EncryptionSecret>,
}

impl KeyWrapCipher {
    /// A cipher that leaves the file key as plaintext hex.
    #[must_use]
    pub fn plaintext_key() -> Self {
        Self::default()
    }

    /// A cipher that seals file keys to `recipient`.
    #[must_use]
    pub const fn for_recipient(recipient: PublicKey) -> Self {
        Self {
            recipient: Some(recipient),
            private_key: None,
        }
    }

    /// Sets the private key used to unwrap sealed file keys on decryption.
    #[must_use]
    pub fn with_private_key(mut self, private_key: EncryptionSecret) -> Self {
        self.private_key = Some(private_key);
        self
    }

    /// Encrypts `plaintext` under a fresh key.
    ///
    /// Returns the ciphertext and the file key, sealed to the recipient when one
    /// is configured and plaintext hex otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::Aead`] if encryption fails and
    /// [`IssuerAgentError::Crypto`] if the recipient key is degenerate.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<(Vec<u8>, String)> {
        let key = SymmetricKey::generate();
        let ciphertext = key.encrypt(plaintext)?;
        let wrapped_key = match &self.recipient {
            Some(recipient) => wrap_key(&key, recipient)?,
            None => key.to_hex(),
        };
        Ok((ciphertext, wrapped_key))
    }

    /// Decrypts `ciphertext` with the key carried by `wrapped_key`.
    ///
    /// With a private key configured, `wrapped_key` is unwrapped first;
    /// otherwise it is read as plaintext hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be recovered or the ciphertext does
    /// not authenticate under it.
    pub fn decrypt(&self, ciphertext: &[u8], wrapped_key: &str) -> Result<Vec<u8>> {
        let key = match &self.private_key {
            Some(private_key) => unwrap_key(wrapped_key, private_key)?,
            None => SymmetricKey::from_hex(wrapped_key)?,
        };
        key.decrypt(ciphertext)
    }
}

/// Seals `key` to `recipient`.
///
/// # Errors
///
/// Returns [`IssuerAgentError::Crypto`] if the recipient key is degenerate or key
/// derivation fails, and [`IssuerAgentError::Aead`] if sealing fails.
pub fn wrap_key(key: &SymmetricKey, recipient: &PublicKey) -> Result<String> {
    let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral_secret);
    let shared_secret = ephemeral_secret.diffie_hellman(recipient);
    if !shared_secret.was_contributory() {
        return Err(IssuerAgentError::Crypto(
            "recipient key produced a non-contributory shared secret".to_string(),
        ));
    }

    let wrapping_key = derive_wrapping_key(
        shared_secret.as_bytes(),
        ephemeral_public.as_bytes(),
        recipient.as_bytes(),
    )?;
    let sealed = wrapping_key.encrypt_with_aad(key.as_bytes(), AEAD_LABEL)?;

    let mut out = Vec::with_capacity(WRAPPED_KEY_SIZE);
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&sealed);
    Ok(STANDARD.encode(out))
}

/// Recovers a key sealed by [`wrap_key`] using the recipient's private key.
///
/// # Errors
///
/// Returns [`IssuerAgentError::InvalidInput`] for malformed input and
/// [`IssuerAgentError::Aead`] if the key does not open.
pub fn unwrap_key(wrapped_key: &str, private_key: &EncryptionSecret) -> Result<SymmetricKey> {
    let decoded = STANDARD.decode(wrapped_key.trim()).map_err(|e| {
        IssuerAgentError::invalid_input("decryption_key", format!("invalid base64: {e}"))
    })?;
    if decoded.len() != WRAPPED_KEY_SIZE {
        return Err(IssuerAgentError::invalid_input(
            "decryption_key",
            format!(
                "expected {WRAPPED_KEY_SIZE} bytes, got {}",
                decoded.len()
            ),
        ));
    }

    let (ephemeral_bytes, sealed) = decoded.split_at(KEY_SIZE);
    let mut ephemeral = [0u8; KEY_SIZE];
    ephemeral.copy_from_slice(ephemeral_bytes);
    let ephemeral_public = PublicKey::from(ephemeral);

    let own_public = private_key.public_key();
    let shared_secret = private_key
        .as_static_secret()
        .diffie_hellman(&ephemeral_public);
    let wrapping_key =
        derive_wrapping_key(shared_secret.as_bytes(), &ephemeral, own_public.as_bytes())?;

    let mut key_bytes = wrapping_key.decrypt_with_aad(sealed, AEAD_LABEL)?;
    let mut key = [0u8; SYMMETRIC_KEY_SIZE];
    key.copy_from_slice(&key_bytes);
    key_bytes.zeroize();
    Ok(SymmetricKey::from_bytes(key))
}

/// Derives the wrapping key from the ECDH shared secret using HKDF.
fn derive_wrapping_key(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8; 32],
    recipient_public: &[u8; 32],
) -> Result<SymmetricKey> {
    // Info = label || ephemeral_public || recipient_public
    let mut info = Vec::with_capacity(HKDF_LABEL.len() + 64);
    info.extend_from_slice(HKDF_LABEL);
    info.extend_from_slice(ephemeral_public);
    info.extend_from_slice(recipient_public);

    let hkdf = Hkdf::<Sha256>::new(None, shared_secret);
    let mut key = [0u8; SYMMETRIC_KEY_SIZE];
    hkdf.expand(&info, &mut key)
        .map_err(|_| IssuerAgentError::Crypto("HKDF expansion failed".to_string()))?;

    Ok(SymmetricKey::from_bytes(key))
}
