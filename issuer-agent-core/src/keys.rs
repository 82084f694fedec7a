//! Holder key material and issuer-side encryption secrets.
//!
//! Holder identities expose either one combined Ed25519 key or a split pair of
//! an Ed25519 signing key and an X25519 encryption key. The topology is
//! resolved once, when the key material is built, so signature checks and
//! encryption only ever ask for "the signing key" or "the encryption key".
//!
//! Keys travel as 64-character hex strings.

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{IssuerAgentError, Result};

/// Size of Ed25519 and X25519 public and secret keys.
pub const KEY_SIZE: usize = 32;

/// Public key material associated with a holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyMaterial {
    /// A single Ed25519 key used for signing and, through its Montgomery form, for encryption.
    Combined(VerifyingKey),
    /// Distinct signing and encryption keys.
    Split {
        /// Ed25519 key the holder signs requests with.
        signing: VerifyingKey,
        /// X25519 key files for the holder are encrypted to.
        encryption: PublicKey,
    },
}

impl PublicKeyMaterial {
    /// Builds combined key material from a hex-encoded Ed25519 public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not valid hex or not a valid Ed25519 point.
    pub fn combined_from_hex(public_key: &str) -> Result<Self> {
        Ok(Self::Combined(parse_signing_key(public_key)?))
    }

    /// Builds split key material from hex-encoded signing and encryption keys.
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be parsed.
    pub fn split_from_hex(signing: &str, encryption: &str) -> Result<Self> {
        Ok(Self::Split {
            signing: parse_signing_key(signing)?,
            encryption: parse_encryption_key(encryption)?,
        })
    }

    /// Returns the key request signatures are verified against.
    #[must_use]
    pub const fn signing_key(&self) -> &VerifyingKey {
        match self {
            Self::Combined(key) | Self::Split { signing: key, .. } => key,
        }
    }

    /// Returns the key files for this holder are encrypted to.
    #[must_use]
    pub fn encryption_key(&self) -> PublicKey {
        match self {
            Self::Combined(key) => PublicKey::from(key.to_montgomery().to_bytes()),
            Self::Split { encryption, .. } => *encryption,
        }
    }
}

/// Parses a hex-encoded Ed25519 public key.
///
/// # Errors
///
/// Returns [`IssuerAgentError::InvalidInput`] on malformed hex or length, and
/// [`IssuerAgentError::Ed25519`] when the bytes are not a valid curve point.
pub fn parse_signing_key(hex_key: &str) -> Result<VerifyingKey> {
    let bytes = decode_key("public_signing_key", hex_key)?;
    Ok(VerifyingKey::from_bytes(&bytes)?)
}

/// Parses a hex-encoded X25519 public key.
///
/// # Errors
///
/// Returns [`IssuerAgentError::InvalidInput`] on malformed hex or length.
pub fn parse_encryption_key(hex_key: &str) -> Result<PublicKey> {
    Ok(PublicKey::from(decode_key("public_encryption_key", hex_key)?))
}

fn decode_key(attribute: &str, hex_key: &str) -> Result<[u8; KEY_SIZE]> {
    let bytes = hex::decode(hex_key.trim())
        .map_err(|e| IssuerAgentError::invalid_input(attribute, format!("invalid hex: {e}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        IssuerAgentError::invalid_input(
            attribute,
            format!("expected {KEY_SIZE} bytes, got {}", bytes.len()),
        )
    })
}

/// An X25519 secret key held by the issuer (or, in tests, by a holder).
///
/// Zeroized on drop through [`StaticSecret`].
#[derive(Clone)]
pub struct EncryptionSecret(StaticSecret);

impl EncryptionSecret {
    /// Generates a new random secret.
    #[must_use]
    pub fn generate() -> Self {
        Self(StaticSecret::random_from_rng(OsRng))
    }

    /// Creates a secret from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Parses a hex-encoded secret.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerAgentError::InvalidInput`] on malformed hex or length.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        Ok(Self::from_bytes(decode_key("private_key", hex_key)?))
    }

    /// Derives the X25519 secret matching an Ed25519 key's Montgomery form.
    ///
    /// This is the secret counterpart of [`PublicKeyMaterial::Combined`].
    #[must_use]
    pub fn from_signing_key(signing_key: &SigningKey) -> Self {
        Self::from_bytes(signing_key.to_scalar_bytes())
    }

    /// Returns the matching public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(&self.0)
    }

    pub(crate) const fn as_static_secret(&self) -> &StaticSecret {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionSecret")
            .field("secret", &"[REDACTED]")
            .field("public", &hex::encode(self.public_key().as_bytes()))
            .finish()
    }
}
