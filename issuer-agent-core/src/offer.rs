//! Credential offers and the claims they carry.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};

/// A proposal of claims to be issued to a holder on a credential thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialOffer {
    /// Thread ID received from the holder.
    pub thread_id: String,
    /// Name of the credential being offered.
    pub name: String,
    /// Descriptive text about the credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// IRI of a JSON-LD context describing the credential subject.
    pub context_iri: String,
    /// JSON-LD `@type` of the credential subject.
    pub subject_type: String,
    /// Claims about the credential subject.
    pub claims: BTreeMap<String, ClaimValue>,
}

/// Value of a single claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    /// An encrypted file, see [`FileClaim`].
    File(FileClaim),
    /// A primitive value with an explicit type.
    Typed {
        /// Declared type of `value`.
        #[serde(rename = "type")]
        value_type: ClaimValueType,
        /// The claim value.
        value: Value,
    },
}

/// Types of primitive claim values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimValueType {
    /// `true` / `false`.
    Boolean,
    /// Whole number.
    Integer,
    /// Any number.
    Number,
    /// Free text.
    String,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    DateTime,
}

/// Media types of files that can be attached to an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, Serialize, Deserialize)]
pub enum MediaType {
    /// JPEG image.
    #[strum(serialize = "image/jpeg")]
    #[serde(rename = "image/jpeg")]
    Jpeg,
    /// PNG image.
    #[strum(serialize = "image/png")]
    #[serde(rename = "image/png")]
    Png,
}

/// What a holder needs to retrieve and decrypt an attached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileClaim {
    /// File key, plaintext hex or wrapped for the holder.
    pub decryption_key: String,
    /// Media type of the decrypted content.
    #[serde(alias = "content_type")]
    pub media_type: MediaType,
    /// Lowercase hex SHA-512 of the decrypted content.
    pub sha_512_sum: String,
    /// Where the ciphertext is served from.
    pub url: String,
}
