//! Credential-exchange protocol layer for issuers.
//!
//! An issuer uses this crate to
//!
//! * validate holder-signed [`CredentialRequest`]s (signature and timestamp
//!   window), reporting failures to the exchange service,
//! * encrypt files for a holder and describe them as [`FileClaim`]s,
//! * download files back with decryption and checksum verification,
//! * deliver [`CredentialOffer`]s, riding out the window in which the
//!   exchange record is not yet visible.
//!
//! [`IssuerClient`] wires these together over HTTP. Each component can also be
//! used on its own with custom implementations of the traits in [`traits`].
#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]

mod client;
pub use client::{FileObject, IssuerClient, IssuerClientParts};

mod config;
pub use config::*;

mod error;
pub use error::*;

mod error_code;
pub use error_code::ErrorCode;

mod request;
pub use request::CredentialRequest;

mod offer;
pub use offer::*;

pub mod crypto;
pub mod dispatch;
pub mod download;
pub mod keys;
/// Forwarding of this crate's `log` records to a host-provided logger.
pub mod logger;
pub mod services;
pub mod signature;
pub mod timestamp;
pub mod traits;
pub mod validation;

// private modules
mod http_request;
