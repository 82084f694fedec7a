//! SHA-512 checksums for file integrity.
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Computes the lowercase hex SHA-512 digest of `data`.
#[must_use]
pub fn sha512sum(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// Compares `data` against an expected hex checksum in constant time.
///
/// Hex case in `expected` is ignored.
#[must_use]
pub fn checksum_matches(expected: &str, data: &[u8]) -> bool {
    let expected = expected.trim().to_ascii_lowercase();
    let actual = sha512sum(data);
    expected.as_bytes().ct_eq(actual.as_bytes()).into()
}
