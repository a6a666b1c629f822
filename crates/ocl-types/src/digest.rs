//! Digest computation and verification on top of [`oci_spec::image::Digest`].
//!
//! Any registered algorithm parses and round-trips unchanged. New content is
//! always addressed with SHA-256; existing content can be verified with
//! SHA-256, SHA-384 or SHA-512.

use oci_spec::image::{Digest, DigestAlgorithm};
use sha2::{Digest as _, Sha256, Sha384, Sha512};

use crate::error::TypeError;

/// Parse an `algorithm:encoded` digest string.
pub fn parse(s: &str) -> Result<Digest, TypeError> {
    s.parse().map_err(|e| TypeError::InvalidDigest {
        digest: s.to_string(),
        reason: format!("{e}"),
    })
}

/// The SHA-256 digest of `data`, the address new blobs are stored under.
pub fn sha256(data: &[u8]) -> Result<Digest, TypeError> {
    parse(&format!("sha256:{}", hex::encode(Sha256::digest(data))))
}

/// Hex encoding of `data` hashed with `algorithm`.
pub fn encode(algorithm: &DigestAlgorithm, data: &[u8]) -> Result<String, TypeError> {
    match algorithm {
        DigestAlgorithm::Sha256 => Ok(hex::encode(Sha256::digest(data))),
        DigestAlgorithm::Sha384 => Ok(hex::encode(Sha384::digest(data))),
        DigestAlgorithm::Sha512 => Ok(hex::encode(Sha512::digest(data))),
        other => Err(TypeError::UnsupportedAlgorithm(other.to_string())),
    }
}

/// Returns `Ok(true)` if `data` hashes to `digest`.
pub fn verify(digest: &Digest, data: &[u8]) -> Result<bool, TypeError> {
    Ok(encode(digest.algorithm(), data)? == digest.digest())
}

/// First 12 characters of the encoded part, as shown by most container
/// tooling.
pub fn short_hex(digest: &Digest) -> &str {
    let encoded = digest.digest();
    &encoded[..encoded.len().min(12)]
}
