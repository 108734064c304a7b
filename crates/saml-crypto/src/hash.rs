//! Hash functions.
//!
//! SHA-1 is exposed only for the SAML artifact SourceID, which the SAML
//! bindings define as the SHA-1 digest of the issuer's entity ID.

use aws_lc_rs::digest;

/// Length in bytes of a SAML artifact SourceID.
pub const SOURCE_ID_LEN: usize = 20;

/// Computes a SHA-256 digest.
#[must_use]
pub fn sha256(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA256, data).as_ref().to_vec()
}

/// Computes the artifact SourceID for an entity ID.
#[must_use]
pub fn source_id(entity_id: &str) -> [u8; SOURCE_ID_LEN] {
    let mut out = [0u8; SOURCE_ID_LEN];
    let sum = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, entity_id.as_bytes());
    out.copy_from_slice(sum.as_ref());
    out
}
