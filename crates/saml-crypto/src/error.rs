//! Error types for cryptographic helpers.

use thiserror::Error;

/// Result type for cryptographic helpers.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised while decoding or parsing key material.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Base64 payload could not be decoded.
    #[error("base64 decode error: {0}")]
    Base64(String),

    /// X.509 certificate could not be parsed.
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// SubjectPublicKeyInfo could not be parsed.
    #[error("invalid public key: {0}")]
    PublicKey(String),

    /// Certificate revocation list could not be parsed.
    #[error("invalid CRL: {0}")]
    Crl(String),
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err.to_string())
    }
}
