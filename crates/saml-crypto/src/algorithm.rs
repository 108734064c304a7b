//! Algorithm identifiers.

use serde::{Deserialize, Serialize};

/// Public key algorithm families found in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    /// RSA (`rsaEncryption`).
    Rsa,
    /// Elliptic curve (`id-ecPublicKey`).
    Ec,
    /// Ed25519.
    Ed25519,
    /// Anything else, identified by its dotted OID.
    Other,
}

impl KeyAlgorithm {
    /// Maps a dotted algorithm OID to a key family.
    #[must_use]
    pub fn from_oid(oid: &str) -> Self {
        match oid {
            "1.2.840.113549.1.1.1" => Self::Rsa,
            "1.2.840.10045.2.1" => Self::Ec,
            "1.3.101.112" => Self::Ed25519,
            _ => Self::Other,
        }
    }
}
