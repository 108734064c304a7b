//! # saml-crypto
//!
//! Cryptographic helpers for SAML metadata processing, built on aws-lc-rs
//! and x509-parser.
//!
//! ## Scope
//!
//! - Digests used by the metadata layer: SHA-256 for change detection and
//!   the legacy SHA-1 digest that SAML artifacts use to identify an issuer
//!   (the *SourceID*)
//! - Decoding of base64 encoded key material found in `KeyInfo`
//! - Parsing of X.509 certificates and `SubjectPublicKeyInfo` structures
//!
//! Signature creation and verification are not part of this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod cert;
pub mod error;
pub mod hash;

pub use algorithm::KeyAlgorithm;
pub use cert::{decode_base64, validate_crl_der, Certificate, PublicKey};
pub use error::{CryptoError, CryptoResult};
pub use hash::{sha256, source_id, SOURCE_ID_LEN};
