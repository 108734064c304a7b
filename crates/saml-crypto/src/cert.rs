//! Certificate and public key material.
//!
//! `KeyInfo` elements in metadata carry base64 encoded DER. This module
//! decodes that material and extracts what credential resolution needs:
//! the subject public key, subject/issuer names and the validity window.

use base64::Engine;
use chrono::{DateTime, Utc};
use x509_parser::prelude::*;
use x509_parser::revocation_list::CertificateRevocationList;

use crate::algorithm::KeyAlgorithm;
use crate::error::{CryptoError, CryptoResult};

/// Decodes base64 text as found in XML, ignoring embedded whitespace.
///
/// # Errors
///
/// Returns [`CryptoError::Base64`] if the payload is not valid base64.
pub fn decode_base64(encoded: &str) -> CryptoResult<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}

/// A subject public key, kept as `SubjectPublicKeyInfo` DER.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    spki_der: Vec<u8>,
}

impl PublicKey {
    /// Parses a DER encoded `SubjectPublicKeyInfo`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PublicKey`] if the structure cannot be parsed.
    pub fn from_spki_der(der: &[u8]) -> CryptoResult<Self> {
        let (_, spki) = SubjectPublicKeyInfo::from_der(der)
            .map_err(|e| CryptoError::PublicKey(e.to_string()))?;
        Ok(Self {
            algorithm: KeyAlgorithm::from_oid(&spki.algorithm.algorithm.to_id_string()),
            spki_der: spki.raw.to_vec(),
        })
    }

    /// Returns the key algorithm family.
    #[must_use]
    pub const fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Returns the `SubjectPublicKeyInfo` DER.
    #[must_use]
    pub fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }
}

/// A parsed X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    serial: String,
    not_before: Option<DateTime<Utc>>,
    not_after: Option<DateTime<Utc>>,
    public_key: PublicKey,
}

impl Certificate {
    /// Parses a DER encoded certificate.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Certificate`] if the certificate cannot be parsed.
    pub fn from_der(der: Vec<u8>) -> CryptoResult<Self> {
        let (subject, issuer, serial, not_before, not_after, public_key) = {
            let (_, cert) = X509Certificate::from_der(&der)
                .map_err(|e| CryptoError::Certificate(e.to_string()))?;
            let spki = cert.public_key();
            let public_key = PublicKey {
                algorithm: KeyAlgorithm::from_oid(&spki.algorithm.algorithm.to_id_string()),
                spki_der: spki.raw.to_vec(),
            };
            let validity = cert.validity();
            (
                cert.subject().to_string(),
                cert.issuer().to_string(),
                cert.raw_serial_as_string(),
                DateTime::from_timestamp(validity.not_before.timestamp(), 0),
                DateTime::from_timestamp(validity.not_after.timestamp(), 0),
                public_key,
            )
        };

        Ok(Self {
            der,
            subject,
            issuer,
            serial,
            not_before,
            not_after,
            public_key,
        })
    }

    /// Parses a base64 encoded DER certificate, as carried by `ds:X509Certificate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not base64 or not a certificate.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        Self::from_der(decode_base64(encoded)?)
    }

    /// Returns the certificate DER.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Returns the subject distinguished name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the issuer distinguished name.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the serial number as colon separated hex.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Returns the start of the validity window.
    #[must_use]
    pub const fn not_before(&self) -> Option<DateTime<Utc>> {
        self.not_before
    }

    /// Returns the end of the validity window.
    #[must_use]
    pub const fn not_after(&self) -> Option<DateTime<Utc>> {
        self.not_after
    }

    /// Returns the subject public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// Checks that DER bytes hold a certificate revocation list.
///
/// # Errors
///
/// Returns [`CryptoError::Crl`] if the CRL cannot be parsed.
pub fn validate_crl_der(der: &[u8]) -> CryptoResult<()> {
    CertificateRevocationList::from_der(der)
        .map(|_| ())
        .map_err(|e| CryptoError::Crl(e.to_string()))
}
