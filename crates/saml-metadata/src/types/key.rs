//! Key descriptors and `KeyInfo` material.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::memo::MemoCell;
use crate::security::Credential;

/// Declared use of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    /// Signing and signature verification.
    Signing,
    /// Encryption and decryption.
    Encryption,
    /// No declared use; usable for anything.
    #[default]
    Unspecified,
}

impl UsageType {
    /// Maps the metadata `use` attribute to a usage. Absent or unknown values
    /// are unspecified.
    #[must_use]
    pub fn from_use_attribute(value: Option<&str>) -> Self {
        match value {
            Some("signing") => Self::Signing,
            Some("encryption") => Self::Encryption,
            _ => Self::Unspecified,
        }
    }

    /// Returns the metadata `use` attribute value, if any.
    #[must_use]
    pub const fn use_attribute(self) -> Option<&'static str> {
        match self {
            Self::Signing => Some("signing"),
            Self::Encryption => Some("encryption"),
            Self::Unspecified => None,
        }
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Signing => "signing",
            Self::Encryption => "encryption",
            Self::Unspecified => "unspecified",
        })
    }
}

/// Contents of a `ds:KeyInfo` element, with binary material still base64
/// encoded as it appears in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyInfo {
    /// `ds:KeyName` values.
    pub key_names: Vec<String>,
    /// `ds:X509Certificate` values, entity certificate first.
    pub x509_certificates: Vec<String>,
    /// `ds:X509CRL` values.
    pub x509_crls: Vec<String>,
    /// `ds:DEREncodedKeyValue` values (SubjectPublicKeyInfo DER).
    pub der_public_keys: Vec<String>,
}

impl KeyInfo {
    /// Creates an empty `KeyInfo`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key name.
    #[must_use]
    pub fn with_key_name(mut self, name: impl Into<String>) -> Self {
        self.key_names.push(name.into());
        self
    }

    /// Adds a base64 encoded certificate.
    #[must_use]
    pub fn with_certificate(mut self, cert_b64: impl Into<String>) -> Self {
        self.x509_certificates.push(cert_b64.into());
        self
    }

    /// Adds a base64 encoded CRL.
    #[must_use]
    pub fn with_crl(mut self, crl_b64: impl Into<String>) -> Self {
        self.x509_crls.push(crl_b64.into());
        self
    }

    /// Adds a base64 encoded SubjectPublicKeyInfo.
    #[must_use]
    pub fn with_der_public_key(mut self, spki_b64: impl Into<String>) -> Self {
        self.der_public_keys.push(spki_b64.into());
        self
    }

    /// Returns true if there is no key material at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_names.is_empty()
            && self.x509_certificates.is_empty()
            && self.x509_crls.is_empty()
            && self.der_public_keys.is_empty()
    }
}

/// An `md:EncryptionMethod` annotation on a key descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionMethod {
    /// Algorithm URI.
    pub algorithm: String,
    /// Optional `xenc:KeySize`.
    pub key_size: Option<u32>,
    /// Optional `xenc:OAEPparams`, base64.
    pub oaep_params: Option<String>,
    /// Optional `xenc11:MGF` algorithm URI.
    pub mgf: Option<String>,
    /// Optional `ds:DigestMethod` algorithm URI.
    pub digest_method: Option<String>,
}

impl EncryptionMethod {
    /// Creates an annotation for the given algorithm.
    #[must_use]
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_size: None,
            oaep_params: None,
            mgf: None,
            digest_method: None,
        }
    }

    /// Sets the key size.
    #[must_use]
    pub const fn with_key_size(mut self, key_size: u32) -> Self {
        self.key_size = Some(key_size);
        self
    }

    /// Sets the digest method.
    #[must_use]
    pub fn with_digest_method(mut self, digest: impl Into<String>) -> Self {
        self.digest_method = Some(digest.into());
        self
    }
}

/// An `md:KeyDescriptor`.
///
/// Besides the metadata content, each key descriptor owns the cache of
/// credentials resolved from its `KeyInfo`. The cache lives exactly as long
/// as this instance; a metadata refresh builds new descriptors and so starts
/// with empty caches.
pub struct KeyDescriptor {
    usage: UsageType,
    key_info: KeyInfo,
    encryption_methods: Vec<EncryptionMethod>,
    credentials: MemoCell<Vec<Arc<Credential>>>,
}

impl KeyDescriptor {
    /// Creates a key descriptor.
    #[must_use]
    pub const fn new(usage: UsageType, key_info: KeyInfo) -> Self {
        Self {
            usage,
            key_info,
            encryption_methods: Vec::new(),
            credentials: MemoCell::new(),
        }
    }

    /// Adds an encryption method annotation.
    #[must_use]
    pub fn with_encryption_method(mut self, method: EncryptionMethod) -> Self {
        self.encryption_methods.push(method);
        self
    }

    /// Returns the declared usage.
    #[must_use]
    pub const fn usage(&self) -> UsageType {
        self.usage
    }

    /// Returns the `KeyInfo` payload.
    #[must_use]
    pub const fn key_info(&self) -> &KeyInfo {
        &self.key_info
    }

    /// Returns the encryption method annotations.
    #[must_use]
    pub fn encryption_methods(&self) -> &[EncryptionMethod] {
        &self.encryption_methods
    }

    /// Returns the credentials resolved for this descriptor so far, if any.
    #[must_use]
    pub fn cached_credentials(&self) -> Option<Vec<Arc<Credential>>> {
        self.credentials.get()
    }

    pub(crate) const fn credential_cache(&self) -> &MemoCell<Vec<Arc<Credential>>> {
        &self.credentials
    }
}

impl fmt::Debug for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDescriptor")
            .field("usage", &self.usage)
            .field("key_info", &self.key_info)
            .field("encryption_methods", &self.encryption_methods)
            .field("credentials_cached", &self.credentials.is_initialized())
            .finish()
    }
}
