//! Resolved credentials.

use std::sync::{Arc, Weak};

use saml_crypto::{Certificate, PublicKey};

use crate::types::{EncryptionMethod, KeyDescriptor, RoleDescriptor, UsageType};

/// Provenance of a credential resolved from metadata.
///
/// Links back to the key descriptor and role it was resolved from without
/// keeping either alive.
#[derive(Debug, Clone)]
pub struct MetadataCredentialContext {
    key_descriptor: Weak<KeyDescriptor>,
    role: Weak<RoleDescriptor>,
}

impl MetadataCredentialContext {
    /// Creates a context for a key descriptor within a role.
    #[must_use]
    pub fn new(key_descriptor: &Arc<KeyDescriptor>, role: &Arc<RoleDescriptor>) -> Self {
        Self {
            key_descriptor: Arc::downgrade(key_descriptor),
            role: Arc::downgrade(role),
        }
    }

    /// Returns the originating key descriptor, if still alive.
    #[must_use]
    pub fn key_descriptor(&self) -> Option<Arc<KeyDescriptor>> {
        self.key_descriptor.upgrade()
    }

    /// Returns the originating role, if still alive.
    #[must_use]
    pub fn role(&self) -> Option<Arc<RoleDescriptor>> {
        self.role.upgrade()
    }

    /// Returns the encryption methods declared on the key descriptor.
    #[must_use]
    pub fn encryption_methods(&self) -> Vec<EncryptionMethod> {
        self.key_descriptor()
            .map(|kd| kd.encryption_methods().to_vec())
            .unwrap_or_default()
    }
}

/// A usable public key plus usage and provenance.
#[derive(Debug, Clone)]
pub struct Credential {
    entity_id: Option<String>,
    usage: UsageType,
    key_names: Vec<String>,
    public_key: PublicKey,
    entity_certificate: Option<Certificate>,
    certificates: Vec<Certificate>,
    crls: Vec<Vec<u8>>,
    context: Option<MetadataCredentialContext>,
}

impl Credential {
    /// Creates a credential around a bare public key.
    #[must_use]
    pub const fn from_public_key(public_key: PublicKey) -> Self {
        Self {
            entity_id: None,
            usage: UsageType::Unspecified,
            key_names: Vec::new(),
            public_key,
            entity_certificate: None,
            certificates: Vec::new(),
            crls: Vec::new(),
            context: None,
        }
    }

    /// Creates a credential from an entity certificate and its chain. The
    /// entity certificate is also the first element of the chain.
    #[must_use]
    pub fn from_certificate(entity_certificate: Certificate, chain: Vec<Certificate>) -> Self {
        let public_key = entity_certificate.public_key().clone();
        let mut certificates = Vec::with_capacity(chain.len() + 1);
        certificates.push(entity_certificate.clone());
        certificates.extend(chain);

        Self {
            entity_id: None,
            usage: UsageType::Unspecified,
            key_names: Vec::new(),
            public_key,
            entity_certificate: Some(entity_certificate),
            certificates,
            crls: Vec::new(),
            context: None,
        }
    }

    /// Sets the owning entity ID.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the usage.
    #[must_use]
    pub fn with_usage(mut self, usage: UsageType) -> Self {
        self.usage = usage;
        self
    }

    /// Sets the key names.
    #[must_use]
    pub fn with_key_names(mut self, names: Vec<String>) -> Self {
        self.key_names = names;
        self
    }

    /// Sets the CRLs (DER).
    #[must_use]
    pub fn with_crls(mut self, crls: Vec<Vec<u8>>) -> Self {
        self.crls = crls;
        self
    }

    /// Attaches provenance.
    #[must_use]
    pub fn with_context(mut self, context: MetadataCredentialContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the owning entity ID.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Returns the usage.
    #[must_use]
    pub const fn usage(&self) -> UsageType {
        self.usage
    }

    /// Returns the key names.
    #[must_use]
    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    /// Returns the public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Returns the entity certificate, for X.509 credentials.
    #[must_use]
    pub const fn entity_certificate(&self) -> Option<&Certificate> {
        self.entity_certificate.as_ref()
    }

    /// Returns the certificate chain, entity certificate first.
    #[must_use]
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Returns the CRLs (DER).
    #[must_use]
    pub fn crls(&self) -> &[Vec<u8>] {
        &self.crls
    }

    /// Returns the provenance, for credentials resolved from metadata.
    #[must_use]
    pub const fn context(&self) -> Option<&MetadataCredentialContext> {
        self.context.as_ref()
    }
}
