//! Role descriptors.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};

use super::{Endpoint, EntityDescriptor, KeyDescriptor, QName, UsageType};

/// A role (IdP SSO, SP SSO, attribute authority, ...) advertised by an entity.
///
/// Published role descriptors are immutable and hold a non-owning link to
/// the entity they belong to.
#[derive(Debug)]
pub struct RoleDescriptor {
    element: QName,
    schema_type: Option<QName>,
    protocols: Vec<String>,
    valid_until: Option<DateTime<Utc>>,
    error_url: Option<String>,
    want_authn_requests_signed: Option<bool>,
    key_descriptors: Vec<Arc<KeyDescriptor>>,
    endpoints: Vec<Arc<Endpoint>>,
    source_ids: Vec<String>,
    parent: Weak<EntityDescriptor>,
}

impl RoleDescriptor {
    /// Returns the element name (for example `md:SPSSODescriptor`).
    #[must_use]
    pub const fn element(&self) -> &QName {
        &self.element
    }

    /// Returns the `xsi:type`, if any.
    #[must_use]
    pub const fn schema_type(&self) -> Option<&QName> {
        self.schema_type.as_ref()
    }

    /// Returns the role's type tag: the schema type when present, otherwise
    /// the element name.
    #[must_use]
    pub fn role_type(&self) -> &QName {
        self.schema_type.as_ref().unwrap_or(&self.element)
    }

    /// Returns true if the element name or the schema type equals `role`.
    #[must_use]
    pub fn is_of_type(&self, role: &QName) -> bool {
        &self.element == role || self.schema_type.as_ref() == Some(role)
    }

    /// Returns the `protocolSupportEnumeration` entries.
    #[must_use]
    pub fn supported_protocols(&self) -> &[String] {
        &self.protocols
    }

    /// Returns true if `protocol` is listed in `protocolSupportEnumeration`.
    #[must_use]
    pub fn supports_protocol(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|p| p == protocol)
    }

    /// Returns the `validUntil` instant.
    #[must_use]
    pub const fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    /// Returns the `errorURL`.
    #[must_use]
    pub fn error_url(&self) -> Option<&str> {
        self.error_url.as_deref()
    }

    /// Returns `WantAuthnRequestsSigned` (IdP) or `AuthnRequestsSigned` (SP).
    #[must_use]
    pub const fn want_authn_requests_signed(&self) -> Option<bool> {
        self.want_authn_requests_signed
    }

    /// Returns the key descriptors in document order.
    #[must_use]
    pub fn key_descriptors(&self) -> &[Arc<KeyDescriptor>] {
        &self.key_descriptors
    }

    /// Returns the key descriptors whose usage matches `usage`.
    pub fn key_descriptors_for_usage(
        &self,
        usage: UsageType,
    ) -> impl Iterator<Item = &Arc<KeyDescriptor>> + '_ {
        self.key_descriptors
            .iter()
            .filter(move |kd| crate::security::match_usage(kd.usage(), usage))
    }

    /// Returns all endpoints in document order.
    #[must_use]
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    /// Returns the endpoints of the given type in document order.
    pub fn endpoints_of_type<'a>(
        &'a self,
        endpoint_type: &'a QName,
    ) -> impl Iterator<Item = &'a Arc<Endpoint>> + 'a {
        self.endpoints
            .iter()
            .filter(move |e| e.endpoint_type() == endpoint_type)
    }

    /// Returns explicit SAML 1.x `SourceID` extension values (hex).
    #[must_use]
    pub fn source_ids(&self) -> &[String] {
        &self.source_ids
    }

    /// Returns the owning entity, if it is still alive.
    #[must_use]
    pub fn entity(&self) -> Option<Arc<EntityDescriptor>> {
        self.parent.upgrade()
    }

    /// Returns the owning entity's ID.
    #[must_use]
    pub fn entity_id(&self) -> Option<String> {
        self.entity().map(|e| e.entity_id().to_string())
    }
}

/// Mutable, unpublished form of a [`RoleDescriptor`].
#[derive(Debug)]
pub struct RoleDescriptorBuilder {
    /// Element name.
    pub element: QName,
    /// Optional `xsi:type`.
    pub schema_type: Option<QName>,
    /// `protocolSupportEnumeration` entries.
    pub protocols: Vec<String>,
    /// `validUntil`.
    pub valid_until: Option<DateTime<Utc>>,
    /// `errorURL`.
    pub error_url: Option<String>,
    /// `WantAuthnRequestsSigned` / `AuthnRequestsSigned`.
    pub want_authn_requests_signed: Option<bool>,
    /// Key descriptors.
    pub key_descriptors: Vec<KeyDescriptor>,
    /// Endpoints.
    pub endpoints: Vec<Endpoint>,
    /// SAML 1.x `SourceID` extension values (hex).
    pub source_ids: Vec<String>,
}

impl RoleDescriptorBuilder {
    /// Starts a role of the given element type.
    #[must_use]
    pub const fn new(element: QName) -> Self {
        Self {
            element,
            schema_type: None,
            protocols: Vec::new(),
            valid_until: None,
            error_url: None,
            want_authn_requests_signed: None,
            key_descriptors: Vec::new(),
            endpoints: Vec::new(),
            source_ids: Vec::new(),
        }
    }

    /// Sets the `xsi:type`.
    #[must_use]
    pub fn with_schema_type(mut self, schema_type: QName) -> Self {
        self.schema_type = Some(schema_type);
        self
    }

    /// Adds a supported protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Parses a whitespace separated `protocolSupportEnumeration`.
    #[must_use]
    pub fn with_protocol_enumeration(mut self, enumeration: &str) -> Self {
        self.protocols
            .extend(enumeration.split_whitespace().map(str::to_string));
        self
    }

    /// Sets `validUntil`.
    #[must_use]
    pub const fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Sets `errorURL`.
    #[must_use]
    pub fn with_error_url(mut self, url: impl Into<String>) -> Self {
        self.error_url = Some(url.into());
        self
    }

    /// Sets `WantAuthnRequestsSigned` / `AuthnRequestsSigned`.
    #[must_use]
    pub const fn with_want_authn_requests_signed(mut self, signed: bool) -> Self {
        self.want_authn_requests_signed = Some(signed);
        self
    }

    /// Adds a key descriptor.
    #[must_use]
    pub fn with_key_descriptor(mut self, key_descriptor: KeyDescriptor) -> Self {
        self.key_descriptors.push(key_descriptor);
        self
    }

    /// Adds an endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Adds a SAML 1.x `SourceID` extension value.
    #[must_use]
    pub fn with_source_id(mut self, source_id_hex: impl Into<String>) -> Self {
        self.source_ids.push(source_id_hex.into());
        self
    }

    /// Publishes a free-standing role with no owning entity.
    #[must_use]
    pub fn build(self) -> Arc<RoleDescriptor> {
        Arc::new(self.into_role(Weak::new()))
    }

    pub(crate) fn build_in(self, parent: Weak<EntityDescriptor>) -> Arc<RoleDescriptor> {
        Arc::new(self.into_role(parent))
    }

    fn into_role(self, parent: Weak<EntityDescriptor>) -> RoleDescriptor {
        RoleDescriptor {
            element: self.element,
            schema_type: self.schema_type,
            protocols: self.protocols,
            valid_until: self.valid_until,
            error_url: self.error_url,
            want_authn_requests_signed: self.want_authn_requests_signed,
            key_descriptors: self.key_descriptors.into_iter().map(Arc::new).collect(),
            endpoints: self.endpoints.into_iter().map(Arc::new).collect(),
            source_ids: self.source_ids,
            parent,
        }
    }
}
