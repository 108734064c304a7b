//! Metadata endpoints.

use super::{QName, SamlBinding};

/// Index attributes carried by indexed endpoint types
/// (`AssertionConsumerService`, `ArtifactResolutionService`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointIndex {
    /// The `index` attribute.
    pub index: u16,
    /// The `isDefault` attribute: `Some(true)`, `Some(false)` or absent.
    pub is_default: Option<bool>,
}

/// A (binding, location) pair at which a role can be reached.
///
/// The same type serves as a template inside an endpoint criterion, where
/// binding and location may be left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    element: QName,
    schema_type: Option<QName>,
    binding: Option<String>,
    location: Option<String>,
    response_location: Option<String>,
    indexed: Option<EndpointIndex>,
}

impl Endpoint {
    /// Creates an endpoint of the given element type.
    #[must_use]
    pub fn new(element: QName, binding: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            element,
            schema_type: None,
            binding: Some(binding.into()),
            location: Some(location.into()),
            response_location: None,
            indexed: None,
        }
    }

    /// Creates an endpoint template: only the type is set.
    #[must_use]
    pub const fn template(element: QName) -> Self {
        Self {
            element,
            schema_type: None,
            binding: None,
            location: None,
            response_location: None,
            indexed: None,
        }
    }

    /// Sets the `xsi:type` of the endpoint.
    #[must_use]
    pub fn with_schema_type(mut self, schema_type: QName) -> Self {
        self.schema_type = Some(schema_type);
        self
    }

    /// Sets the binding.
    #[must_use]
    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.binding = Some(binding.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the response location.
    #[must_use]
    pub fn with_response_location(mut self, location: impl Into<String>) -> Self {
        self.response_location = Some(location.into());
        self
    }

    /// Makes this an indexed endpoint.
    #[must_use]
    pub const fn with_index(mut self, index: u16, is_default: Option<bool>) -> Self {
        self.indexed = Some(EndpointIndex { index, is_default });
        self
    }

    /// Returns the element name.
    #[must_use]
    pub const fn element(&self) -> &QName {
        &self.element
    }

    /// Returns the `xsi:type`, if any.
    #[must_use]
    pub const fn schema_type(&self) -> Option<&QName> {
        self.schema_type.as_ref()
    }

    /// Returns the type used for type-based lookup: the schema type when
    /// present, otherwise the element name.
    #[must_use]
    pub fn endpoint_type(&self) -> &QName {
        self.schema_type.as_ref().unwrap_or(&self.element)
    }

    /// Returns the binding URI.
    #[must_use]
    pub fn binding(&self) -> Option<&str> {
        self.binding.as_deref().filter(|b| !b.is_empty())
    }

    /// Returns the binding as a known [`SamlBinding`].
    #[must_use]
    pub fn saml_binding(&self) -> Option<SamlBinding> {
        self.binding().and_then(SamlBinding::from_uri)
    }

    /// Returns the location URI.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref().filter(|l| !l.is_empty())
    }

    /// Returns the response location URI.
    #[must_use]
    pub fn response_location(&self) -> Option<&str> {
        self.response_location.as_deref().filter(|l| !l.is_empty())
    }

    /// Returns the index attributes for indexed endpoints.
    #[must_use]
    pub const fn indexed(&self) -> Option<&EndpointIndex> {
        self.indexed.as_ref()
    }

    /// Returns true if this is an indexed endpoint.
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        self.indexed.is_some()
    }
}
