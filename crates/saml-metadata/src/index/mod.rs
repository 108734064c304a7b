//! Secondary indexes over entity descriptors.
//!
//! An index is a key-derivation strategy. At ingest time it derives keys
//! from an [`EntityDescriptor`]; at query time it derives keys from a
//! [`CriteriaSet`]. Keys are plain values, so keys derived the same way on
//! both sides compare equal and meet in the index's
//! [`MetadataIndexStore`].
//!
//! An index that has nothing to say about an input returns `None` (or an
//! empty set). That is a normal outcome and never an error.

mod artifact;
mod endpoint;
mod function;
mod manager;
mod role;
mod store;

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::criteria::CriteriaSet;
use crate::types::{EntityDescriptor, QName};

pub use artifact::ArtifactSourceIdMetadataIndex;
pub use endpoint::{EndpointMetadataIndex, EndpointSelection};
pub use function::{CriteriaKeyFn, DescriptorKeyFn, FunctionDrivenMetadataIndex};
pub use manager::MetadataIndexManager;
pub use role::RoleMetadataIndex;
pub use store::MetadataIndexStore;

/// A key under which entity descriptors are indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataIndexKey {
    /// A role type.
    Role(QName),
    /// An endpoint location within a role.
    Endpoint(EndpointKey),
    /// An artifact SourceID.
    SourceId([u8; saml_crypto::SOURCE_ID_LEN]),
    /// A key produced by a custom strategy.
    Custom(String),
}

impl fmt::Display for MetadataIndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => write!(f, "role:{role}"),
            Self::Endpoint(key) => write!(
                f,
                "endpoint:{}:{}:{}:{}",
                key.role,
                key.endpoint_type,
                key.location,
                if key.is_response { "response" } else { "request" }
            ),
            Self::SourceId(id) => write!(f, "source-id:{}", hex::encode(id)),
            Self::Custom(key) => write!(f, "custom:{key}"),
        }
    }
}

/// Identity of an endpoint location: role type, endpoint type, location and
/// whether the location is a response location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    role: QName,
    endpoint_type: QName,
    location: String,
    is_response: bool,
}

impl EndpointKey {
    /// Creates a key; `location` is canonicalized first.
    #[must_use]
    pub fn new(role: QName, endpoint_type: QName, location: &str, is_response: bool) -> Self {
        Self {
            role,
            endpoint_type,
            location: canonicalize_location(location),
            is_response,
        }
    }

    /// Returns the role type.
    #[must_use]
    pub const fn role(&self) -> &QName {
        &self.role
    }

    /// Returns the endpoint type.
    #[must_use]
    pub const fn endpoint_type(&self) -> &QName {
        &self.endpoint_type
    }

    /// Returns the canonical location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns true for response locations.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        self.is_response
    }
}

/// Canonicalizes an endpoint URL: scheme and host lower-cased, default port
/// dropped. Text that does not parse as a URL is returned unchanged.
#[must_use]
pub fn canonicalize_location(location: &str) -> String {
    Url::parse(location).map_or_else(|_| location.to_string(), |url| url.to_string())
}

/// A key-derivation strategy for a secondary index.
pub trait MetadataIndex: Send + Sync + fmt::Debug {
    /// Returns a short name for logging.
    fn name(&self) -> &str;

    /// Derives the keys under which `descriptor` is stored.
    fn generate_keys_from_descriptor(
        &self,
        descriptor: &EntityDescriptor,
    ) -> Option<HashSet<MetadataIndexKey>>;

    /// Derives the keys to look up for `criteria`.
    fn generate_keys_from_criteria(&self, criteria: &CriteriaSet)
        -> Option<HashSet<MetadataIndexKey>>;
}
