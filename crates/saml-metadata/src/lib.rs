//! SAML metadata resolution.
//!
//! This crate answers the lookups a SAML deployment makes against peer
//! metadata:
//!
//! - **Entity resolution** - find entity descriptors by entity ID, or
//!   through secondary indexes keyed by role, endpoint location or SAML 1
//!   artifact source ID
//! - **Role resolution** - narrow an entity to roles of a given type and
//!   protocol
//! - **Endpoint selection** - pick the endpoint to use, honouring the
//!   `isDefault` rules for indexed endpoints
//! - **Credential resolution** - turn `KeyDescriptor`/`KeyInfo` content
//!   into usable public keys, cached per key descriptor
//!
//! # Architecture
//!
//! - [`types`] - Metadata object model, published as shared immutable
//!   graphs built from builders
//! - [`criteria`] - Typed lookup criteria
//! - [`index`] - Secondary index strategies and their stores
//! - [`resolver`] - Metadata resolvers with atomic store replacement
//! - [`role`] - Role descriptor resolution
//! - [`endpoint`] - Endpoint resolution
//! - [`security`] - Credential resolution
//! - [`config`] - TOML configuration
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust,ignore
//! use saml_metadata::{BaseMetadataResolver, CriteriaSet, MetadataResolver};
//!
//! let resolver = BaseMetadataResolver::new("local");
//! resolver.initialize(|r| r.load_document(document))?;
//!
//! let entity = resolver.resolve_single(
//!     &CriteriaSet::new().with_entity_id("https://idp.example.org"),
//! )?;
//! ```
//!
//! Parsing metadata XML and verifying its signature are left to the
//! caller: documents enter through a [`MetadataUnmarshaller`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod criteria;
pub mod endpoint;
pub mod error;
pub mod index;
pub mod memo;
pub mod resolver;
pub mod role;
pub mod security;
pub mod types;

pub use config::{IndexConfig, MetadataCredentialResolverConfig, MetadataResolverConfig};
pub use criteria::{CriteriaSet, Criterion, CriterionKind, SamlArtifact};
pub use endpoint::{DefaultEndpointResolver, EndpointResolver};
pub use error::{FilterError, MetadataError, MetadataResult};
pub use resolver::{
    BaseMetadataResolver, BatchMetadataResolver, ChainingMetadataResolver, MetadataResolver,
    MetadataUnmarshaller, RefreshableMetadataResolver,
};
pub use role::{BasicRoleDescriptorResolver, RoleDescriptorResolver};
pub use security::{
    match_usage, BasicKeyInfoCredentialResolver, Credential, CredentialResolver,
    MetadataCredentialResolver,
};
pub use types::*;
