//! Resolver configuration.
//!
//! All settings have defaults, so a resolver can be configured from an
//! empty TOML document:
//!
//! ```toml
//! id = "federation"
//! require_valid_metadata = true
//! fail_fast_initialization = false
//!
//! [[indexes]]
//! type = "role"
//!
//! [[indexes]]
//! type = "endpoint"
//! selection = [
//!     { role = "{urn:oasis:names:tc:SAML:2.0:metadata}SPSSODescriptor", endpoints = ["{urn:oasis:names:tc:SAML:2.0:metadata}AssertionConsumerService"] },
//! ]
//!
//! [[indexes]]
//! type = "artifact-source-id"
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MetadataResult;
use crate::index::{
    ArtifactSourceIdMetadataIndex, EndpointMetadataIndex, EndpointSelection, MetadataIndex,
    RoleMetadataIndex,
};
use crate::types::QName;

/// Metadata resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataResolverConfig {
    /// Resolver identifier used in logs and errors.
    pub id: String,
    /// Drop expired descriptors from results.
    pub require_valid_metadata: bool,
    /// Propagate initialization failures instead of starting empty.
    pub fail_fast_initialization: bool,
    /// Scan all entities when no index applies to the criteria.
    pub resolve_via_predicates_only: bool,
    /// Secondary indexes to maintain.
    pub indexes: Vec<IndexConfig>,
}

impl Default for MetadataResolverConfig {
    fn default() -> Self {
        Self {
            id: "metadata".to_string(),
            require_valid_metadata: true,
            fail_fast_initialization: true,
            resolve_via_predicates_only: false,
            indexes: Vec::new(),
        }
    }
}

impl MetadataResolverConfig {
    /// Parses configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ConfigParse`](crate::MetadataError::ConfigParse)
    /// if the text is not valid configuration.
    pub fn from_toml_str(text: &str) -> MetadataResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// A secondary index to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IndexConfig {
    /// [`RoleMetadataIndex`].
    Role,
    /// [`EndpointMetadataIndex`]; an empty selection indexes every endpoint.
    Endpoint {
        /// Endpoint types to index, per role type.
        #[serde(default)]
        selection: Vec<EndpointSelectionConfig>,
    },
    /// [`ArtifactSourceIdMetadataIndex`].
    ArtifactSourceId,
}

/// Endpoint types indexed for one role type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSelectionConfig {
    /// Role type, in Clark notation.
    pub role: QName,
    /// Endpoint types, in Clark notation.
    pub endpoints: Vec<QName>,
}

impl IndexConfig {
    /// Builds the configured index.
    #[must_use]
    pub fn build(&self) -> Arc<dyn MetadataIndex> {
        match self {
            Self::Role => Arc::new(RoleMetadataIndex::new()),
            Self::Endpoint { selection } => {
                let selection = selection.iter().fold(EndpointSelection::all(), |acc, entry| {
                    acc.with(entry.role.clone(), entry.endpoints.iter().cloned())
                });
                Arc::new(EndpointMetadataIndex::with_selection(selection))
            }
            Self::ArtifactSourceId => Arc::new(ArtifactSourceIdMetadataIndex::new()),
        }
    }
}

/// Metadata credential resolver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataCredentialResolverConfig {
    /// Abort the whole call when one key descriptor's `KeyInfo` cannot be
    /// resolved, instead of logging and moving on to the next one.
    pub fail_on_key_info_error: bool,
}

impl MetadataCredentialResolverConfig {
    /// Parses configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ConfigParse`](crate::MetadataError::ConfigParse)
    /// if the text is not valid configuration.
    pub fn from_toml_str(text: &str) -> MetadataResult<Self> {
        Ok(toml::from_str(text)?)
    }
}
