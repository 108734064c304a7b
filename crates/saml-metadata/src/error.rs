//! Metadata resolution error types.
//!
//! "Not found" is never an error in this crate: resolvers return an empty
//! `Vec` or `None`. Every variant here names the contract that was violated
//! so operators can tell a misconfigured resolver from bad input.

use thiserror::Error;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised by metadata, endpoint and credential resolution.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A criterion required by the resolver was not supplied.
    #[error("missing required criteria: {0}")]
    MissingCriterion(String),

    /// A criterion was supplied but could not be interpreted.
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// A collaborator the requested resolution mode needs is not configured.
    #[error("resolver misconfigured: {0}")]
    Configuration(String),

    /// A `KeyInfo` payload could not be turned into credentials.
    #[error("KeyInfo resolution failed: {0}")]
    KeyInfoResolution(String),

    /// Raw metadata could not be turned into a descriptor graph.
    #[error("metadata unmarshalling failed: {0}")]
    Unmarshalling(String),

    /// The metadata filter chain rejected or failed on a document.
    #[error("metadata filtering failed: {0}")]
    Filter(#[from] FilterError),

    /// The metadata source could not deliver a document.
    #[error("metadata fetch failed: {0}")]
    Fetch(String),

    /// A resolver failed to initialize with fail-fast enabled.
    #[error("metadata resolver '{resolver}' failed to initialize: {reason}")]
    Initialization {
        /// Identifier of the resolver.
        resolver: String,
        /// Underlying failure.
        reason: String,
    },

    /// A resolver was used before `initialize` completed.
    #[error("metadata resolver '{0}' has not been initialized")]
    NotInitialized(String),

    /// Configuration text could not be parsed.
    #[error("configuration could not be parsed: {0}")]
    ConfigParse(String),
}

impl MetadataError {
    /// Returns whether the error stems from resolver wiring or configuration
    /// rather than from the caller's input or the metadata itself.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::ConfigParse(_) | Self::NotInitialized(_)
        )
    }

    /// Returns whether the caller supplied unusable criteria.
    #[must_use]
    pub const fn is_criteria_error(&self) -> bool {
        matches!(self, Self::MissingCriterion(_) | Self::InvalidCriteria(_))
    }
}

impl From<toml::de::Error> for MetadataError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

/// Errors raised by metadata filters.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter refused the document as a whole.
    #[error("metadata rejected by filter '{filter}': {reason}")]
    Rejected {
        /// Name of the rejecting filter.
        filter: String,
        /// Why the document was rejected.
        reason: String,
    },

    /// The filter could not process the document.
    #[error("filter '{filter}' failed: {reason}")]
    Failed {
        /// Name of the failing filter.
        filter: String,
        /// Underlying failure.
        reason: String,
    },
}
