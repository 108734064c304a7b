//! Metadata resolvers.
//!
//! A metadata resolver answers "which entity descriptors match these
//! criteria". [`BaseMetadataResolver`] implements the lifecycle every
//! resolver shares: the backing store of published descriptors and its
//! entity-ID index, secondary indexes, validity gating, filtering and
//! fail-fast initialization. [`BatchMetadataResolver`] adds a
//! [`MetadataSource`] and refresh; [`ChainingMetadataResolver`] combines
//! resolvers.

mod base;
mod batch;
mod chaining;
mod filter;
mod source;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::criteria::CriteriaSet;
use crate::error::MetadataResult;
use crate::types::EntityDescriptor;

pub use base::{BackingStore, BaseMetadataResolver};
pub use batch::BatchMetadataResolver;
pub use chaining::ChainingMetadataResolver;
pub use filter::{
    EntityIdFilter, EntityIdFilterMode, MetadataFilter, MetadataFilterChain,
    RequiredValidUntilFilter,
};
pub use source::{
    FunctionMetadataSource, FunctionMetadataUnmarshaller, MetadataSource, MetadataUnmarshaller,
    RawMetadata, StaticMetadataSource,
};

/// Resolves entity descriptors.
pub trait MetadataResolver: Send + Sync + fmt::Debug {
    /// Returns the resolver's identifier.
    fn id(&self) -> &str;

    /// Returns every matching descriptor, in document order. No match is an
    /// empty `Vec`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error for unusable criteria or a resolver that cannot
    /// answer at all.
    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<EntityDescriptor>>>;

    /// Returns the first matching descriptor.
    ///
    /// # Errors
    ///
    /// See [`MetadataResolver::resolve`].
    fn resolve_single(&self, criteria: &CriteriaSet) -> MetadataResult<Option<Arc<EntityDescriptor>>> {
        Ok(self.resolve(criteria)?.into_iter().next())
    }
}

/// A metadata resolver whose content can be reloaded.
pub trait RefreshableMetadataResolver: MetadataResolver {
    /// Reloads metadata. On failure the previous content stays in service.
    ///
    /// # Errors
    ///
    /// Returns the fetch, unmarshalling or filter failure.
    fn refresh(&self) -> MetadataResult<()>;

    /// Returns when the last refresh was attempted.
    fn last_refresh(&self) -> Option<DateTime<Utc>>;

    /// Returns when content was last replaced.
    fn last_update(&self) -> Option<DateTime<Utc>>;

    /// Returns whether the last refresh succeeded.
    fn was_last_refresh_success(&self) -> bool;
}
