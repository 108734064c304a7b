//! Role descriptor resolution.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::criteria::CriteriaSet;
use crate::error::MetadataResult;
use crate::resolver::MetadataResolver;
use crate::types::{RoleDescriptor, TimeBoundValidity, ValidityPredicate};

/// Resolves role descriptors.
pub trait RoleDescriptorResolver: Send + Sync + fmt::Debug {
    /// Returns every matching role in document order.
    ///
    /// # Errors
    ///
    /// Returns the underlying metadata resolver's error.
    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<RoleDescriptor>>>;

    /// Returns the first matching role.
    ///
    /// # Errors
    ///
    /// See [`RoleDescriptorResolver::resolve`].
    fn resolve_single(&self, criteria: &CriteriaSet) -> MetadataResult<Option<Arc<RoleDescriptor>>> {
        Ok(self.resolve(criteria)?.into_iter().next())
    }
}

/// Finds the entity through a [`MetadataResolver`] and narrows it to roles
/// of the requested type, optionally supporting the requested protocol.
///
/// Needs both an entity ID and an entity role criterion; without either
/// the result is empty.
#[derive(Debug)]
pub struct BasicRoleDescriptorResolver {
    metadata: Arc<dyn MetadataResolver>,
    require_valid_metadata: bool,
    validity: Arc<dyn ValidityPredicate>,
}

impl BasicRoleDescriptorResolver {
    /// Creates a resolver over `metadata`.
    pub fn new(metadata: Arc<dyn MetadataResolver>) -> Self {
        Self {
            metadata,
            require_valid_metadata: true,
            validity: Arc::new(TimeBoundValidity::new()),
        }
    }

    /// Enables or disables dropping expired roles.
    #[must_use]
    pub fn with_require_valid_metadata(mut self, require: bool) -> Self {
        self.require_valid_metadata = require;
        self
    }

    /// Sets the validity predicate.
    #[must_use]
    pub fn with_validity(mut self, validity: impl ValidityPredicate + 'static) -> Self {
        self.validity = Arc::new(validity);
        self
    }

    /// Returns the metadata resolver.
    #[must_use]
    pub fn metadata_resolver(&self) -> &Arc<dyn MetadataResolver> {
        &self.metadata
    }
}

impl RoleDescriptorResolver for BasicRoleDescriptorResolver {
    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<RoleDescriptor>>> {
        let Some(entity_id) = criteria.entity_id().filter(|id| !id.is_empty()) else {
            debug!("No entity ID criterion; no roles resolved");
            return Ok(Vec::new());
        };
        let Some(role) = criteria.entity_role() else {
            debug!(entity_id, "No entity role criterion; no roles resolved");
            return Ok(Vec::new());
        };

        let Some(entity) = self.metadata.resolve_single(criteria)? else {
            debug!(entity_id, "Entity not found in metadata");
            return Ok(Vec::new());
        };

        let candidates = match criteria.protocol() {
            Some(protocol) => entity.role_descriptors_for_protocol(role, protocol),
            None => entity.role_descriptors_of_type(role),
        };

        Ok(candidates
            .into_iter()
            .filter(|r| !self.require_valid_metadata || self.validity.is_role_valid(r))
            .collect())
    }
}
