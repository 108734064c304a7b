//! Index by role type.

use std::collections::HashSet;

use super::{MetadataIndex, MetadataIndexKey};
use crate::criteria::CriteriaSet;
use crate::types::EntityDescriptor;

/// Indexes entities by the types of the roles they advertise.
///
/// The key of a role is its schema type, or its element name when it has
/// none. Queries are answered from the entity role criterion.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleMetadataIndex;

impl RoleMetadataIndex {
    /// Creates the index.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MetadataIndex for RoleMetadataIndex {
    fn name(&self) -> &str {
        "role"
    }

    fn generate_keys_from_descriptor(
        &self,
        descriptor: &EntityDescriptor,
    ) -> Option<HashSet<MetadataIndexKey>> {
        let keys: HashSet<_> = descriptor
            .role_descriptors()
            .iter()
            .map(|role| MetadataIndexKey::Role(role.role_type().clone()))
            .collect();
        (!keys.is_empty()).then_some(keys)
    }

    fn generate_keys_from_criteria(
        &self,
        criteria: &CriteriaSet,
    ) -> Option<HashSet<MetadataIndexKey>> {
        let role = criteria.entity_role()?;
        Some(HashSet::from([MetadataIndexKey::Role(role.clone())]))
    }
}
