//! Index driven by caller-supplied functions.

use std::collections::HashSet;
use std::fmt;

use super::{MetadataIndex, MetadataIndexKey};
use crate::criteria::CriteriaSet;
use crate::types::EntityDescriptor;

/// Derives keys from a descriptor.
pub type DescriptorKeyFn =
    Box<dyn Fn(&EntityDescriptor) -> Option<HashSet<MetadataIndexKey>> + Send + Sync>;

/// Derives keys from criteria.
pub type CriteriaKeyFn =
    Box<dyn Fn(&CriteriaSet) -> Option<HashSet<MetadataIndexKey>> + Send + Sync>;

/// An index whose key derivation is delegated to two functions.
pub struct FunctionDrivenMetadataIndex {
    name: String,
    from_descriptor: DescriptorKeyFn,
    from_criteria: CriteriaKeyFn,
}

impl FunctionDrivenMetadataIndex {
    /// Creates an index from the two derivation functions.
    pub fn new<D, C>(name: impl Into<String>, from_descriptor: D, from_criteria: C) -> Self
    where
        D: Fn(&EntityDescriptor) -> Option<HashSet<MetadataIndexKey>> + Send + Sync + 'static,
        C: Fn(&CriteriaSet) -> Option<HashSet<MetadataIndexKey>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            from_descriptor: Box::new(from_descriptor),
            from_criteria: Box::new(from_criteria),
        }
    }
}

impl fmt::Debug for FunctionDrivenMetadataIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDrivenMetadataIndex")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl MetadataIndex for FunctionDrivenMetadataIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_keys_from_descriptor(
        &self,
        descriptor: &EntityDescriptor,
    ) -> Option<HashSet<MetadataIndexKey>> {
        (self.from_descriptor)(descriptor)
    }

    fn generate_keys_from_criteria(
        &self,
        criteria: &CriteriaSet,
    ) -> Option<HashSet<MetadataIndexKey>> {
        (self.from_criteria)(criteria)
    }
}
