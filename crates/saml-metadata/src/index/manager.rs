//! Fan-out over the registered indexes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use super::{MetadataIndex, MetadataIndexStore};
use crate::config::IndexConfig;
use crate::criteria::CriteriaSet;
use crate::types::EntityDescriptor;

/// Owns one [`MetadataIndexStore`] per registered index.
///
/// The set of indexes is fixed at construction. The manager only unions
/// candidates; callers still check validity and apply predicates.
#[derive(Debug, Default)]
pub struct MetadataIndexManager {
    indexes: Vec<(Arc<dyn MetadataIndex>, MetadataIndexStore)>,
}

impl MetadataIndexManager {
    /// Creates a manager over the given indexes.
    #[must_use]
    pub fn new(indexes: impl IntoIterator<Item = Arc<dyn MetadataIndex>>) -> Self {
        Self {
            indexes: indexes
                .into_iter()
                .map(|index| (index, MetadataIndexStore::new()))
                .collect(),
        }
    }

    /// Creates a manager from index configuration.
    #[must_use]
    pub fn from_config(configs: &[IndexConfig]) -> Self {
        Self::new(configs.iter().map(IndexConfig::build))
    }

    /// Returns the registered indexes.
    pub fn indexes(&self) -> impl Iterator<Item = &Arc<dyn MetadataIndex>> {
        self.indexes.iter().map(|(index, _)| index)
    }

    /// Returns the store of the index at `position`.
    #[must_use]
    pub fn store(&self, position: usize) -> Option<&MetadataIndexStore> {
        self.indexes.get(position).map(|(_, store)| store)
    }

    /// Returns true if no index is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Stores `descriptor` in every index that derives keys for it.
    pub fn index_entity_descriptor(&self, descriptor: &Arc<EntityDescriptor>) {
        for (index, store) in &self.indexes {
            let Some(keys) = index.generate_keys_from_descriptor(descriptor) else {
                continue;
            };
            trace!(
                index = index.name(),
                entity_id = %descriptor.entity_id(),
                keys = keys.len(),
                "Indexing entity descriptor"
            );
            for key in keys {
                store.add(key, Arc::clone(descriptor));
            }
        }
    }

    /// Removes `descriptor` from every index.
    pub fn deindex_entity_descriptor(&self, descriptor: &Arc<EntityDescriptor>) {
        for (index, store) in &self.indexes {
            if let Some(keys) = index.generate_keys_from_descriptor(descriptor) {
                for key in &keys {
                    store.remove(key, descriptor);
                }
            }
        }
    }

    /// Looks up candidates for `criteria` across all indexes.
    ///
    /// Returns `None` when no index derived any key from the criteria, so
    /// the caller can tell "no index applies" from "no candidates".
    /// Otherwise returns the union of every store hit without duplicates.
    /// The order is unspecified; see
    /// [`BackingStore::in_document_order`](crate::resolver::BackingStore::in_document_order).
    #[must_use]
    pub fn lookup_entity_descriptors(
        &self,
        criteria: &CriteriaSet,
    ) -> Option<Vec<Arc<EntityDescriptor>>> {
        let mut applied = false;
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (index, store) in &self.indexes {
            let Some(keys) = index.generate_keys_from_criteria(criteria) else {
                continue;
            };
            if keys.is_empty() {
                continue;
            }
            applied = true;
            for key in &keys {
                for descriptor in store.lookup(key) {
                    if seen.insert(Arc::as_ptr(&descriptor)) {
                        out.push(descriptor);
                    }
                }
            }
        }

        applied.then_some(out)
    }

    /// Empties every store.
    pub fn clear(&self) {
        for (_, store) in &self.indexes {
            store.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FunctionDrivenMetadataIndex, MetadataIndexKey, RoleMetadataIndex};
    use crate::types::{roles, EntityDescriptorBuilder, RoleDescriptorBuilder};

    fn idp(id: &str) -> Arc<EntityDescriptor> {
        EntityDescriptorBuilder::new(id)
            .with_role(RoleDescriptorBuilder::new(roles::IDP_SSO_DESCRIPTOR))
            .build()
    }

    #[test]
    fn round_trip_through_role_index() {
        let manager = MetadataIndexManager::new([Arc::new(RoleMetadataIndex) as Arc<dyn MetadataIndex>]);
        let entity = idp("https://idp.example.org");
        manager.index_entity_descriptor(&entity);

        let found = manager
            .lookup_entity_descriptors(&CriteriaSet::new().with_role(roles::IDP_SSO_DESCRIPTOR))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(Arc::ptr_eq(&found[0], &entity));

        let none = manager
            .lookup_entity_descriptors(&CriteriaSet::new().with_role(roles::SP_SSO_DESCRIPTOR))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn inapplicable_index_contributes_nothing() {
        let manager = MetadataIndexManager::new([Arc::new(RoleMetadataIndex) as Arc<dyn MetadataIndex>]);
        manager.index_entity_descriptor(&idp("a"));
        assert!(manager
            .lookup_entity_descriptors(&CriteriaSet::new().with_entity_id("a"))
            .is_none());
    }

    #[test]
    fn union_is_deduplicated() {
        let everything = FunctionDrivenMetadataIndex::new(
            "everything",
            |_| Some(HashSet::from([MetadataIndexKey::Custom("all".into())])),
            |_| Some(HashSet::from([MetadataIndexKey::Custom("all".into())])),
        );
        let manager = MetadataIndexManager::new([
            Arc::new(RoleMetadataIndex) as Arc<dyn MetadataIndex>,
            Arc::new(everything) as Arc<dyn MetadataIndex>,
        ]);
        let a = idp("a");
        let b = EntityDescriptorBuilder::new("b").build();
        manager.index_entity_descriptor(&a);
        manager.index_entity_descriptor(&b);

        let found = manager
            .lookup_entity_descriptors(&CriteriaSet::new().with_role(roles::IDP_SSO_DESCRIPTOR))
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn deindex_and_clear() {
        let manager = MetadataIndexManager::new([Arc::new(RoleMetadataIndex) as Arc<dyn MetadataIndex>]);
        let a = idp("a");
        manager.index_entity_descriptor(&a);
        manager.deindex_entity_descriptor(&a);
        assert!(manager.store(0).is_some_and(MetadataIndexStore::is_empty));

        manager.index_entity_descriptor(&a);
        manager.clear();
        assert!(manager.store(0).is_some_and(MetadataIndexStore::is_empty));
    }
}
