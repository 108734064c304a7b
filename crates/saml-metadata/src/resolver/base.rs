//! Shared metadata resolver lifecycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, error, info, warn};

use super::{MetadataFilter, MetadataResolver, MetadataUnmarshaller};
use crate::config::MetadataResolverConfig;
use crate::criteria::CriteriaSet;
use crate::error::{MetadataError, MetadataResult};
use crate::index::{MetadataIndex, MetadataIndexManager};
use crate::types::{
    EntitiesDescriptor, EntityDescriptor, GroupMember, MetadataDocument, MetadataRoot,
    TimeBoundValidity, ValidityPredicate,
};

// ============================================================================
// Backing store
// ============================================================================

/// One published generation of metadata: the descriptors in document
/// order, the entity-ID index and the secondary indexes.
///
/// A store is filled before it is published and never changes afterwards;
/// a refresh builds a new store and swaps it in.
#[derive(Debug, Default)]
pub struct BackingStore {
    ordered: Vec<Arc<EntityDescriptor>>,
    /// Document position of each descriptor, keyed by its address.
    positions: HashMap<usize, usize>,
    by_entity_id: HashMap<String, Vec<Arc<EntityDescriptor>>>,
    secondary: MetadataIndexManager,
    root: Option<MetadataRoot>,
}

impl BackingStore {
    /// Creates an empty store maintaining the given secondary indexes.
    #[must_use]
    pub fn new(indexes: impl IntoIterator<Item = Arc<dyn MetadataIndex>>) -> Self {
        Self {
            secondary: MetadataIndexManager::new(indexes),
            ..Self::default()
        }
    }

    /// Adds a published document.
    pub fn pre_process(&mut self, root: MetadataRoot) {
        match &root {
            MetadataRoot::Entity(entity) => self.pre_process_entity_descriptor(Arc::clone(entity)),
            MetadataRoot::Entities(group) => self.pre_process_entities_descriptor(group),
        }
        self.root = Some(root);
    }

    /// Adds one entity to the ordered list and to every index.
    ///
    /// A second entity with an ID that is already present is kept next to
    /// the first one; lookups by that ID return both.
    pub fn pre_process_entity_descriptor(&mut self, entity: Arc<EntityDescriptor>) {
        let entry = self
            .by_entity_id
            .entry(entity.entity_id().to_string())
            .or_default();
        if !entry.is_empty() {
            warn!(
                entity_id = %entity.entity_id(),
                count = entry.len() + 1,
                "Duplicate entity ID in metadata; keeping all descriptors"
            );
        }
        entry.push(Arc::clone(&entity));
        self.secondary.index_entity_descriptor(&entity);
        self.positions
            .insert(Arc::as_ptr(&entity) as usize, self.ordered.len());
        self.ordered.push(entity);
    }

    /// Adds every entity of a group, recursing into nested groups.
    pub fn pre_process_entities_descriptor(&mut self, group: &Arc<EntitiesDescriptor>) {
        for member in group.members() {
            match member {
                GroupMember::Entity(entity) => self.pre_process_entity_descriptor(Arc::clone(entity)),
                GroupMember::Group(nested) => self.pre_process_entities_descriptor(nested),
            }
        }
    }

    /// Returns every entity in document order.
    #[must_use]
    pub fn ordered_descriptors(&self) -> &[Arc<EntityDescriptor>] {
        &self.ordered
    }

    /// Sorts entities of this store into document order.
    ///
    /// Entities that do not belong to the store go last.
    #[must_use]
    pub fn in_document_order(
        &self,
        mut entities: Vec<Arc<EntityDescriptor>>,
    ) -> Vec<Arc<EntityDescriptor>> {
        entities.sort_by_key(|entity| {
            self.positions
                .get(&(Arc::as_ptr(entity) as usize))
                .copied()
                .unwrap_or(usize::MAX)
        });
        entities
    }

    /// Returns the entities with the given ID.
    #[must_use]
    pub fn lookup(&self, entity_id: &str) -> &[Arc<EntityDescriptor>] {
        self.by_entity_id
            .get(entity_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the secondary indexes.
    #[must_use]
    pub const fn secondary_index(&self) -> &MetadataIndexManager {
        &self.secondary
    }

    /// Returns the published document root, keeping the graph alive.
    #[must_use]
    pub const fn root(&self) -> Option<&MetadataRoot> {
        self.root.as_ref()
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns true if the store holds no entity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

// ============================================================================
// Base resolver
// ============================================================================

/// Metadata resolver over an in-memory backing store.
///
/// Readers load the current [`BackingStore`] without locking; a new store
/// is published with one atomic pointer swap, so a resolution in flight
/// keeps using the store it started with.
pub struct BaseMetadataResolver {
    id: String,
    require_valid_metadata: bool,
    fail_fast_initialization: bool,
    resolve_via_predicates_only: bool,
    indexes: Vec<Arc<dyn MetadataIndex>>,
    filter: Option<Arc<dyn MetadataFilter>>,
    unmarshaller: Option<Arc<dyn MetadataUnmarshaller>>,
    validity: Arc<dyn ValidityPredicate>,
    store: ArcSwap<BackingStore>,
    initialized: AtomicBool,
}

impl BaseMetadataResolver {
    /// Creates a resolver with default settings.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_config(&MetadataResolverConfig {
            id: id.into(),
            ..MetadataResolverConfig::default()
        })
    }

    /// Creates a resolver from configuration.
    #[must_use]
    pub fn from_config(config: &MetadataResolverConfig) -> Self {
        let indexes: Vec<_> = config.indexes.iter().map(|c| c.build()).collect();
        Self {
            id: config.id.clone(),
            require_valid_metadata: config.require_valid_metadata,
            fail_fast_initialization: config.fail_fast_initialization,
            resolve_via_predicates_only: config.resolve_via_predicates_only,
            store: ArcSwap::from_pointee(BackingStore::new(indexes.iter().cloned())),
            indexes,
            filter: None,
            unmarshaller: None,
            validity: Arc::new(TimeBoundValidity::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn with_index(mut self, index: impl MetadataIndex + 'static) -> Self {
        self.indexes.push(Arc::new(index));
        self.store = ArcSwap::from_pointee(self.create_new_backing_store());
        self
    }

    /// Sets the metadata filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl MetadataFilter + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Sets the unmarshaller used for byte sources.
    #[must_use]
    pub fn with_unmarshaller(mut self, unmarshaller: impl MetadataUnmarshaller + 'static) -> Self {
        self.unmarshaller = Some(Arc::new(unmarshaller));
        self
    }

    /// Sets the validity predicate.
    #[must_use]
    pub fn with_validity(mut self, validity: impl ValidityPredicate + 'static) -> Self {
        self.validity = Arc::new(validity);
        self
    }

    /// Enables or disables validity gating.
    #[must_use]
    pub const fn with_require_valid_metadata(mut self, require: bool) -> Self {
        self.require_valid_metadata = require;
        self
    }

    /// Enables or disables fail-fast initialization.
    #[must_use]
    pub const fn with_fail_fast_initialization(mut self, fail_fast: bool) -> Self {
        self.fail_fast_initialization = fail_fast;
        self
    }

    /// Enables or disables scanning all entities when no index applies.
    #[must_use]
    pub const fn with_resolve_via_predicates_only(mut self, enabled: bool) -> Self {
        self.resolve_via_predicates_only = enabled;
        self
    }

    /// Returns true if validity gating is enabled.
    #[must_use]
    pub const fn require_valid_metadata(&self) -> bool {
        self.require_valid_metadata
    }

    /// Returns true if initialization failures propagate.
    #[must_use]
    pub const fn fail_fast_initialization(&self) -> bool {
        self.fail_fast_initialization
    }

    /// Returns the validity predicate.
    #[must_use]
    pub fn validity(&self) -> &Arc<dyn ValidityPredicate> {
        &self.validity
    }

    /// Returns true once [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Runs resolver-specific initialization.
    ///
    /// With fail-fast enabled a failing `init` fails the resolver, which
    /// stays uninitialized. Otherwise the failure is logged and the resolver
    /// starts with an empty store, to be filled by a later refresh.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Initialization`] when `init` fails and
    /// fail-fast is enabled.
    pub fn initialize<F>(&self, init: F) -> MetadataResult<()>
    where
        F: FnOnce(&Self) -> MetadataResult<()>,
    {
        if self.is_initialized() {
            return Ok(());
        }

        if let Err(err) = init(self) {
            if self.fail_fast_initialization {
                return Err(MetadataError::Initialization {
                    resolver: self.id.clone(),
                    reason: err.to_string(),
                });
            }
            error!(
                resolver = %self.id,
                error = %err,
                "Metadata resolver initialization failed; continuing with no metadata"
            );
        }

        self.initialized.store(true, Ordering::Release);
        debug!(resolver = %self.id, entities = self.backing_store().len(), "Metadata resolver initialized");
        Ok(())
    }

    /// Returns true if `entity` may be served.
    #[must_use]
    pub fn is_valid(&self, entity: &EntityDescriptor) -> bool {
        !self.require_valid_metadata || self.validity.is_entity_valid(entity)
    }

    /// Returns the current backing store.
    #[must_use]
    pub fn backing_store(&self) -> Arc<BackingStore> {
        self.store.load_full()
    }

    /// Creates an empty store with this resolver's secondary indexes.
    #[must_use]
    pub fn create_new_backing_store(&self) -> BackingStore {
        BackingStore::new(self.indexes.iter().cloned())
    }

    /// Publishes `store`, replacing the current one.
    pub fn set_backing_store(&self, store: BackingStore) {
        self.store.store(Arc::new(store));
    }

    /// Returns the valid entities with the given ID.
    #[must_use]
    pub fn lookup_entity_id(&self, entity_id: &str) -> Vec<Arc<EntityDescriptor>> {
        self.valid_only(self.backing_store().lookup(entity_id).iter().cloned())
    }

    fn valid_only(
        &self,
        candidates: impl IntoIterator<Item = Arc<EntityDescriptor>>,
    ) -> Vec<Arc<EntityDescriptor>> {
        candidates
            .into_iter()
            .filter(|entity| {
                let valid = self.is_valid(entity);
                if !valid {
                    debug!(
                        resolver = %self.id,
                        entity_id = %entity.entity_id(),
                        "Skipping invalid or expired entity descriptor"
                    );
                }
                valid
            })
            .collect()
    }

    /// Unmarshalls serialized metadata, keeping the bytes on the document
    /// for filters.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Configuration`] if no unmarshaller is set,
    /// or the unmarshaller's error.
    pub fn unmarshall_metadata(&self, bytes: &[u8]) -> MetadataResult<MetadataDocument> {
        let unmarshaller = self.unmarshaller.as_ref().ok_or_else(|| {
            MetadataError::Configuration(format!(
                "metadata resolver '{}' received serialized metadata but has no unmarshaller",
                self.id
            ))
        })?;
        let mut document = unmarshaller.unmarshall(bytes)?;
        if document.source.is_none() {
            document.source = Some(bytes.to_vec());
        }
        Ok(document)
    }

    /// Runs the filter, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Filter`] if the filter rejects or fails.
    pub fn filter_metadata(&self, document: &mut MetadataDocument) -> MetadataResult<()> {
        if let Some(filter) = &self.filter {
            filter.filter(document)?;
        }
        Ok(())
    }

    /// Drops the serialized form retained on the document.
    pub fn release_metadata_dom(document: &mut MetadataDocument) {
        document.source = None;
    }

    /// Filters, publishes and indexes a document into a new store, without
    /// installing it.
    ///
    /// # Errors
    ///
    /// Returns the filter failure.
    pub fn process_document(&self, mut document: MetadataDocument) -> MetadataResult<BackingStore> {
        self.filter_metadata(&mut document)?;
        Self::release_metadata_dom(&mut document);

        let mut store = self.create_new_backing_store();
        if let Some(root) = document.publish() {
            store.pre_process(root);
        }
        Ok(store)
    }

    /// Processes and installs a document.
    ///
    /// # Errors
    ///
    /// Returns the filter failure; the current store then stays in service.
    pub fn load_document(&self, document: MetadataDocument) -> MetadataResult<()> {
        let store = self.process_document(document)?;
        info!(resolver = %self.id, entities = store.len(), "Metadata loaded");
        self.set_backing_store(store);
        Ok(())
    }

    fn apply_predicates(
        criteria: &CriteriaSet,
        candidates: Vec<Arc<EntityDescriptor>>,
    ) -> Vec<Arc<EntityDescriptor>> {
        let Some(role) = criteria.entity_role() else {
            return candidates;
        };
        let protocol = criteria.protocol();
        candidates
            .into_iter()
            .filter(|entity| match protocol {
                Some(protocol) => !entity.role_descriptors_for_protocol(role, protocol).is_empty(),
                None => entity.role_descriptors().iter().any(|r| r.is_of_type(role)),
            })
            .collect()
    }
}

impl fmt::Debug for BaseMetadataResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseMetadataResolver")
            .field("id", &self.id)
            .field("require_valid_metadata", &self.require_valid_metadata)
            .field("fail_fast_initialization", &self.fail_fast_initialization)
            .field("resolve_via_predicates_only", &self.resolve_via_predicates_only)
            .field("indexes", &self.indexes)
            .field("entities", &self.backing_store().len())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl MetadataResolver for BaseMetadataResolver {
    fn id(&self) -> &str {
        &self.id
    }

    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<EntityDescriptor>>> {
        if !self.is_initialized() {
            return Err(MetadataError::NotInitialized(self.id.clone()));
        }

        let store = self.backing_store();
        let candidates = if let Some(entity_id) = criteria.entity_id() {
            if entity_id.is_empty() {
                return Ok(Vec::new());
            }
            self.valid_only(store.lookup(entity_id).iter().cloned())
        } else if let Some(found) = store.secondary_index().lookup_entity_descriptors(criteria) {
            self.valid_only(store.in_document_order(found))
        } else if self.resolve_via_predicates_only {
            self.valid_only(store.ordered_descriptors().iter().cloned())
        } else {
            debug!(
                resolver = %self.id,
                "No entity ID criterion and no applicable index; returning no results"
            );
            return Ok(Vec::new());
        };

        Ok(Self::apply_predicates(criteria, candidates))
    }
}
