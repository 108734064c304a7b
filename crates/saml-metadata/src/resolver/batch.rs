//! Resolver that loads a whole metadata document from a source.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{
    BackingStore, BaseMetadataResolver, MetadataResolver, MetadataSource, RawMetadata,
    RefreshableMetadataResolver,
};
use crate::criteria::CriteriaSet;
use crate::error::{MetadataError, MetadataResult};
use crate::types::EntityDescriptor;

#[derive(Debug, Default, Clone)]
struct RefreshStatus {
    last_refresh: Option<DateTime<Utc>>,
    last_update: Option<DateTime<Utc>>,
    success: bool,
    /// SHA-256 of the bytes behind the store in service.
    last_digest: Option<Vec<u8>>,
}

/// A freshly built store and the digest of the bytes it came from.
type Processed = (BackingStore, Option<Vec<u8>>);

/// Loads all metadata from a [`MetadataSource`] at once and reloads it on
/// [`refresh`](RefreshableMetadataResolver::refresh).
///
/// Refreshes are serialized. A failed refresh leaves the previous store in
/// service. Bytes identical to those of the store in service, or an
/// explicit [`RawMetadata::Unchanged`], leave it in place without
/// rebuilding. Neither counts as success before a first successful load.
#[derive(Debug)]
pub struct BatchMetadataResolver<S> {
    base: BaseMetadataResolver,
    source: S,
    refresh_lock: Mutex<()>,
    status: RwLock<RefreshStatus>,
}

impl<S: MetadataSource> BatchMetadataResolver<S> {
    /// Creates a resolver over `source`.
    pub fn new(base: BaseMetadataResolver, source: S) -> Self {
        Self {
            base,
            source,
            refresh_lock: Mutex::new(()),
            status: RwLock::new(RefreshStatus::default()),
        }
    }

    /// Returns the underlying base resolver.
    pub const fn base(&self) -> &BaseMetadataResolver {
        &self.base
    }

    /// Returns the source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Performs the initial load.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Initialization`](crate::MetadataError::Initialization)
    /// if the load fails and fail-fast initialization is enabled.
    pub fn initialize(&self) -> MetadataResult<()> {
        self.base.initialize(|_| self.refresh())
    }

    fn fetch_and_process(
        &self,
        installed: Option<&[u8]>,
        loaded: bool,
    ) -> MetadataResult<Option<Processed>> {
        match self.source.fetch()? {
            RawMetadata::Unchanged if loaded => Ok(None),
            RawMetadata::Unchanged => Err(MetadataError::Fetch(
                "source reported no change but no metadata has been loaded".to_string(),
            )),
            RawMetadata::Bytes(bytes) => {
                let digest = saml_crypto::sha256(&bytes);
                if installed == Some(digest.as_slice()) {
                    return Ok(None);
                }
                let document = self.base.unmarshall_metadata(&bytes)?;
                let store = self.base.process_document(document)?;
                Ok(Some((store, Some(digest))))
            }
            RawMetadata::Document(document) => {
                self.base.process_document(document).map(|store| Some((store, None)))
            }
        }
    }
}

impl<S: MetadataSource> MetadataResolver for BatchMetadataResolver<S> {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<EntityDescriptor>>> {
        self.base.resolve(criteria)
    }
}

impl<S: MetadataSource> RefreshableMetadataResolver for BatchMetadataResolver<S> {
    fn refresh(&self) -> MetadataResult<()> {
        let _guard = self.refresh_lock.lock();
        let started = Utc::now();
        let (installed, loaded) = {
            let status = self.status.read();
            (status.last_digest.clone(), status.last_update.is_some())
        };
        let outcome = self.fetch_and_process(installed.as_deref(), loaded);

        let mut status = self.status.write();
        status.last_refresh = Some(started);

        match outcome {
            Ok(Some((store, digest))) => {
                let entities = store.len();
                self.base.set_backing_store(store);
                status.last_update = Some(started);
                status.last_digest = digest;
                status.success = true;
                info!(resolver = %self.base.id(), entities, "Metadata refreshed");
                Ok(())
            }
            Ok(None) => {
                status.success = true;
                debug!(resolver = %self.base.id(), "Metadata unchanged");
                Ok(())
            }
            Err(err) => {
                status.success = false;
                warn!(
                    resolver = %self.base.id(),
                    error = %err,
                    "Metadata refresh failed; keeping previous metadata"
                );
                Err(err)
            }
        }
    }

    fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.status.read().last_refresh
    }

    fn last_update(&self) -> Option<DateTime<Utc>> {
        self.status.read().last_update
    }

    fn was_last_refresh_success(&self) -> bool {
        self.status.read().success
    }
}
