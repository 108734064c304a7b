//! Credential resolution from role metadata.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::MetadataCredentialResolverConfig;
use crate::criteria::CriteriaSet;
use crate::error::{MetadataError, MetadataResult};
use crate::role::RoleDescriptorResolver;
use crate::types::{KeyDescriptor, RoleDescriptor, UsageType};

use super::{Credential, KeyInfoCredentialResolver, MetadataCredentialContext};

/// Returns true if a key descriptor declaring `metadata` usage may serve a
/// request for `criteria` usage.
///
/// An unspecified usage on either side matches anything.
#[must_use]
pub fn match_usage(metadata: UsageType, criteria: UsageType) -> bool {
    metadata == UsageType::Unspecified || criteria == UsageType::Unspecified || metadata == criteria
}

/// Resolves credentials for a set of criteria.
pub trait CredentialResolver: Send + Sync + fmt::Debug {
    /// Returns every matching credential.
    ///
    /// # Errors
    ///
    /// Implementation specific; see the implementors.
    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<Credential>>>;

    /// Returns the first matching credential.
    ///
    /// # Errors
    ///
    /// See [`CredentialResolver::resolve`].
    fn resolve_single(&self, criteria: &CriteriaSet) -> MetadataResult<Option<Arc<Credential>>> {
        Ok(self.resolve(criteria)?.into_iter().next())
    }
}

/// Resolves credentials from the key descriptors of metadata roles.
///
/// The role comes from a role descriptor criterion or, failing that, is
/// looked up through the configured [`RoleDescriptorResolver`] with the
/// entity ID and entity role criteria. Every key descriptor whose usage
/// matches the usage criterion contributes its credentials.
///
/// Credentials are resolved once per key descriptor and cached on it, so
/// repeated and concurrent calls return the same `Arc`s until the metadata
/// is refreshed. A credential carries the entity ID of the role's parent
/// entity; credentials of a free-standing role carry none.
#[derive(Debug)]
pub struct MetadataCredentialResolver {
    role_resolver: Option<Arc<dyn RoleDescriptorResolver>>,
    key_info_resolver: Arc<dyn KeyInfoCredentialResolver>,
    config: MetadataCredentialResolverConfig,
}

impl MetadataCredentialResolver {
    /// Creates a resolver that decodes `KeyInfo` with `key_info_resolver`.
    pub fn new(key_info_resolver: Arc<dyn KeyInfoCredentialResolver>) -> Self {
        Self {
            role_resolver: None,
            key_info_resolver,
            config: MetadataCredentialResolverConfig::default(),
        }
    }

    /// Sets the role resolver used for entity ID lookups.
    #[must_use]
    pub fn with_role_descriptor_resolver(mut self, resolver: Arc<dyn RoleDescriptorResolver>) -> Self {
        self.role_resolver = Some(resolver);
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: MetadataCredentialResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MetadataCredentialResolverConfig {
        &self.config
    }

    fn roles(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<RoleDescriptor>>> {
        if let Some(role) = criteria.role_descriptor() {
            return Ok(vec![Arc::clone(role)]);
        }

        if criteria.entity_id().is_none() || criteria.entity_role().is_none() {
            return Err(MetadataError::MissingCriterion(
                "RoleDescriptorCriterion, or EntityIdCriterion and EntityRoleCriterion".to_string(),
            ));
        }

        let resolver = self.role_resolver.as_ref().ok_or_else(|| {
            MetadataError::Configuration(
                "entity ID lookups need a role descriptor resolver".to_string(),
            )
        })?;
        resolver.resolve(criteria)
    }

    fn credentials_for(
        &self,
        kd: &Arc<KeyDescriptor>,
        role: &Arc<RoleDescriptor>,
        entity_id: Option<&str>,
    ) -> MetadataResult<Vec<Arc<Credential>>> {
        if let Some(cached) = kd.cached_credentials() {
            trace!(entity_id, count = cached.len(), "Credential cache hit");
            return Ok(cached);
        }

        kd.credential_cache().get_or_try_init(|| -> MetadataResult<_> {
            let resolved = self.key_info_resolver.resolve(kd.key_info())?;
            debug!(
                entity_id,
                usage = %kd.usage(),
                count = resolved.len(),
                "Resolved credentials from KeyInfo"
            );
            Ok(resolved
                .into_iter()
                .map(|credential| {
                    let credential = credential
                        .with_usage(kd.usage())
                        .with_context(MetadataCredentialContext::new(kd, role));
                    Arc::new(match entity_id {
                        Some(id) => credential.with_entity_id(id),
                        None => credential,
                    })
                })
                .collect())
        })
    }
}

impl CredentialResolver for MetadataCredentialResolver {
    /// # Errors
    ///
    /// - [`MetadataError::MissingCriterion`] without a role descriptor
    ///   criterion or an entity ID and entity role pair.
    /// - [`MetadataError::Configuration`] if an entity ID lookup is needed
    ///   but no role resolver is configured.
    /// - [`MetadataError::KeyInfoResolution`] for undecodable key material
    ///   when `fail_on_key_info_error` is set; otherwise such descriptors
    ///   are skipped.
    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<Credential>>> {
        let usage = criteria.usage().unwrap_or(UsageType::Unspecified);
        let mut credentials = Vec::new();

        for role in self.roles(criteria)? {
            // Only the role's own entity is stamped: the cache outlives any
            // one caller's criteria.
            let entity_id = role.entity_id();

            for kd in role.key_descriptors_for_usage(usage) {
                match self.credentials_for(kd, &role, entity_id.as_deref()) {
                    Ok(found) => credentials.extend(found),
                    Err(err) if !self.config.fail_on_key_info_error => {
                        warn!(
                            entity_id = entity_id.as_deref(),
                            role = %role.role_type(),
                            error = %err,
                            "Skipping key descriptor with unusable KeyInfo"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        Ok(credentials)
    }
}
