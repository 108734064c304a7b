//! Index by endpoint location.

use std::collections::{HashMap, HashSet};

use super::{EndpointKey, MetadataIndex, MetadataIndexKey};
use crate::criteria::CriteriaSet;
use crate::types::{EntityDescriptor, QName};

/// Which endpoint types of which roles are indexed.
///
/// An empty selection indexes every endpoint of every role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSelection {
    by_role: HashMap<QName, HashSet<QName>>,
}

impl EndpointSelection {
    /// Selects every endpoint.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds endpoint types to index for a role type.
    #[must_use]
    pub fn with<I>(mut self, role: QName, endpoint_types: I) -> Self
    where
        I: IntoIterator<Item = QName>,
    {
        self.by_role.entry(role).or_default().extend(endpoint_types);
        self
    }

    /// Returns true if endpoints of `endpoint_type` in roles of `role` are
    /// indexed.
    #[must_use]
    pub fn is_selected(&self, role: &QName, endpoint_type: &QName) -> bool {
        self.by_role.is_empty()
            || self
                .by_role
                .get(role)
                .is_some_and(|types| types.contains(endpoint_type))
    }
}

/// Indexes entities by the locations of their endpoints.
///
/// Each endpoint yields one key for its location and one for its response
/// location. Queries need both an entity role criterion and an endpoint
/// criterion whose template carries a location or response location.
#[derive(Debug, Clone, Default)]
pub struct EndpointMetadataIndex {
    selection: EndpointSelection,
}

impl EndpointMetadataIndex {
    /// Creates an index over every endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index limited to `selection`.
    #[must_use]
    pub const fn with_selection(selection: EndpointSelection) -> Self {
        Self { selection }
    }

    /// Returns the selection.
    #[must_use]
    pub const fn selection(&self) -> &EndpointSelection {
        &self.selection
    }
}

impl MetadataIndex for EndpointMetadataIndex {
    fn name(&self) -> &str {
        "endpoint"
    }

    fn generate_keys_from_descriptor(
        &self,
        descriptor: &EntityDescriptor,
    ) -> Option<HashSet<MetadataIndexKey>> {
        let mut keys = HashSet::new();

        for role in descriptor.role_descriptors() {
            let role_type = role.role_type();
            for endpoint in role.endpoints() {
                let endpoint_type = endpoint.endpoint_type();
                if !self.selection.is_selected(role_type, endpoint_type) {
                    continue;
                }
                if let Some(location) = endpoint.location() {
                    keys.insert(MetadataIndexKey::Endpoint(EndpointKey::new(
                        role_type.clone(),
                        endpoint_type.clone(),
                        location,
                        false,
                    )));
                }
                if let Some(location) = endpoint.response_location() {
                    keys.insert(MetadataIndexKey::Endpoint(EndpointKey::new(
                        role_type.clone(),
                        endpoint_type.clone(),
                        location,
                        true,
                    )));
                }
            }
        }

        (!keys.is_empty()).then_some(keys)
    }

    fn generate_keys_from_criteria(
        &self,
        criteria: &CriteriaSet,
    ) -> Option<HashSet<MetadataIndexKey>> {
        let role = criteria.entity_role()?;
        let template = criteria.endpoint()?;
        let endpoint_type = template.endpoint_type();
        if !self.selection.is_selected(role, endpoint_type) {
            return None;
        }

        let mut keys = HashSet::new();
        if let Some(location) = template.location() {
            keys.insert(MetadataIndexKey::Endpoint(EndpointKey::new(
                role.clone(),
                endpoint_type.clone(),
                location,
                false,
            )));
        }
        if let Some(location) = template.response_location() {
            keys.insert(MetadataIndexKey::Endpoint(EndpointKey::new(
                role.clone(),
                endpoint_type.clone(),
                location,
                true,
            )));
        }

        (!keys.is_empty()).then_some(keys)
    }
}
