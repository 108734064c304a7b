//! Entity and entity-group descriptors, and metadata documents.
//!
//! Metadata exists in two forms. The `*Builder` types are the mutable,
//! unpublished form produced by unmarshalling and edited by filters. Calling
//! `build`/`publish` turns them into an immutable `Arc` graph in which every
//! child holds a `Weak` link to its parent. Parent links are used for lookup
//! only (entity ID of a role, extension inheritance, validity of enclosing
//! groups) and never keep a graph alive.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{QName, RoleDescriptor, RoleDescriptorBuilder};

/// Metadata extensions relevant to resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    /// `mdrpi:RegistrationInfo/@registrationAuthority`.
    pub registration_authority: Option<String>,
    /// `mdrpi:RegistrationInfo/@registrationInstant`.
    pub registration_instant: Option<DateTime<Utc>>,
    /// `mdattr:EntityAttributes`, attribute name to values.
    pub entity_attributes: BTreeMap<String, Vec<String>>,
}

impl Extensions {
    /// Returns true if no extension is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registration_authority.is_none()
            && self.registration_instant.is_none()
            && self.entity_attributes.is_empty()
    }
}

/// An `md:AffiliationDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationDescriptor {
    /// `affiliationOwnerID`.
    pub owner_id: String,
    /// `md:AffiliateMember` entity IDs.
    pub members: Vec<String>,
}

// ============================================================================
// EntityDescriptor
// ============================================================================

/// A published `md:EntityDescriptor`.
#[derive(Debug)]
pub struct EntityDescriptor {
    entity_id: String,
    id: Option<String>,
    valid_until: Option<DateTime<Utc>>,
    cache_duration: Option<Duration>,
    extensions: Extensions,
    affiliation: Option<AffiliationDescriptor>,
    roles: Vec<Arc<RoleDescriptor>>,
    parent: Weak<EntitiesDescriptor>,
}

impl EntityDescriptor {
    /// Returns the entity ID. Compare it byte for byte; it is opaque.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Returns the XML `ID` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `validUntil`.
    #[must_use]
    pub const fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    /// Returns `cacheDuration`.
    #[must_use]
    pub const fn cache_duration(&self) -> Option<Duration> {
        self.cache_duration
    }

    /// Returns the entity's own extensions.
    #[must_use]
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the affiliation descriptor, if this entity is an affiliation.
    #[must_use]
    pub const fn affiliation(&self) -> Option<&AffiliationDescriptor> {
        self.affiliation.as_ref()
    }

    /// Returns all role descriptors in document order.
    #[must_use]
    pub fn role_descriptors(&self) -> &[Arc<RoleDescriptor>] {
        &self.roles
    }

    /// Returns the role descriptors of the given type in document order.
    #[must_use]
    pub fn role_descriptors_of_type(&self, role: &QName) -> Vec<Arc<RoleDescriptor>> {
        self.roles
            .iter()
            .filter(|r| r.is_of_type(role))
            .cloned()
            .collect()
    }

    /// Returns the role descriptors of the given type that list `protocol`
    /// in their `protocolSupportEnumeration`, in document order.
    #[must_use]
    pub fn role_descriptors_for_protocol(
        &self,
        role: &QName,
        protocol: &str,
    ) -> Vec<Arc<RoleDescriptor>> {
        self.roles
            .iter()
            .filter(|r| r.is_of_type(role) && r.supports_protocol(protocol))
            .cloned()
            .collect()
    }

    /// Returns the enclosing group, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<EntitiesDescriptor>> {
        self.parent.upgrade()
    }

    /// Returns the enclosing groups, innermost first.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Arc<EntitiesDescriptor>> {
        let mut out = Vec::new();
        let mut next = self.parent();
        while let Some(group) = next {
            next = group.parent();
            out.push(group);
        }
        out
    }

    /// Returns the registration authority, inherited from the nearest
    /// enclosing group when the entity does not declare one.
    #[must_use]
    pub fn registration_authority(&self) -> Option<String> {
        if let Some(authority) = &self.extensions.registration_authority {
            return Some(authority.clone());
        }
        self.ancestors()
            .into_iter()
            .find_map(|group| group.extensions().registration_authority.clone())
    }

    /// Returns the values of an entity attribute.
    #[must_use]
    pub fn entity_attribute(&self, name: &str) -> Option<&[String]> {
        self.extensions
            .entity_attributes
            .get(name)
            .map(Vec::as_slice)
    }
}

/// Mutable, unpublished form of an [`EntityDescriptor`].
#[derive(Debug)]
pub struct EntityDescriptorBuilder {
    /// `entityID`.
    pub entity_id: String,
    /// XML `ID`.
    pub id: Option<String>,
    /// `validUntil`.
    pub valid_until: Option<DateTime<Utc>>,
    /// `cacheDuration`.
    pub cache_duration: Option<Duration>,
    /// Extensions.
    pub extensions: Extensions,
    /// Affiliation.
    pub affiliation: Option<AffiliationDescriptor>,
    /// Role descriptors.
    pub roles: Vec<RoleDescriptorBuilder>,
}

impl EntityDescriptorBuilder {
    /// Starts an entity with the given ID.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            id: None,
            valid_until: None,
            cache_duration: None,
            extensions: Extensions::default(),
            affiliation: None,
            roles: Vec::new(),
        }
    }

    /// Sets the XML `ID`.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets `validUntil`.
    #[must_use]
    pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Sets `cacheDuration`.
    #[must_use]
    pub fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.cache_duration = Some(duration);
        self
    }

    /// Sets the registration authority.
    #[must_use]
    pub fn with_registration_authority(mut self, authority: impl Into<String>) -> Self {
        self.extensions.registration_authority = Some(authority.into());
        self
    }

    /// Adds an entity attribute value.
    #[must_use]
    pub fn with_entity_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.extensions
            .entity_attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Sets the affiliation descriptor.
    #[must_use]
    pub fn with_affiliation(mut self, affiliation: AffiliationDescriptor) -> Self {
        self.affiliation = Some(affiliation);
        self
    }

    /// Adds a role descriptor.
    #[must_use]
    pub fn with_role(mut self, role: RoleDescriptorBuilder) -> Self {
        self.roles.push(role);
        self
    }

    /// Publishes a top-level entity.
    #[must_use]
    pub fn build(self) -> Arc<EntityDescriptor> {
        self.build_in(Weak::new())
    }

    pub(crate) fn build_in(self, parent: Weak<EntitiesDescriptor>) -> Arc<EntityDescriptor> {
        let Self {
            entity_id,
            id,
            valid_until,
            cache_duration,
            extensions,
            affiliation,
            roles,
        } = self;

        Arc::new_cyclic(|me| EntityDescriptor {
            entity_id,
            id,
            valid_until,
            cache_duration,
            extensions,
            affiliation,
            roles: roles.into_iter().map(|r| r.build_in(me.clone())).collect(),
            parent,
        })
    }
}

// ============================================================================
// EntitiesDescriptor
// ============================================================================

/// A member of an entity group, in document order.
#[derive(Debug, Clone)]
pub enum GroupMember {
    /// A nested entity.
    Entity(Arc<EntityDescriptor>),
    /// A nested group.
    Group(Arc<EntitiesDescriptor>),
}

/// A published `md:EntitiesDescriptor`.
#[derive(Debug)]
pub struct EntitiesDescriptor {
    name: Option<String>,
    id: Option<String>,
    valid_until: Option<DateTime<Utc>>,
    cache_duration: Option<Duration>,
    extensions: Extensions,
    members: Vec<GroupMember>,
    parent: Weak<EntitiesDescriptor>,
}

impl EntitiesDescriptor {
    /// Returns the group `Name`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the XML `ID`.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns `validUntil`.
    #[must_use]
    pub const fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    /// Returns `cacheDuration`.
    #[must_use]
    pub const fn cache_duration(&self) -> Option<Duration> {
        self.cache_duration
    }

    /// Returns the group's extensions.
    #[must_use]
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the direct members in document order.
    #[must_use]
    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    /// Returns every entity in this group and its nested groups, in
    /// document order.
    #[must_use]
    pub fn all_entities(&self) -> Vec<Arc<EntityDescriptor>> {
        let mut out = Vec::new();
        self.collect_entities(&mut out);
        out
    }

    fn collect_entities(&self, out: &mut Vec<Arc<EntityDescriptor>>) {
        for member in &self.members {
            match member {
                GroupMember::Entity(entity) => out.push(Arc::clone(entity)),
                GroupMember::Group(group) => group.collect_entities(out),
            }
        }
    }

    /// Returns the enclosing group, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Arc<EntitiesDescriptor>> {
        self.parent.upgrade()
    }
}

/// Unpublished member of an entity group.
#[derive(Debug)]
pub enum GroupMemberBuilder {
    /// A nested entity.
    Entity(EntityDescriptorBuilder),
    /// A nested group.
    Group(EntitiesDescriptorBuilder),
}

/// Mutable, unpublished form of an [`EntitiesDescriptor`].
#[derive(Debug, Default)]
pub struct EntitiesDescriptorBuilder {
    /// `Name`.
    pub name: Option<String>,
    /// XML `ID`.
    pub id: Option<String>,
    /// `validUntil`.
    pub valid_until: Option<DateTime<Utc>>,
    /// `cacheDuration`.
    pub cache_duration: Option<Duration>,
    /// Extensions.
    pub extensions: Extensions,
    /// Members in document order.
    pub members: Vec<GroupMemberBuilder>,
}

impl EntitiesDescriptorBuilder {
    /// Starts an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets `validUntil`.
    #[must_use]
    pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Sets the registration authority.
    #[must_use]
    pub fn with_registration_authority(mut self, authority: impl Into<String>) -> Self {
        self.extensions.registration_authority = Some(authority.into());
        self
    }

    /// Adds an entity.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityDescriptorBuilder) -> Self {
        self.members.push(GroupMemberBuilder::Entity(entity));
        self
    }

    /// Adds a nested group.
    #[must_use]
    pub fn with_group(mut self, group: Self) -> Self {
        self.members.push(GroupMemberBuilder::Group(group));
        self
    }

    /// Removes, at any depth, every entity for which `keep` returns false.
    /// Returns the number of entities removed.
    pub fn retain_entities<F>(&mut self, keep: &mut F) -> usize
    where
        F: FnMut(&EntityDescriptorBuilder) -> bool,
    {
        let mut removed = 0;
        self.members.retain_mut(|member| match member {
            GroupMemberBuilder::Entity(entity) => {
                let kept = keep(entity);
                if !kept {
                    removed += 1;
                }
                kept
            }
            GroupMemberBuilder::Group(group) => {
                removed += group.retain_entities(keep);
                true
            }
        });
        removed
    }

    /// Visits every entity at any depth.
    pub fn for_each_entity<F>(&self, visit: &mut F)
    where
        F: FnMut(&EntityDescriptorBuilder),
    {
        for member in &self.members {
            match member {
                GroupMemberBuilder::Entity(entity) => visit(entity),
                GroupMemberBuilder::Group(group) => group.for_each_entity(visit),
            }
        }
    }

    /// Publishes a top-level group.
    #[must_use]
    pub fn build(self) -> Arc<EntitiesDescriptor> {
        self.build_in(Weak::new())
    }

    fn build_in(self, parent: Weak<EntitiesDescriptor>) -> Arc<EntitiesDescriptor> {
        let Self {
            name,
            id,
            valid_until,
            cache_duration,
            extensions,
            members,
        } = self;

        Arc::new_cyclic(|me| EntitiesDescriptor {
            name,
            id,
            valid_until,
            cache_duration,
            extensions,
            members: members
                .into_iter()
                .map(|member| match member {
                    GroupMemberBuilder::Entity(entity) => {
                        GroupMember::Entity(entity.build_in(me.clone()))
                    }
                    GroupMemberBuilder::Group(group) => {
                        GroupMember::Group(group.build_in(me.clone()))
                    }
                })
                .collect(),
            parent,
        })
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Root element of an unpublished metadata document.
#[derive(Debug)]
pub enum DocumentRoot {
    /// A single `md:EntityDescriptor`.
    Entity(EntityDescriptorBuilder),
    /// An `md:EntitiesDescriptor`.
    Entities(EntitiesDescriptorBuilder),
}

/// A metadata document between unmarshalling and publication.
#[derive(Debug, Default)]
pub struct MetadataDocument {
    /// The root element. `None` once a filter has removed everything.
    pub root: Option<DocumentRoot>,
    /// Raw bytes the document was read from, kept for filters that need the
    /// original serialization (signature checks). Released before publishing.
    pub source: Option<Vec<u8>>,
}

impl MetadataDocument {
    /// Wraps a single entity.
    #[must_use]
    pub const fn from_entity(entity: EntityDescriptorBuilder) -> Self {
        Self {
            root: Some(DocumentRoot::Entity(entity)),
            source: None,
        }
    }

    /// Wraps a group.
    #[must_use]
    pub const fn from_entities(group: EntitiesDescriptorBuilder) -> Self {
        Self {
            root: Some(DocumentRoot::Entities(group)),
            source: None,
        }
    }

    /// Attaches the raw source bytes.
    #[must_use]
    pub fn with_source(mut self, source: Vec<u8>) -> Self {
        self.source = Some(source);
        self
    }

    /// Returns the `validUntil` of the root element.
    #[must_use]
    pub fn root_valid_until(&self) -> Option<DateTime<Utc>> {
        match &self.root {
            Some(DocumentRoot::Entity(entity)) => entity.valid_until,
            Some(DocumentRoot::Entities(group)) => group.valid_until,
            None => None,
        }
    }

    /// Publishes the document as an immutable graph.
    #[must_use]
    pub fn publish(self) -> Option<MetadataRoot> {
        self.root.map(|root| match root {
            DocumentRoot::Entity(entity) => MetadataRoot::Entity(entity.build()),
            DocumentRoot::Entities(group) => MetadataRoot::Entities(group.build()),
        })
    }
}

/// Root of a published metadata graph.
#[derive(Debug, Clone)]
pub enum MetadataRoot {
    /// A single entity.
    Entity(Arc<EntityDescriptor>),
    /// A group of entities.
    Entities(Arc<EntitiesDescriptor>),
}

impl MetadataRoot {
    /// Returns every entity in document order.
    #[must_use]
    pub fn entities(&self) -> Vec<Arc<EntityDescriptor>> {
        match self {
            Self::Entity(entity) => vec![Arc::clone(entity)],
            Self::Entities(group) => group.all_entities(),
        }
    }
}
