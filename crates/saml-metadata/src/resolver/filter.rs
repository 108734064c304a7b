//! Metadata filters.
//!
//! Filters run on the unpublished document between unmarshalling and
//! publication. They may reject the document outright or edit it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::FilterError;
use crate::types::{DocumentRoot, MetadataDocument};

/// A step in metadata processing.
pub trait MetadataFilter: Send + Sync + fmt::Debug {
    /// Returns the filter's name, used in errors.
    fn name(&self) -> &str;

    /// Filters `document` in place.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the document is rejected or cannot be
    /// processed.
    fn filter(&self, document: &mut MetadataDocument) -> Result<(), FilterError>;
}

/// Runs filters in order, stopping at the first failure.
#[derive(Debug, Default, Clone)]
pub struct MetadataFilterChain {
    filters: Vec<Arc<dyn MetadataFilter>>,
}

impl MetadataFilterChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter.
    #[must_use]
    pub fn with(mut self, filter: impl MetadataFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Returns the number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if the chain has no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl MetadataFilter for MetadataFilterChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn filter(&self, document: &mut MetadataDocument) -> Result<(), FilterError> {
        for filter in &self.filters {
            filter.filter(document)?;
        }
        Ok(())
    }
}

/// Whether an [`EntityIdFilter`] keeps or drops the listed entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityIdFilterMode {
    /// Keep only the listed entities.
    Include,
    /// Drop the listed entities.
    Exclude,
}

/// Keeps or drops entities by entity ID.
#[derive(Debug, Clone)]
pub struct EntityIdFilter {
    mode: EntityIdFilterMode,
    entity_ids: HashSet<String>,
}

impl EntityIdFilter {
    /// Keeps only the given entities.
    pub fn include<I, S>(entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: EntityIdFilterMode::Include,
            entity_ids: entity_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Drops the given entities.
    pub fn exclude<I, S>(entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: EntityIdFilterMode::Exclude,
            entity_ids: entity_ids.into_iter().map(Into::into).collect(),
        }
    }

    fn keeps(&self, entity_id: &str) -> bool {
        let listed = self.entity_ids.contains(entity_id);
        match self.mode {
            EntityIdFilterMode::Include => listed,
            EntityIdFilterMode::Exclude => !listed,
        }
    }
}

impl MetadataFilter for EntityIdFilter {
    fn name(&self) -> &str {
        "entity-id"
    }

    fn filter(&self, document: &mut MetadataDocument) -> Result<(), FilterError> {
        match &mut document.root {
            Some(DocumentRoot::Entity(entity)) => {
                if !self.keeps(&entity.entity_id) {
                    debug!(entity_id = %entity.entity_id, "Entity removed by filter");
                    document.root = None;
                }
            }
            Some(DocumentRoot::Entities(group)) => {
                let removed = group.retain_entities(&mut |entity| self.keeps(&entity.entity_id));
                if removed > 0 {
                    debug!(removed, "Entities removed by filter");
                }
            }
            None => {}
        }
        Ok(())
    }
}

/// Requires the document root to carry a `validUntil`, optionally no
/// further in the future than a maximum interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValidUntilFilter {
    max_validity: Option<Duration>,
    now: Option<DateTime<Utc>>,
}

impl RequiredValidUntilFilter {
    /// Requires a `validUntil` of any distance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_validity: None,
            now: None,
        }
    }

    /// Also rejects a `validUntil` more than `max_validity` from now.
    #[must_use]
    pub const fn with_max_validity(mut self, max_validity: Duration) -> Self {
        self.max_validity = Some(max_validity);
        self
    }

    /// Evaluates against a fixed instant instead of the system clock.
    #[must_use]
    pub const fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

impl MetadataFilter for RequiredValidUntilFilter {
    fn name(&self) -> &str {
        "required-valid-until"
    }

    fn filter(&self, document: &mut MetadataDocument) -> Result<(), FilterError> {
        if document.root.is_none() {
            return Ok(());
        }

        let valid_until = document.root_valid_until().ok_or_else(|| FilterError::Rejected {
            filter: self.name().to_string(),
            reason: "metadata does not carry a validUntil".to_string(),
        })?;

        if let Some(max) = self.max_validity {
            let now = self.now.unwrap_or_else(Utc::now);
            if valid_until > now + max {
                return Err(FilterError::Rejected {
                    filter: self.name().to_string(),
                    reason: format!("validUntil {valid_until} is more than {max} in the future"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntitiesDescriptorBuilder, EntityDescriptorBuilder};

    fn group() -> MetadataDocument {
        MetadataDocument::from_entities(
            EntitiesDescriptorBuilder::new()
                .with_entity(EntityDescriptorBuilder::new("a"))
                .with_entity(EntityDescriptorBuilder::new("b"))
                .with_group(
                    EntitiesDescriptorBuilder::new().with_entity(EntityDescriptorBuilder::new("c")),
                ),
        )
    }

    fn ids(document: MetadataDocument) -> Vec<String> {
        document
            .publish()
            .map(|root| root.entities().iter().map(|e| e.entity_id().to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn include_and_exclude() {
        let mut doc = group();
        EntityIdFilter::include(["a", "c"]).filter(&mut doc).unwrap();
        assert_eq!(ids(doc), ["a", "c"]);

        let mut doc = group();
        EntityIdFilter::exclude(["a"]).filter(&mut doc).unwrap();
        assert_eq!(ids(doc), ["b", "c"]);
    }

    #[test]
    fn excluded_single_entity_empties_document() {
        let mut doc = MetadataDocument::from_entity(EntityDescriptorBuilder::new("a"));
        EntityIdFilter::exclude(["a"]).filter(&mut doc).unwrap();
        assert!(doc.root.is_none());
    }

    #[test]
    fn valid_until_is_required() {
        let mut doc = group();
        let err = RequiredValidUntilFilter::new().filter(&mut doc).unwrap_err();
        assert!(matches!(err, FilterError::Rejected { .. }));
    }

    #[test]
    fn valid_until_too_far_out_is_rejected() {
        let now = Utc::now();
        let filter = RequiredValidUntilFilter::new()
            .with_max_validity(Duration::days(14))
            .at(now);

        let mut near = MetadataDocument::from_entities(
            EntitiesDescriptorBuilder::new().with_valid_until(now + Duration::days(7)),
        );
        assert!(filter.filter(&mut near).is_ok());

        let mut far = MetadataDocument::from_entities(
            EntitiesDescriptorBuilder::new().with_valid_until(now + Duration::days(30)),
        );
        assert!(filter.filter(&mut far).is_err());
    }

    #[test]
    fn chain_stops_at_first_failure() {
        let chain = MetadataFilterChain::new()
            .with(RequiredValidUntilFilter::new())
            .with(EntityIdFilter::exclude(["a"]));
        let mut doc = group();
        assert!(chain.filter(&mut doc).is_err());
        assert_eq!(ids(doc).len(), 3);
    }
}
