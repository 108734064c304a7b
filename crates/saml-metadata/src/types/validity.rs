//! Descriptor validity checks.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{EntityDescriptor, RoleDescriptor};

/// Decides whether published metadata may still be used.
pub trait ValidityPredicate: Send + Sync + fmt::Debug {
    /// Returns true if the entity may be used.
    fn is_entity_valid(&self, entity: &EntityDescriptor) -> bool;

    /// Returns true if the role may be used.
    fn is_role_valid(&self, role: &RoleDescriptor) -> bool;
}

/// Time-window validity: a descriptor is valid until its own `validUntil`
/// and the `validUntil` of every enclosing element have passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeBoundValidity {
    now: Option<DateTime<Utc>>,
}

impl TimeBoundValidity {
    /// Checks against the system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self { now: None }
    }

    /// Checks against a fixed instant.
    #[must_use]
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn not_expired(valid_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        valid_until.map_or(true, |until| now < until)
    }

    fn entity_valid_at(entity: &EntityDescriptor, now: DateTime<Utc>) -> bool {
        Self::not_expired(entity.valid_until(), now)
            && entity
                .ancestors()
                .iter()
                .all(|group| Self::not_expired(group.valid_until(), now))
    }
}

impl ValidityPredicate for TimeBoundValidity {
    fn is_entity_valid(&self, entity: &EntityDescriptor) -> bool {
        Self::entity_valid_at(entity, self.now())
    }

    fn is_role_valid(&self, role: &RoleDescriptor) -> bool {
        let now = self.now();
        if !Self::not_expired(role.valid_until(), now) {
            return false;
        }
        role.entity()
            .map_or(true, |entity| Self::entity_valid_at(&entity, now))
    }
}
