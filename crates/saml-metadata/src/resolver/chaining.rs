//! Resolver that consults other resolvers in order.

use std::sync::Arc;

use tracing::warn;

use super::MetadataResolver;
use crate::criteria::CriteriaSet;
use crate::error::{MetadataError, MetadataResult};
use crate::types::EntityDescriptor;

/// Asks each member resolver in turn and returns the first non-empty
/// result.
///
/// A member that fails is logged and skipped. The first failure is only
/// returned when no member produced a result.
#[derive(Debug)]
pub struct ChainingMetadataResolver {
    id: String,
    resolvers: Vec<Arc<dyn MetadataResolver>>,
}

impl ChainingMetadataResolver {
    /// Creates a chain over `resolvers`.
    pub fn new(id: impl Into<String>, resolvers: Vec<Arc<dyn MetadataResolver>>) -> Self {
        Self {
            id: id.into(),
            resolvers,
        }
    }

    /// Returns the member resolvers.
    #[must_use]
    pub fn resolvers(&self) -> &[Arc<dyn MetadataResolver>] {
        &self.resolvers
    }
}

impl MetadataResolver for ChainingMetadataResolver {
    fn id(&self) -> &str {
        &self.id
    }

    fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<EntityDescriptor>>> {
        let mut first_error: Option<MetadataError> = None;

        for resolver in &self.resolvers {
            match resolver.resolve(criteria) {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(_) => {}
                Err(err) => {
                    warn!(
                        chain = %self.id,
                        resolver = %resolver.id(),
                        error = %err,
                        "Member metadata resolver failed; trying the next one"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(Vec::new()),
        }
    }
}
