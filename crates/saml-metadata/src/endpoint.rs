//! Endpoint resolution.
//!
//! Picks the endpoint to talk to for a given role, following the SAML
//! default-endpoint rules for indexed endpoints:
//!
//! 1. The first indexed endpoint with `isDefault="true"` is the default.
//! 2. Otherwise the first indexed endpoint without an `isDefault`
//!    attribute is the default.
//! 3. Endpoints with `isDefault="false"` are never the default.
//!
//! The default goes first; every other candidate follows in document
//! order.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::criteria::CriteriaSet;
use crate::error::{MetadataError, MetadataResult};
use crate::index::canonicalize_location;
use crate::types::Endpoint;

/// Per-candidate acceptance hook.
pub trait EndpointCheck: Send + Sync + fmt::Debug {
    /// Returns true if `candidate` may be returned for `criteria`.
    fn check(&self, candidate: &Endpoint, criteria: &CriteriaSet) -> bool;
}

/// Accepts every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl EndpointCheck for AcceptAll {
    fn check(&self, _candidate: &Endpoint, _criteria: &CriteriaSet) -> bool {
        true
    }
}

/// Accepts candidates consistent with the endpoint template and the
/// binding criterion.
///
/// A candidate must carry a binding. Each of binding, location, response
/// location and index that the template sets must match. With a binding
/// criterion the candidate's binding must be one of the listed bindings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEndpointCheck;

fn same_location(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| canonicalize_location(a) == canonicalize_location(b))
}

impl EndpointCheck for TemplateEndpointCheck {
    fn check(&self, candidate: &Endpoint, criteria: &CriteriaSet) -> bool {
        let Some(binding) = candidate.binding() else {
            return false;
        };

        if let Some(template) = criteria.endpoint() {
            if template.binding().is_some_and(|b| b != binding) {
                return false;
            }
            if template
                .location()
                .is_some_and(|loc| !same_location(candidate.location(), loc))
            {
                return false;
            }
            if template
                .response_location()
                .is_some_and(|loc| !same_location(candidate.response_location(), loc))
            {
                return false;
            }
            if let Some(wanted) = template.indexed() {
                if candidate.indexed().map(|i| i.index) != Some(wanted.index) {
                    return false;
                }
            }
        }

        criteria
            .bindings()
            .map_or(true, |allowed| allowed.iter().any(|b| b == binding))
    }
}

/// Resolves endpoints from a role descriptor criterion.
#[derive(Debug, Clone, Default)]
pub struct EndpointResolver<C = AcceptAll> {
    check: C,
}

/// Endpoint resolver that checks candidates against the template.
pub type DefaultEndpointResolver = EndpointResolver<TemplateEndpointCheck>;

impl EndpointResolver<AcceptAll> {
    /// Creates a resolver that accepts every candidate.
    #[must_use]
    pub const fn new() -> Self {
        Self { check: AcceptAll }
    }
}

impl<C: EndpointCheck> EndpointResolver<C> {
    /// Creates a resolver with a custom check.
    #[must_use]
    pub const fn with_check(check: C) -> Self {
        Self { check }
    }

    /// Returns all acceptable endpoints, default first.
    ///
    /// A signed request whose template already names a binding and a
    /// location is answered with the template itself, without consulting
    /// metadata. Otherwise candidates come from the role descriptor
    /// criterion; without one the result is empty.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingCriterion`] if there is no endpoint
    /// criterion.
    pub fn resolve(&self, criteria: &CriteriaSet) -> MetadataResult<Vec<Arc<Endpoint>>> {
        let template = criteria.endpoint().ok_or_else(|| {
            MetadataError::MissingCriterion("EndpointCriterion is required".to_string())
        })?;

        if criteria.is_signed_request() && Self::can_use_requested_endpoint(template) {
            debug!(
                binding = template.binding().unwrap_or_default(),
                "Using endpoint from signed request"
            );
            return Ok(vec![Arc::clone(template)]);
        }

        let Some(role) = criteria.role_descriptor() else {
            debug!("No role descriptor criterion; no endpoint candidates");
            return Ok(Vec::new());
        };

        let candidates: Vec<_> = role
            .endpoints_of_type(template.endpoint_type())
            .cloned()
            .collect();
        trace!(
            endpoint_type = %template.endpoint_type(),
            candidates = candidates.len(),
            "Endpoint candidates from metadata"
        );

        Ok(sort_candidates(candidates)
            .into_iter()
            .filter(|candidate| self.check.check(candidate, criteria))
            .collect())
    }

    /// Returns the first acceptable endpoint.
    ///
    /// # Errors
    ///
    /// See [`EndpointResolver::resolve`].
    pub fn resolve_single(&self, criteria: &CriteriaSet) -> MetadataResult<Option<Arc<Endpoint>>> {
        Ok(self.resolve(criteria)?.into_iter().next())
    }

    fn can_use_requested_endpoint(template: &Endpoint) -> bool {
        template.binding().is_some()
            && (template.location().is_some() || template.response_location().is_some())
    }
}

/// Orders candidates so the default endpoint comes first; the rest keep
/// document order.
#[must_use]
pub fn sort_candidates(mut candidates: Vec<Arc<Endpoint>>) -> Vec<Arc<Endpoint>> {
    let explicit = candidates
        .iter()
        .position(|e| e.indexed().is_some_and(|i| i.is_default == Some(true)));
    let chosen = explicit.or_else(|| {
        candidates
            .iter()
            .position(|e| e.indexed().is_some_and(|i| i.is_default.is_none()))
    });

    if let Some(pos) = chosen {
        let default = candidates.remove(pos);
        candidates.insert(0, default);
    }
    candidates
}
