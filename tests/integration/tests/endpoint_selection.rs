//! Endpoint selection scenarios.

use std::sync::Arc;

use anyhow::Context;
use saml_metadata::{
    endpoints, roles, BasicRoleDescriptorResolver, CriteriaSet, DefaultEndpointResolver,
    Endpoint, EndpointResolver, RoleDescriptor, RoleDescriptorBuilder, RoleDescriptorResolver,
    SamlBinding,
};

use crate::common::{federation_resolver, SP_ACS, SP_ENTITY_ID};

fn acs(location: &str, index: u16, is_default: Option<bool>) -> Endpoint {
    Endpoint::new(
        endpoints::ASSERTION_CONSUMER_SERVICE,
        SamlBinding::HttpPost.uri(),
        location,
    )
    .with_index(index, is_default)
}

fn sp_role(acs_endpoints: Vec<Endpoint>) -> Arc<RoleDescriptor> {
    acs_endpoints
        .into_iter()
        .fold(RoleDescriptorBuilder::new(roles::SP_SSO_DESCRIPTOR), |role, e| {
            role.with_endpoint(e)
        })
        .build()
}

fn resolve_acs(role: Arc<RoleDescriptor>) -> anyhow::Result<Vec<String>> {
    let criteria = CriteriaSet::new()
        .with_role_descriptor(role)
        .with_endpoint(Endpoint::template(endpoints::ASSERTION_CONSUMER_SERVICE));
    Ok(DefaultEndpointResolver::default()
        .resolve(&criteria)?
        .iter()
        .filter_map(|e| e.location().map(str::to_string))
        .collect())
}

/// Tests that an explicit default wins over an earlier implicit one.
#[test]
fn explicit_default_is_first() -> anyhow::Result<()> {
    let role = sp_role(vec![
        acs("https://sp.example.org/false", 0, Some(false)),
        acs("https://sp.example.org/absent", 1, None),
        acs("https://sp.example.org/true", 2, Some(true)),
    ]);
    assert_eq!(
        resolve_acs(role)?,
        [
            "https://sp.example.org/true",
            "https://sp.example.org/false",
            "https://sp.example.org/absent",
        ]
    );
    Ok(())
}

/// Tests that the first unflagged endpoint is the default otherwise.
#[test]
fn first_unflagged_is_default() -> anyhow::Result<()> {
    let role = sp_role(vec![
        acs("https://sp.example.org/a1", 0, None),
        acs("https://sp.example.org/a2", 1, None),
        acs("https://sp.example.org/false", 2, Some(false)),
    ]);
    assert_eq!(
        resolve_acs(role)?,
        [
            "https://sp.example.org/a1",
            "https://sp.example.org/a2",
            "https://sp.example.org/false",
        ]
    );
    Ok(())
}

/// Tests that a signed request's endpoint is used without metadata.
#[test]
fn signed_request_short_circuits_metadata() -> anyhow::Result<()> {
    let requested = Arc::new(
        Endpoint::template(endpoints::ASSERTION_CONSUMER_SERVICE)
            .with_binding(SamlBinding::HttpPost.uri())
            .with_location("https://unlisted.example.org/acs"),
    );
    let criteria = CriteriaSet::new()
        .with_endpoint(Arc::clone(&requested))
        .with_signed_request();

    let found = EndpointResolver::new()
        .resolve_single(&criteria)?
        .context("signed request endpoint")?;
    assert!(Arc::ptr_eq(&found, &requested));
    Ok(())
}

/// Tests endpoint selection against a role resolved from metadata.
#[test]
fn endpoint_from_resolved_role() -> anyhow::Result<()> {
    let metadata = federation_resolver()?;
    let role = BasicRoleDescriptorResolver::new(metadata)
        .resolve_single(
            &CriteriaSet::new()
                .with_entity_id(SP_ENTITY_ID)
                .with_role(roles::SP_SSO_DESCRIPTOR),
        )?
        .context("SP role")?;

    let criteria = CriteriaSet::new()
        .with_role_descriptor(role)
        .with_endpoint(Endpoint::template(endpoints::ASSERTION_CONSUMER_SERVICE))
        .with_bindings([SamlBinding::HttpPost.uri(), SamlBinding::HttpArtifact.uri()]);
    let endpoint = DefaultEndpointResolver::default()
        .resolve_single(&criteria)?
        .context("ACS endpoint")?;
    assert_eq!(endpoint.location(), Some(SP_ACS));

    let redirect_only = criteria.with_bindings([SamlBinding::HttpRedirect.uri()]);
    assert!(DefaultEndpointResolver::default()
        .resolve_single(&redirect_only)?
        .is_none());
    Ok(())
}
