//! Secondary index scenarios.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use saml_metadata::index::{
    FunctionDrivenMetadataIndex, MetadataIndex, MetadataIndexKey, MetadataIndexManager,
    RoleMetadataIndex,
};
use saml_metadata::{
    endpoints, roles, CriteriaSet, Endpoint, MetadataResolver, SamlArtifact, SAML20P_NS,
};

use crate::common::{federation_resolver, IDP_ENTITY_ID, SP_ACS, SP_ENTITY_ID};

fn entity_ids(found: &[Arc<saml_metadata::EntityDescriptor>]) -> Vec<&str> {
    found.iter().map(|e| e.entity_id()).collect()
}

/// Tests that a role query without entity ID is answered by the role index.
#[test]
fn role_index_round_trip() -> anyhow::Result<()> {
    let resolver = federation_resolver()?;

    let found = resolver.resolve(&CriteriaSet::new().with_role(roles::SP_SSO_DESCRIPTOR))?;
    assert_eq!(entity_ids(&found), [SP_ENTITY_ID]);

    let found = resolver.resolve(
        &CriteriaSet::new()
            .with_role(roles::IDP_SSO_DESCRIPTOR)
            .with_protocol(SAML20P_NS),
    )?;
    assert_eq!(entity_ids(&found), [IDP_ENTITY_ID]);
    Ok(())
}

/// Tests that an endpoint location finds the entity that publishes it.
#[test]
fn endpoint_index_round_trip() -> anyhow::Result<()> {
    let resolver = federation_resolver()?;

    let criteria = CriteriaSet::new()
        .with_role(roles::SP_SSO_DESCRIPTOR)
        .with_endpoint(
            Endpoint::template(endpoints::ASSERTION_CONSUMER_SERVICE).with_location(SP_ACS),
        );
    let found = resolver.resolve_single(&criteria)?.context("SP not found by ACS location")?;
    assert_eq!(found.entity_id(), SP_ENTITY_ID);
    Ok(())
}

/// Tests that a SAML 2.0 artifact resolves its issuer through the SourceID.
#[test]
fn artifact_source_id_round_trip() -> anyhow::Result<()> {
    let resolver = federation_resolver()?;

    let mut bytes = vec![0x00, 0x04, 0x00, 0x00];
    bytes.extend_from_slice(&saml_crypto::source_id(IDP_ENTITY_ID));
    bytes.extend_from_slice(&[0x5a; 20]);
    let artifact = SamlArtifact::from_bytes(&bytes)?;

    let found = resolver.resolve(&CriteriaSet::new().with_artifact(artifact))?;
    assert_eq!(entity_ids(&found), [IDP_ENTITY_ID]);
    Ok(())
}

/// Tests that indexes which cannot interpret the criteria contribute nothing.
#[test]
fn uninterpretable_criteria_are_a_no_op() -> anyhow::Result<()> {
    let resolver = federation_resolver()?;
    let store = resolver.backing_store();

    let criteria = CriteriaSet::new().with_protocol(SAML20P_NS);
    assert!(store.secondary_index().lookup_entity_descriptors(&criteria).is_none());
    assert!(resolver.resolve(&criteria)?.is_empty());

    let silent = FunctionDrivenMetadataIndex::new("silent", |_| None, |_| Some(HashSet::new()));
    let manager = MetadataIndexManager::new([
        Arc::new(silent) as Arc<dyn MetadataIndex>,
        Arc::new(RoleMetadataIndex::new()) as Arc<dyn MetadataIndex>,
    ]);
    for entity in store.ordered_descriptors() {
        manager.index_entity_descriptor(entity);
    }
    let found = manager
        .lookup_entity_descriptors(&CriteriaSet::new().with_role(roles::IDP_SSO_DESCRIPTOR))
        .context("role index should apply")?;
    assert_eq!(entity_ids(&found), [IDP_ENTITY_ID]);
    Ok(())
}

/// Tests that a custom function index meets its own keys.
#[test]
fn function_index_round_trip() -> anyhow::Result<()> {
    let resolver = federation_resolver()?;

    let by_host = FunctionDrivenMetadataIndex::new(
        "host",
        |entity| {
            let host = entity.entity_id().split('/').nth(2)?;
            Some(HashSet::from([MetadataIndexKey::Custom(host.to_string())]))
        },
        |criteria| {
            let host = criteria.protocol()?.strip_prefix("host:")?;
            Some(HashSet::from([MetadataIndexKey::Custom(host.to_string())]))
        },
    );
    let manager = MetadataIndexManager::new([Arc::new(by_host) as Arc<dyn MetadataIndex>]);
    for entity in resolver.backing_store().ordered_descriptors() {
        manager.index_entity_descriptor(entity);
    }

    let found = manager
        .lookup_entity_descriptors(&CriteriaSet::new().with_protocol("host:sp.example.org"))
        .context("function index should apply")?;
    assert_eq!(entity_ids(&found), [SP_ENTITY_ID]);
    Ok(())
}
