//! Entity and role resolution scenarios.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use saml_metadata::resolver::{EntityIdFilter, StaticMetadataSource};
use saml_metadata::{
    roles, BaseMetadataResolver, BasicRoleDescriptorResolver, BatchMetadataResolver,
    ChainingMetadataResolver, CriteriaSet, EntitiesDescriptorBuilder, EntityDescriptorBuilder,
    MetadataDocument, MetadataError, MetadataResolver, RefreshableMetadataResolver,
    RoleDescriptorBuilder, RoleDescriptorResolver, SAML10P_NS, SAML11P_NS, SAML20P_NS,
};

use crate::common::{
    federation, federation_resolver, idp, init_tracing, IDP_ENTITY_ID, SP_ENTITY_ID,
};

/// Tests that looking up an unknown entity is not an error.
#[test]
fn lookup_miss_returns_none() -> anyhow::Result<()> {
    init_tracing();
    let resolver = BaseMetadataResolver::new("empty");
    resolver.initialize(|_| Ok(()))?;

    let found = resolver.resolve_single(&CriteriaSet::new().with_entity_id(IDP_ENTITY_ID))?;
    assert!(found.is_none());
    Ok(())
}

/// Tests that two descriptors with the same entity ID are both kept.
#[test]
fn duplicate_entity_ids_are_both_returned() -> anyhow::Result<()> {
    init_tracing();
    let resolver = BaseMetadataResolver::new("duplicates");
    resolver.initialize(|r| {
        r.load_document(MetadataDocument::from_entities(
            EntitiesDescriptorBuilder::new()
                .with_entity(EntityDescriptorBuilder::new("X").with_id("first"))
                .with_entity(EntityDescriptorBuilder::new("X").with_id("second")),
        ))
    })?;

    assert_eq!(resolver.backing_store().ordered_descriptors().len(), 2);

    let found = resolver.resolve(&CriteriaSet::new().with_entity_id("X"))?;
    assert_eq!(found.len(), 2);
    assert!(!Arc::ptr_eq(&found[0], &found[1]));
    assert_eq!(found[0].id(), Some("first"));
    assert_eq!(found[1].id(), Some("second"));
    Ok(())
}

/// Tests protocol-scoped role resolution.
#[test]
fn protocol_scoped_role_resolution() -> anyhow::Result<()> {
    let metadata = federation_resolver()?;
    let roles_resolver = BasicRoleDescriptorResolver::new(metadata);

    let criteria = CriteriaSet::new()
        .with_entity_id(IDP_ENTITY_ID)
        .with_role(roles::IDP_SSO_DESCRIPTOR);

    let unsupported = criteria.clone().with_protocol(SAML10P_NS);
    assert!(roles_resolver.resolve(&unsupported)?.is_empty());

    let supported = criteria.clone().with_protocol(SAML11P_NS);
    let role = roles_resolver
        .resolve_single(&supported)?
        .context("IdP role supporting SAML 1.1")?;
    assert!(role.supports_protocol(SAML11P_NS));
    assert_eq!(role.entity_id().as_deref(), Some(IDP_ENTITY_ID));
    Ok(())
}

/// Tests that expired entities and roles are hidden.
#[test]
fn expired_metadata_is_not_served() -> anyhow::Result<()> {
    init_tracing();
    let resolver = Arc::new(BaseMetadataResolver::new("expiring"));
    resolver.initialize(|r| {
        r.load_document(MetadataDocument::from_entities(
            EntitiesDescriptorBuilder::new()
                .with_entity(
                    EntityDescriptorBuilder::new("https://old.example.org")
                        .with_valid_until(Utc::now() - Duration::days(1)),
                )
                .with_entity(
                    EntityDescriptorBuilder::new("https://partial.example.org")
                        .with_role(
                            RoleDescriptorBuilder::new(roles::SP_SSO_DESCRIPTOR)
                                .with_protocol(SAML20P_NS)
                                .with_valid_until(Utc::now() - Duration::minutes(5)),
                        )
                        .with_role(
                            RoleDescriptorBuilder::new(roles::SP_SSO_DESCRIPTOR)
                                .with_protocol(SAML20P_NS),
                        ),
                ),
        ))
    })?;

    assert!(resolver
        .resolve(&CriteriaSet::new().with_entity_id("https://old.example.org"))?
        .is_empty());

    let roles_resolver = BasicRoleDescriptorResolver::new(resolver);
    let found = roles_resolver.resolve(
        &CriteriaSet::new()
            .with_entity_id("https://partial.example.org")
            .with_role(roles::SP_SSO_DESCRIPTOR),
    )?;
    assert_eq!(found.len(), 1);
    assert!(found[0].valid_until().is_none());
    Ok(())
}

/// Tests loading serialized metadata through a source, an unmarshaller and
/// a filter.
#[test]
fn batch_resolver_with_filter() -> anyhow::Result<()> {
    init_tracing();
    let base = BaseMetadataResolver::new("batch")
        .with_unmarshaller(saml_metadata::resolver::FunctionMetadataUnmarshaller::new(
            "fixture",
            |bytes| match bytes {
                b"federation" => Ok(federation()),
                _ => Err(MetadataError::Unmarshalling("unknown fixture".to_string())),
            },
        ))
        .with_filter(EntityIdFilter::exclude([SP_ENTITY_ID]));
    let resolver = BatchMetadataResolver::new(base, StaticMetadataSource::new("federation"));
    resolver.initialize()?;

    assert!(resolver.was_last_refresh_success());
    assert!(resolver
        .resolve_single(&CriteriaSet::new().with_entity_id(IDP_ENTITY_ID))?
        .is_some());
    assert!(resolver
        .resolve_single(&CriteriaSet::new().with_entity_id(SP_ENTITY_ID))?
        .is_none());
    Ok(())
}

/// Tests that a chain falls through to the resolver that knows the entity.
#[test]
fn chaining_resolver_falls_through() -> anyhow::Result<()> {
    init_tracing();
    let local = BaseMetadataResolver::new("local");
    local.initialize(|r| r.load_document(MetadataDocument::from_entity(idp())))?;

    let chain = ChainingMetadataResolver::new(
        "chain",
        vec![
            Arc::new(local) as Arc<dyn MetadataResolver>,
            federation_resolver()? as Arc<dyn MetadataResolver>,
        ],
    );

    let sp = chain
        .resolve_single(&CriteriaSet::new().with_entity_id(SP_ENTITY_ID))?
        .context("SP from the second member")?;
    assert_eq!(sp.entity_id(), SP_ENTITY_ID);
    let group = sp.parent().context("SP belongs to the federation group")?;
    assert_eq!(group.name(), Some("urn:example:federation"));
    Ok(())
}
