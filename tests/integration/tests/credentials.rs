//! Credential resolution scenarios.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use anyhow::Context;
use saml_crypto::KeyAlgorithm;
use saml_metadata::{
    match_usage, roles, BasicKeyInfoCredentialResolver, BasicRoleDescriptorResolver,
    CriteriaSet, CredentialResolver, MetadataCredentialResolver, MetadataError,
    RoleDescriptorResolver, UsageType,
};

use crate::common::{federation_resolver, IDP_ENTITY_ID, SP_ENTITY_ID};

type Resolvers = (MetadataCredentialResolver, Arc<BasicRoleDescriptorResolver>);

fn credential_resolver() -> anyhow::Result<Resolvers> {
    let roles_resolver = Arc::new(BasicRoleDescriptorResolver::new(federation_resolver()?));
    let resolver =
        MetadataCredentialResolver::new(Arc::new(BasicKeyInfoCredentialResolver::new()))
            .with_role_descriptor_resolver(
                Arc::clone(&roles_resolver) as Arc<dyn RoleDescriptorResolver>
            );
    Ok((resolver, roles_resolver))
}

/// Tests the usage matching rule.
#[test]
fn usage_matching_rule() {
    assert!(match_usage(UsageType::Unspecified, UsageType::Signing));
    assert!(match_usage(UsageType::Signing, UsageType::Unspecified));
    assert!(!match_usage(UsageType::Signing, UsageType::Encryption));
    assert!(match_usage(UsageType::Signing, UsageType::Signing));
}

/// Tests resolving signing credentials for an IdP by entity ID.
#[test]
fn idp_signing_credential() -> anyhow::Result<()> {
    let (resolver, _) = credential_resolver()?;
    let criteria = CriteriaSet::new()
        .with_entity_id(IDP_ENTITY_ID)
        .with_role(roles::IDP_SSO_DESCRIPTOR)
        .with_usage(UsageType::Signing);

    let credential = resolver.resolve_single(&criteria)?.context("IdP signing key")?;
    assert_eq!(credential.entity_id(), Some(IDP_ENTITY_ID));
    assert_eq!(credential.usage(), UsageType::Signing);
    assert_eq!(credential.public_key().algorithm(), KeyAlgorithm::Rsa);
    assert_eq!(credential.key_names(), ["idp-signing"]);

    let encryption = criteria.with_usage(UsageType::Encryption);
    assert!(resolver.resolve(&encryption)?.is_empty());
    Ok(())
}

/// Tests that an SP's encryption lookup includes unspecified-usage keys.
#[test]
fn sp_encryption_credentials() -> anyhow::Result<()> {
    let (resolver, _) = credential_resolver()?;
    let found = resolver.resolve(
        &CriteriaSet::new()
            .with_entity_id(SP_ENTITY_ID)
            .with_role(roles::SP_SSO_DESCRIPTOR)
            .with_usage(UsageType::Encryption),
    )?;

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].usage(), UsageType::Encryption);
    assert!(found[0].entity_certificate().is_some());
    assert_eq!(found[1].usage(), UsageType::Unspecified);
    assert!(found[1].entity_certificate().is_none());
    assert_eq!(found[0].public_key(), found[1].public_key());
    Ok(())
}

/// Tests that repeated resolution reuses the cached credentials.
#[test]
fn cache_is_idempotent() -> anyhow::Result<()> {
    let (resolver, _) = credential_resolver()?;
    let criteria = CriteriaSet::new()
        .with_entity_id(SP_ENTITY_ID)
        .with_role(roles::SP_SSO_DESCRIPTOR);

    let first = resolver.resolve(&criteria)?;
    let second = resolver.resolve(&criteria)?;
    assert_eq!(first.len(), second.len());
    assert!(first.iter().zip(&second).all(|(a, b)| Arc::ptr_eq(a, b)));
    Ok(())
}

/// Tests that concurrent first access converges on one cached value.
#[test]
fn concurrent_first_access_converges() -> anyhow::Result<()> {
    const THREADS: usize = 16;

    let (resolver, roles_resolver) = credential_resolver()?;
    let criteria = CriteriaSet::new()
        .with_entity_id(IDP_ENTITY_ID)
        .with_role(roles::IDP_SSO_DESCRIPTOR)
        .with_usage(UsageType::Signing);
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    resolver.resolve_single(&criteria)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("resolver thread panicked"))
            .collect()
    });

    let mut distinct = HashSet::new();
    for result in results {
        let credential = result?.context("IdP signing key")?;
        distinct.insert(Arc::as_ptr(&credential));
    }
    assert_eq!(distinct.len(), 1);

    let role = roles_resolver
        .resolve_single(&criteria)?
        .context("IdP role")?;
    let cached = role.key_descriptors()[0]
        .cached_credentials()
        .context("cache populated")?;
    assert!(distinct.contains(&Arc::as_ptr(&cached[0])));
    Ok(())
}

/// Tests the error taxonomy of the credential resolver.
#[test]
fn missing_inputs_are_errors() -> anyhow::Result<()> {
    let (resolver, _) = credential_resolver()?;
    let err = resolver
        .resolve(&CriteriaSet::new().with_entity_id(IDP_ENTITY_ID))
        .unwrap_err();
    assert!(matches!(err, MetadataError::MissingCriterion(_)));

    let unconfigured =
        MetadataCredentialResolver::new(Arc::new(BasicKeyInfoCredentialResolver::new()));
    let err = unconfigured
        .resolve(
            &CriteriaSet::new()
                .with_entity_id(IDP_ENTITY_ID)
                .with_role(roles::IDP_SSO_DESCRIPTOR),
        )
        .unwrap_err();
    assert!(err.is_configuration_error());

    let unknown = resolver.resolve(
        &CriteriaSet::new()
            .with_entity_id("https://unknown.example.org")
            .with_role(roles::IDP_SSO_DESCRIPTOR),
    )?;
    assert!(unknown.is_empty());
    Ok(())
}
