//! Common test utilities and fixtures.

use std::sync::Arc;

use integration_tests::{IDP_SIGNING_CERT, SP_ENCRYPTION_CERT, SP_ENCRYPTION_SPKI};
use saml_metadata::index::{ArtifactSourceIdMetadataIndex, EndpointMetadataIndex, RoleMetadataIndex};
use saml_metadata::{
    endpoints, roles, BaseMetadataResolver, Endpoint, EntitiesDescriptorBuilder,
    EntityDescriptorBuilder, KeyDescriptor, KeyInfo, MetadataDocument, RoleDescriptorBuilder,
    SamlBinding, UsageType, SAML11P_NS, SAML20P_NS,
};

pub const IDP_ENTITY_ID: &str = "https://idp.example.org/idp/shibboleth";
pub const SP_ENTITY_ID: &str = "https://sp.example.org/shibboleth";
pub const SP_ACS: &str = "https://sp.example.org/Shibboleth.sso/SAML2/POST";

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("saml_metadata=debug")
        .with_test_writer()
        .try_init();
}

pub fn idp() -> EntityDescriptorBuilder {
    EntityDescriptorBuilder::new(IDP_ENTITY_ID)
        .with_role(
            RoleDescriptorBuilder::new(roles::IDP_SSO_DESCRIPTOR)
                .with_protocol(SAML20P_NS)
                .with_protocol(SAML11P_NS)
                .with_key_descriptor(KeyDescriptor::new(
                    UsageType::Signing,
                    KeyInfo::new()
                        .with_key_name("idp-signing")
                        .with_certificate(IDP_SIGNING_CERT),
                ))
                .with_endpoint(Endpoint::new(
                    endpoints::SINGLE_SIGN_ON_SERVICE,
                    SamlBinding::HttpRedirect.uri(),
                    "https://idp.example.org/idp/profile/SAML2/Redirect/SSO",
                )),
        )
        .with_role(
            RoleDescriptorBuilder::new(roles::ATTRIBUTE_AUTHORITY_DESCRIPTOR)
                .with_protocol(SAML20P_NS)
                .with_endpoint(Endpoint::new(
                    endpoints::ATTRIBUTE_SERVICE,
                    SamlBinding::Soap.uri(),
                    "https://idp.example.org:8443/idp/profile/SAML2/SOAP/AttributeQuery",
                )),
        )
}

pub fn sp() -> EntityDescriptorBuilder {
    EntityDescriptorBuilder::new(SP_ENTITY_ID).with_role(
        RoleDescriptorBuilder::new(roles::SP_SSO_DESCRIPTOR)
            .with_protocol(SAML20P_NS)
            .with_key_descriptor(KeyDescriptor::new(
                UsageType::Encryption,
                KeyInfo::new().with_certificate(SP_ENCRYPTION_CERT),
            ))
            .with_key_descriptor(KeyDescriptor::new(
                UsageType::Unspecified,
                KeyInfo::new().with_der_public_key(SP_ENCRYPTION_SPKI),
            ))
            .with_endpoint(
                Endpoint::new(
                    endpoints::ASSERTION_CONSUMER_SERVICE,
                    SamlBinding::HttpPost.uri(),
                    SP_ACS,
                )
                .with_index(1, None),
            ),
    )
}

pub fn federation() -> MetadataDocument {
    MetadataDocument::from_entities(
        EntitiesDescriptorBuilder::new()
            .with_name("urn:example:federation")
            .with_entity(idp())
            .with_entity(sp()),
    )
}

/// Resolver over [`federation`] with every built-in secondary index.
pub fn federation_resolver() -> anyhow::Result<Arc<BaseMetadataResolver>> {
    init_tracing();
    let resolver = BaseMetadataResolver::new("federation")
        .with_index(RoleMetadataIndex::new())
        .with_index(EndpointMetadataIndex::new())
        .with_index(ArtifactSourceIdMetadataIndex::new());
    resolver.initialize(|r| r.load_document(federation()))?;
    Ok(Arc::new(resolver))
}
