//! Index by artifact SourceID.

use std::collections::HashSet;

use tracing::warn;

use super::{MetadataIndex, MetadataIndexKey};
use crate::criteria::CriteriaSet;
use crate::types::EntityDescriptor;

/// Indexes entities by the SourceID that identifies them in SAML artifacts.
///
/// Every entity is stored under the SHA-1 digest of its entity ID. Roles
/// may also declare explicit SAML 1.x `SourceID` values, which are stored
/// as well. Queries are answered from the artifact criterion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactSourceIdMetadataIndex;

impl ArtifactSourceIdMetadataIndex {
    /// Creates the index.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MetadataIndex for ArtifactSourceIdMetadataIndex {
    fn name(&self) -> &str {
        "artifact-source-id"
    }

    fn generate_keys_from_descriptor(
        &self,
        descriptor: &EntityDescriptor,
    ) -> Option<HashSet<MetadataIndexKey>> {
        let mut keys = HashSet::from([MetadataIndexKey::SourceId(saml_crypto::source_id(
            descriptor.entity_id(),
        ))]);

        for role in descriptor.role_descriptors() {
            for value in role.source_ids() {
                match hex::decode(value.trim())
                    .ok()
                    .and_then(|bytes| <[u8; saml_crypto::SOURCE_ID_LEN]>::try_from(bytes).ok())
                {
                    Some(source_id) => {
                        keys.insert(MetadataIndexKey::SourceId(source_id));
                    }
                    None => warn!(
                        entity_id = %descriptor.entity_id(),
                        source_id = %value,
                        "Ignoring malformed SourceID extension"
                    ),
                }
            }
        }

        Some(keys)
    }

    fn generate_keys_from_criteria(
        &self,
        criteria: &CriteriaSet,
    ) -> Option<HashSet<MetadataIndexKey>> {
        let artifact = criteria.artifact()?;
        Some(HashSet::from([MetadataIndexKey::SourceId(
            *artifact.source_id(),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SamlArtifact;
    use crate::types::{roles, EntityDescriptorBuilder, RoleDescriptorBuilder};

    fn artifact_for(source: &[u8; 20]) -> SamlArtifact {
        let mut bytes = vec![0x00, 0x04, 0x00, 0x00];
        bytes.extend_from_slice(source);
        bytes.extend_from_slice(&[0x01; 20]);
        SamlArtifact::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn entity_id_digest_is_a_key() {
        let entity = EntityDescriptorBuilder::new("https://idp.example.org").build();
        let keys = ArtifactSourceIdMetadataIndex
            .generate_keys_from_descriptor(&entity)
            .unwrap();

        let expected = hex::decode("608dd3b6c8debceccd63f8a5014c6187e991327f").unwrap();
        let expected: [u8; 20] = expected.try_into().unwrap();
        assert!(keys.contains(&MetadataIndexKey::SourceId(expected)));
    }

    #[test]
    fn explicit_source_ids_are_indexed_and_malformed_ones_skipped() {
        let explicit = [0x42u8; 20];
        let entity = EntityDescriptorBuilder::new("https://idp.example.org")
            .with_role(
                RoleDescriptorBuilder::new(roles::IDP_SSO_DESCRIPTOR)
                    .with_source_id(hex::encode(explicit))
                    .with_source_id("zz-not-hex")
                    .with_source_id("abcd"),
            )
            .build();

        let keys = ArtifactSourceIdMetadataIndex
            .generate_keys_from_descriptor(&entity)
            .unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&MetadataIndexKey::SourceId(explicit)));
    }

    #[test]
    fn criteria_keys_come_from_artifact() {
        let source = saml_crypto::source_id("https://idp.example.org");
        let criteria = CriteriaSet::new().with_artifact(artifact_for(&source));
        let keys = ArtifactSourceIdMetadataIndex
            .generate_keys_from_criteria(&criteria)
            .unwrap();
        assert!(keys.contains(&MetadataIndexKey::SourceId(source)));

        assert!(ArtifactSourceIdMetadataIndex
            .generate_keys_from_criteria(&CriteriaSet::new().with_entity_id("x"))
            .is_none());
    }
}
