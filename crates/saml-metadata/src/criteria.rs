//! Resolution criteria.
//!
//! A [`CriteriaSet`] is the typed bag of inputs driving a resolution call.
//! Each [`Criterion`] variant is one kind of input; a set holds at most one
//! criterion per kind, and inserting a second one of the same kind replaces
//! the first.

use std::sync::Arc;

use base64::Engine;

use crate::error::{MetadataError, MetadataResult};
use crate::types::{Endpoint, QName, RoleDescriptor, UsageType};

/// SAML 1.x artifact type code.
pub const SAML1_ARTIFACT_TYPE: u16 = 0x0001;

/// SAML 2.0 artifact type code.
pub const SAML2_ARTIFACT_TYPE: u16 = 0x0004;

const SOURCE_ID_LEN: usize = saml_crypto::SOURCE_ID_LEN;
const HANDLE_LEN: usize = 20;

/// A decoded SAML artifact, reduced to the parts metadata lookup needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlArtifact {
    type_code: u16,
    endpoint_index: Option<u16>,
    source_id: [u8; SOURCE_ID_LEN],
}

impl SamlArtifact {
    /// Parses a base64 encoded SAML 1.x (type `0x0001`) or SAML 2.0
    /// (type `0x0004`) artifact.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidCriteria`] if the text is not base64
    /// or not an artifact of a supported type.
    pub fn from_encoded(encoded: &str) -> MetadataResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| MetadataError::InvalidCriteria(format!("artifact is not base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Parses raw artifact bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidCriteria`] for unsupported types or
    /// lengths.
    pub fn from_bytes(bytes: &[u8]) -> MetadataResult<Self> {
        let type_code = match bytes {
            [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
            _ => return Err(MetadataError::InvalidCriteria("artifact too short".to_string())),
        };

        let (endpoint_index, source_start) = match (type_code, bytes.len()) {
            (SAML1_ARTIFACT_TYPE, len) if len == 2 + SOURCE_ID_LEN + HANDLE_LEN => (None, 2),
            (SAML2_ARTIFACT_TYPE, len) if len == 4 + SOURCE_ID_LEN + HANDLE_LEN => {
                (Some(u16::from_be_bytes([bytes[2], bytes[3]])), 4)
            }
            (code, len) => {
                return Err(MetadataError::InvalidCriteria(format!(
                    "unsupported artifact type {code:#06x} of length {len}"
                )))
            }
        };

        let mut source_id = [0u8; SOURCE_ID_LEN];
        source_id.copy_from_slice(&bytes[source_start..source_start + SOURCE_ID_LEN]);

        Ok(Self {
            type_code,
            endpoint_index,
            source_id,
        })
    }

    /// Returns the artifact type code.
    #[must_use]
    pub const fn type_code(&self) -> u16 {
        self.type_code
    }

    /// Returns the endpoint index of a SAML 2.0 artifact.
    #[must_use]
    pub const fn endpoint_index(&self) -> Option<u16> {
        self.endpoint_index
    }

    /// Returns the issuer's SourceID.
    #[must_use]
    pub const fn source_id(&self) -> &[u8; SOURCE_ID_LEN] {
        &self.source_id
    }
}

/// One resolution input.
#[derive(Debug, Clone)]
pub enum Criterion {
    /// Entity ID of the peer.
    EntityId(String),
    /// Role type of the peer.
    EntityRole(QName),
    /// Protocol the peer's role must support.
    Protocol(String),
    /// Key usage sought.
    Usage(UsageType),
    /// Endpoint template.
    Endpoint(Arc<Endpoint>),
    /// A role descriptor already resolved by the caller.
    RoleDescriptor(Arc<RoleDescriptor>),
    /// The inbound request was signed.
    SignedRequest,
    /// Acceptable bindings in order of preference.
    Binding(Vec<String>),
    /// An artifact whose issuer is sought.
    Artifact(SamlArtifact),
}

/// Discriminant of a [`Criterion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    /// [`Criterion::EntityId`].
    EntityId,
    /// [`Criterion::EntityRole`].
    EntityRole,
    /// [`Criterion::Protocol`].
    Protocol,
    /// [`Criterion::Usage`].
    Usage,
    /// [`Criterion::Endpoint`].
    Endpoint,
    /// [`Criterion::RoleDescriptor`].
    RoleDescriptor,
    /// [`Criterion::SignedRequest`].
    SignedRequest,
    /// [`Criterion::Binding`].
    Binding,
    /// [`Criterion::Artifact`].
    Artifact,
}

impl Criterion {
    /// Returns the kind of this criterion.
    #[must_use]
    pub const fn kind(&self) -> CriterionKind {
        match self {
            Self::EntityId(_) => CriterionKind::EntityId,
            Self::EntityRole(_) => CriterionKind::EntityRole,
            Self::Protocol(_) => CriterionKind::Protocol,
            Self::Usage(_) => CriterionKind::Usage,
            Self::Endpoint(_) => CriterionKind::Endpoint,
            Self::RoleDescriptor(_) => CriterionKind::RoleDescriptor,
            Self::SignedRequest => CriterionKind::SignedRequest,
            Self::Binding(_) => CriterionKind::Binding,
            Self::Artifact(_) => CriterionKind::Artifact,
        }
    }
}

/// An ordered set of criteria, at most one per kind.
#[derive(Debug, Clone, Default)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion, replacing any criterion of the same kind in place.
    pub fn insert(&mut self, criterion: Criterion) {
        let kind = criterion.kind();
        match self.criteria.iter_mut().find(|c| c.kind() == kind) {
            Some(slot) => *slot = criterion,
            None => self.criteria.push(criterion),
        }
    }

    /// Adds a criterion.
    #[must_use]
    pub fn with(mut self, criterion: Criterion) -> Self {
        self.insert(criterion);
        self
    }

    /// Adds an entity ID criterion.
    #[must_use]
    pub fn with_entity_id(self, entity_id: impl Into<String>) -> Self {
        self.with(Criterion::EntityId(entity_id.into()))
    }

    /// Adds an entity role criterion.
    #[must_use]
    pub fn with_role(self, role: QName) -> Self {
        self.with(Criterion::EntityRole(role))
    }

    /// Adds a protocol criterion.
    #[must_use]
    pub fn with_protocol(self, protocol: impl Into<String>) -> Self {
        self.with(Criterion::Protocol(protocol.into()))
    }

    /// Adds a usage criterion.
    #[must_use]
    pub fn with_usage(self, usage: UsageType) -> Self {
        self.with(Criterion::Usage(usage))
    }

    /// Adds an endpoint template criterion.
    #[must_use]
    pub fn with_endpoint(self, endpoint: impl Into<Arc<Endpoint>>) -> Self {
        self.with(Criterion::Endpoint(endpoint.into()))
    }

    /// Adds a role descriptor criterion.
    #[must_use]
    pub fn with_role_descriptor(self, role: Arc<RoleDescriptor>) -> Self {
        self.with(Criterion::RoleDescriptor(role))
    }

    /// Marks the request as signed.
    #[must_use]
    pub fn with_signed_request(self) -> Self {
        self.with(Criterion::SignedRequest)
    }

    /// Adds a binding preference criterion.
    #[must_use]
    pub fn with_bindings<I, S>(self, bindings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Criterion::Binding(
            bindings.into_iter().map(Into::into).collect(),
        ))
    }

    /// Adds an artifact criterion.
    #[must_use]
    pub fn with_artifact(self, artifact: SamlArtifact) -> Self {
        self.with(Criterion::Artifact(artifact))
    }

    /// Returns true if a criterion of `kind` is present.
    #[must_use]
    pub fn contains(&self, kind: CriterionKind) -> bool {
        self.criteria.iter().any(|c| c.kind() == kind)
    }

    /// Removes and returns the criterion of `kind`.
    pub fn remove(&mut self, kind: CriterionKind) -> Option<Criterion> {
        let pos = self.criteria.iter().position(|c| c.kind() == kind)?;
        Some(self.criteria.remove(pos))
    }

    /// Returns the criteria in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    /// Returns the number of criteria.
    #[must_use]
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns the entity ID.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::EntityId(id) => Some(id.as_str()),
            _ => None,
        })
    }

    /// Returns the entity role.
    #[must_use]
    pub fn entity_role(&self) -> Option<&QName> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::EntityRole(role) => Some(role),
            _ => None,
        })
    }

    /// Returns the protocol.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::Protocol(p) => Some(p.as_str()),
            _ => None,
        })
    }

    /// Returns the usage.
    #[must_use]
    pub fn usage(&self) -> Option<UsageType> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::Usage(u) => Some(*u),
            _ => None,
        })
    }

    /// Returns the endpoint template.
    #[must_use]
    pub fn endpoint(&self) -> Option<&Arc<Endpoint>> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::Endpoint(e) => Some(e),
            _ => None,
        })
    }

    /// Returns the caller-supplied role descriptor.
    #[must_use]
    pub fn role_descriptor(&self) -> Option<&Arc<RoleDescriptor>> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::RoleDescriptor(r) => Some(r),
            _ => None,
        })
    }

    /// Returns true if the request was signed.
    #[must_use]
    pub fn is_signed_request(&self) -> bool {
        self.contains(CriterionKind::SignedRequest)
    }

    /// Returns the acceptable bindings.
    #[must_use]
    pub fn bindings(&self) -> Option<&[String]> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::Binding(b) => Some(b.as_slice()),
            _ => None,
        })
    }

    /// Returns the artifact.
    #[must_use]
    pub fn artifact(&self) -> Option<&SamlArtifact> {
        self.criteria.iter().find_map(|c| match c {
            Criterion::Artifact(a) => Some(a),
            _ => None,
        })
    }
}

impl FromIterator<Criterion> for CriteriaSet {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        let mut set = Self::new();
        for criterion in iter {
            set.insert(criterion);
        }
        set
    }
}
