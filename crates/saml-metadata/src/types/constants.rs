//! Qualified names, namespaces, protocol and binding URIs.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// SAML 2.0 metadata namespace URI.
pub const MD_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// IdP discovery protocol namespace URI.
pub const IDPDISC_NS: &str = "urn:oasis:names:tc:SAML:profiles:SSO:idp-discovery-protocol";

/// SAML 2.0 protocol URI, as listed in `protocolSupportEnumeration`.
pub const SAML20P_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// SAML 1.1 protocol URI.
pub const SAML11P_NS: &str = "urn:oasis:names:tc:SAML:1.1:protocol";

/// SAML 1.0 protocol URI.
pub const SAML10P_NS: &str = "urn:oasis:names:tc:SAML:1.0:protocol";

/// An XML qualified name.
///
/// Used as the type tag for role descriptors and endpoints. Written and
/// parsed in Clark notation, `{namespace}localPart`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace: Cow<'static, str>,
    local_part: Cow<'static, str>,
}

impl QName {
    /// Creates a name from static strings; usable in constants.
    #[must_use]
    pub const fn from_static(namespace: &'static str, local_part: &'static str) -> Self {
        Self {
            namespace: Cow::Borrowed(namespace),
            local_part: Cow::Borrowed(local_part),
        }
    }

    /// Creates a name from owned strings.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local_part: impl Into<String>) -> Self {
        Self {
            namespace: Cow::Owned(namespace.into()),
            local_part: Cow::Owned(local_part.into()),
        }
    }

    /// Creates a name in the SAML 2.0 metadata namespace.
    #[must_use]
    pub fn md(local_part: impl Into<String>) -> Self {
        Self {
            namespace: Cow::Borrowed(MD_NS),
            local_part: Cow::Owned(local_part.into()),
        }
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the local part.
    #[must_use]
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    /// Parses Clark notation (`{ns}local`), or a bare local name.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix('{') {
            let (namespace, local) = rest.split_once('}')?;
            if local.is_empty() {
                return None;
            }
            Some(Self::new(namespace, local))
        } else if text.is_empty() || text.contains('}') {
            None
        } else {
            Some(Self::new("", text))
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_part)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_part)
        }
    }
}

impl TryFrom<String> for QName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid qualified name: '{value}'"))
    }
}

impl From<QName> for String {
    fn from(value: QName) -> Self {
        value.to_string()
    }
}

// ============================================================================
// Role descriptor element names
// ============================================================================

/// Element names of the standard role descriptors.
pub mod roles {
    use super::{QName, MD_NS};

    /// `md:RoleDescriptor`, the extension point for custom roles.
    pub const ROLE_DESCRIPTOR: QName = QName::from_static(MD_NS, "RoleDescriptor");

    /// `md:IDPSSODescriptor`.
    pub const IDP_SSO_DESCRIPTOR: QName = QName::from_static(MD_NS, "IDPSSODescriptor");

    /// `md:SPSSODescriptor`.
    pub const SP_SSO_DESCRIPTOR: QName = QName::from_static(MD_NS, "SPSSODescriptor");

    /// `md:AttributeAuthorityDescriptor`.
    pub const ATTRIBUTE_AUTHORITY_DESCRIPTOR: QName =
        QName::from_static(MD_NS, "AttributeAuthorityDescriptor");

    /// `md:AuthnAuthorityDescriptor`.
    pub const AUTHN_AUTHORITY_DESCRIPTOR: QName =
        QName::from_static(MD_NS, "AuthnAuthorityDescriptor");

    /// `md:PDPDescriptor`.
    pub const PDP_DESCRIPTOR: QName = QName::from_static(MD_NS, "PDPDescriptor");
}

// ============================================================================
// Endpoint element names
// ============================================================================

/// Element names of the standard endpoints.
pub mod endpoints {
    use super::{QName, IDPDISC_NS, MD_NS};

    /// `md:SingleSignOnService`.
    pub const SINGLE_SIGN_ON_SERVICE: QName = QName::from_static(MD_NS, "SingleSignOnService");

    /// `md:SingleLogoutService`.
    pub const SINGLE_LOGOUT_SERVICE: QName = QName::from_static(MD_NS, "SingleLogoutService");

    /// `md:AssertionConsumerService` (indexed).
    pub const ASSERTION_CONSUMER_SERVICE: QName =
        QName::from_static(MD_NS, "AssertionConsumerService");

    /// `md:ArtifactResolutionService` (indexed).
    pub const ARTIFACT_RESOLUTION_SERVICE: QName =
        QName::from_static(MD_NS, "ArtifactResolutionService");

    /// `md:ManageNameIDService`.
    pub const MANAGE_NAME_ID_SERVICE: QName = QName::from_static(MD_NS, "ManageNameIDService");

    /// `md:NameIDMappingService`.
    pub const NAME_ID_MAPPING_SERVICE: QName = QName::from_static(MD_NS, "NameIDMappingService");

    /// `md:AssertionIDRequestService`.
    pub const ASSERTION_ID_REQUEST_SERVICE: QName =
        QName::from_static(MD_NS, "AssertionIDRequestService");

    /// `md:AttributeService`.
    pub const ATTRIBUTE_SERVICE: QName = QName::from_static(MD_NS, "AttributeService");

    /// `idpdisc:DiscoveryResponse` (indexed).
    pub const DISCOVERY_RESPONSE: QName = QName::from_static(IDPDISC_NS, "DiscoveryResponse");
}

// ============================================================================
// Binding URIs
// ============================================================================

/// SAML binding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamlBinding {
    /// SAML 2.0 HTTP POST binding.
    HttpPost,
    /// SAML 2.0 HTTP POST-SimpleSign binding.
    HttpPostSimpleSign,
    /// SAML 2.0 HTTP Redirect binding.
    HttpRedirect,
    /// SAML 2.0 HTTP Artifact binding.
    HttpArtifact,
    /// SAML 2.0 SOAP binding.
    Soap,
    /// SAML 2.0 PAOS binding (ECP).
    Paos,
    /// SAML 1.x browser/POST profile.
    Saml1BrowserPost,
    /// SAML 1.x browser/artifact profile.
    Saml1Artifact,
    /// SAML 1.x SOAP binding.
    Saml1Soap,
}

impl SamlBinding {
    /// Returns the URI for this binding.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpPostSimpleSign => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST-SimpleSign",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
            Self::Soap => "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
            Self::Paos => "urn:oasis:names:tc:SAML:2.0:bindings:PAOS",
            Self::Saml1BrowserPost => "urn:oasis:names:tc:SAML:1.0:profiles:browser-post",
            Self::Saml1Artifact => "urn:oasis:names:tc:SAML:1.0:profiles:artifact-01",
            Self::Saml1Soap => "urn:oasis:names:tc:SAML:1.0:bindings:SOAP-binding",
        }
    }

    /// Parses a binding from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        [
            Self::HttpPost,
            Self::HttpPostSimpleSign,
            Self::HttpRedirect,
            Self::HttpArtifact,
            Self::Soap,
            Self::Paos,
            Self::Saml1BrowserPost,
            Self::Saml1Artifact,
            Self::Saml1Soap,
        ]
        .into_iter()
        .find(|binding| binding.uri() == uri)
    }

    /// Returns true for front-channel (browser mediated) bindings.
    #[must_use]
    pub const fn is_front_channel(&self) -> bool {
        matches!(
            self,
            Self::HttpPost
                | Self::HttpPostSimpleSign
                | Self::HttpRedirect
                | Self::HttpArtifact
                | Self::Saml1BrowserPost
                | Self::Saml1Artifact
        )
    }
}
