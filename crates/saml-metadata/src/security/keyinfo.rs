//! `KeyInfo` to credential resolution.

use std::fmt;

use saml_crypto::{decode_base64, validate_crl_der, Certificate, PublicKey};

use crate::error::{MetadataError, MetadataResult};
use crate::types::KeyInfo;

use super::Credential;

/// Turns a `KeyInfo` payload into credentials.
pub trait KeyInfoCredentialResolver: Send + Sync + fmt::Debug {
    /// Resolves every credential the payload describes. An empty result
    /// means the payload holds no usable key material.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::KeyInfoResolution`] if the material is
    /// present but cannot be decoded.
    fn resolve(&self, key_info: &KeyInfo) -> MetadataResult<Vec<Credential>>;
}

/// Resolves inline X.509 certificates and DER encoded public keys.
///
/// All certificates of a payload form one credential whose entity
/// certificate is the first; each DER public key forms a credential of its
/// own. Key names are attached to every credential but never resolve to a
/// key by themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicKeyInfoCredentialResolver;

impl BasicKeyInfoCredentialResolver {
    /// Creates the resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn key_info_error(what: &str, err: impl fmt::Display) -> MetadataError {
    MetadataError::KeyInfoResolution(format!("{what}: {err}"))
}

impl KeyInfoCredentialResolver for BasicKeyInfoCredentialResolver {
    fn resolve(&self, key_info: &KeyInfo) -> MetadataResult<Vec<Credential>> {
        let mut credentials = Vec::new();

        let crls = key_info
            .x509_crls
            .iter()
            .map(|encoded| {
                let der = decode_base64(encoded).map_err(|e| key_info_error("X509CRL", e))?;
                validate_crl_der(&der).map_err(|e| key_info_error("X509CRL", e))?;
                Ok(der)
            })
            .collect::<MetadataResult<Vec<_>>>()?;

        let mut certificates = key_info
            .x509_certificates
            .iter()
            .map(|encoded| {
                Certificate::from_base64(encoded).map_err(|e| key_info_error("X509Certificate", e))
            })
            .collect::<MetadataResult<Vec<_>>>()?;

        if !certificates.is_empty() {
            let entity_certificate = certificates.remove(0);
            credentials.push(
                Credential::from_certificate(entity_certificate, certificates)
                    .with_key_names(key_info.key_names.clone())
                    .with_crls(crls),
            );
        }

        for encoded in &key_info.der_public_keys {
            let der = decode_base64(encoded).map_err(|e| key_info_error("DEREncodedKeyValue", e))?;
            let key = PublicKey::from_spki_der(&der)
                .map_err(|e| key_info_error("DEREncodedKeyValue", e))?;
            credentials.push(
                Credential::from_public_key(key).with_key_names(key_info.key_names.clone()),
            );
        }

        Ok(credentials)
    }
}
