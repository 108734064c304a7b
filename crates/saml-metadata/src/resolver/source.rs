//! Where metadata comes from, and how bytes become documents.

use std::fmt;

use crate::error::MetadataResult;
use crate::types::MetadataDocument;

/// Outcome of a metadata fetch.
#[derive(Debug)]
pub enum RawMetadata {
    /// Serialized metadata to unmarshall.
    Bytes(Vec<u8>),
    /// A document the source built itself.
    Document(MetadataDocument),
    /// Nothing changed since the last fetch.
    Unchanged,
}

/// Delivers metadata to a resolver.
pub trait MetadataSource: Send + Sync + fmt::Debug {
    /// Fetches the current metadata.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Fetch`](crate::MetadataError::Fetch) if the
    /// metadata cannot be obtained.
    fn fetch(&self) -> MetadataResult<RawMetadata>;
}

/// Turns serialized metadata into an unpublished document.
pub trait MetadataUnmarshaller: Send + Sync + fmt::Debug {
    /// Unmarshalls `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Unmarshalling`](crate::MetadataError::Unmarshalling)
    /// for input that is not metadata.
    fn unmarshall(&self, bytes: &[u8]) -> MetadataResult<MetadataDocument>;
}

/// Serves a fixed byte buffer on every fetch.
///
/// Resolvers detect that the bytes did not change.
#[derive(Debug)]
pub struct StaticMetadataSource {
    bytes: Vec<u8>,
}

impl StaticMetadataSource {
    /// Creates a source over `bytes`.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl MetadataSource for StaticMetadataSource {
    fn fetch(&self) -> MetadataResult<RawMetadata> {
        Ok(RawMetadata::Bytes(self.bytes.clone()))
    }
}

type FetchFn = Box<dyn Fn() -> MetadataResult<RawMetadata> + Send + Sync>;

/// A source backed by a closure.
pub struct FunctionMetadataSource {
    name: String,
    fetch: FetchFn,
}

impl FunctionMetadataSource {
    /// Creates a source that calls `fetch` on every fetch.
    pub fn new<F>(name: impl Into<String>, fetch: F) -> Self
    where
        F: Fn() -> MetadataResult<RawMetadata> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fetch: Box::new(fetch),
        }
    }
}

impl fmt::Debug for FunctionMetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionMetadataSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl MetadataSource for FunctionMetadataSource {
    fn fetch(&self) -> MetadataResult<RawMetadata> {
        (self.fetch)()
    }
}

type UnmarshallFn = Box<dyn Fn(&[u8]) -> MetadataResult<MetadataDocument> + Send + Sync>;

/// An unmarshaller backed by a closure, for plugging in an XML binding.
pub struct FunctionMetadataUnmarshaller {
    name: String,
    unmarshall: UnmarshallFn,
}

impl FunctionMetadataUnmarshaller {
    /// Creates an unmarshaller around `unmarshall`.
    pub fn new<F>(name: impl Into<String>, unmarshall: F) -> Self
    where
        F: Fn(&[u8]) -> MetadataResult<MetadataDocument> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            unmarshall: Box::new(unmarshall),
        }
    }
}

impl fmt::Debug for FunctionMetadataUnmarshaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionMetadataUnmarshaller")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl MetadataUnmarshaller for FunctionMetadataUnmarshaller {
    fn unmarshall(&self, bytes: &[u8]) -> MetadataResult<MetadataDocument> {
        (self.unmarshall)(bytes)
    }
}
