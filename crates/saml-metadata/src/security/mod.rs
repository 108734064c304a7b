//! Credentials resolved from metadata key descriptors.

mod credential;
pub(crate) mod keyinfo;
mod resolver;

pub use credential::*;
pub use keyinfo::{BasicKeyInfoCredentialResolver, KeyInfoCredentialResolver};
pub use resolver::*;
