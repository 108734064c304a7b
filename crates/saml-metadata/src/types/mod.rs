//! SAML metadata object model.
//!
//! Entities, roles, endpoints and key descriptors, in their published
//! (immutable, `Arc`-shared) and builder forms.

mod constants;
mod endpoint;
mod entity;
mod key;
mod role;
mod validity;

pub use constants::*;
pub use endpoint::*;
pub use entity::*;
pub use key::*;
pub use role::*;
pub use validity::*;
