//! End-to-End Integration Tests
//!
//! These tests drive the metadata resolution stack the way a SAML
//! deployment would: entity lookup, role narrowing, endpoint selection
//! and credential resolution over one in-memory federation.

mod common;
mod credentials;
mod endpoint_selection;
mod entity_resolution;
mod index_lookup;
