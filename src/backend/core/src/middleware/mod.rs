//! Request middleware that runs ahead of authorization.
pub mod identity;

pub use identity::{subject_from_headers, HeaderIdentityLayer, HeaderIdentityService, IdentityConfig};
