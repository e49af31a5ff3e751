//! Concrete OAuth provider implementations.

pub mod reclique;
