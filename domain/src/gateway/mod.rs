//! OAuth provider gateways.
//!
//! Builds configured provider clients from `reclique-auth` for the login flow.

pub mod reclique;
