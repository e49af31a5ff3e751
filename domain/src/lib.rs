//! Business rules of the Reclique login handshake.
//!
//! `domain` sits between `web` and `reclique-auth`: it decides what a redirect or a
//! callback means for the gated content platform and translates provider errors so that
//! `web` never needs to depend on `reclique-auth` directly. The provider types the web
//! layer does need are re-exported here.
pub use reclique_auth::oauth::{Client as OAuthClient, Membership, StateManager, UserInfo};

pub mod error;
pub mod gateway;
pub mod identity;
pub mod login;
pub mod user_authorizer;
