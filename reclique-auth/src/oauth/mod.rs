//! OAuth 2.0 authorization code flow.
//!
//! Provides the client half of the login handshake with CSRF state protection.

mod client;
mod provider;
mod state;
mod subscription;
mod token;

pub mod providers;

pub use client::Client;
pub use provider::{Membership, Provider, UserInfo};
pub use state::{StateData, StateManager};
pub use subscription::SubscriptionPolicy;
pub use token::AccessToken;
