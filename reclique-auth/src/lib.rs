//! # reclique-auth
//!
//! OAuth 2.0 "authorization code" client for the Reclique membership platform:
//! - CSRF state issuing and consume-once validation, bound to a browser session
//! - Authorization URL construction
//! - Authorization code exchange and member profile retrieval
//! - Subscription eligibility evaluation
//!
//! ## Architecture
//!
//! Network calls live behind the [`oauth::Provider`] trait so the login flow in `domain`
//! can be exercised without a live provider. [`oauth::Client`] composes a provider with the
//! [`oauth::StateManager`] and a [`oauth::SubscriptionPolicy`] and is the single object the
//! login flow talks to.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reclique_auth::{
//!     http::HttpClientBuilder,
//!     oauth::{providers::reclique, Client, StateManager, SubscriptionPolicy},
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
