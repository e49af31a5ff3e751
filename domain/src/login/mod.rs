//! The two halves of the login handshake.
//!
//! [`AuthRedirectBuilder`] sends the browser to the provider with a fresh CSRF state;
//! [`CallbackHandler`] verifies what comes back and decides between granting and denying
//! access. Both are cheap to clone and hold no per-request state, so a single instance
//! serves all concurrent requests.

mod callback;
mod redirect;

pub use callback::{CallbackFailure, CallbackHandler, CallbackOutcome, LoginUrls};
pub use redirect::{AuthRedirect, AuthRedirectBuilder, RedirectMemo};
