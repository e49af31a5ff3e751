use std::sync::{Arc, OnceLock};

use log::*;
use reclique_auth::oauth::Client;

/// Redirect to the provider's authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRedirect {
    pub url: String,
    /// Intermediaries must not cache the redirect: it embeds a single-use state.
    pub cache_max_age: u32,
}

/// Per-request memo of the computed redirect.
///
/// Created once per incoming request and carried with it. Clones share the same slot, so
/// any re-entry while handling that request sees the first redirect instead of issuing a
/// second state.
#[derive(Debug, Clone, Default)]
pub struct RedirectMemo(Arc<OnceLock<AuthRedirect>>);

impl RedirectMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&AuthRedirect> {
        self.0.get()
    }
}

/// Builds the provider login redirect for entry point A.
#[derive(Clone)]
pub struct AuthRedirectBuilder {
    client: Client,
}

impl AuthRedirectBuilder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns the redirect for the request owning `memo`, starting a handshake for
    /// `binding` only the first time it is asked.
    pub fn handle_redirect(&self, memo: &RedirectMemo, binding: &str) -> AuthRedirect {
        memo.0
            .get_or_init(|| {
                info!("Starting Reclique login handshake");
                AuthRedirect {
                    url: self.client.build_authentication_url(binding),
                    cache_max_age: 0,
                }
            })
            .clone()
    }
}
