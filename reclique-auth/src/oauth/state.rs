//! CSRF state management for OAuth flows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::debug;

use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Pending state for one browser session.
#[derive(Debug, Clone)]
pub struct StateData {
    /// The state value sent to the provider.
    pub state: String,
    /// When this state expires.
    pub expires_at: DateTime<Utc>,
}

/// Manager for OAuth state parameters with expiration.
///
/// Holds at most one pending state per session binding. Issuing a new state for a binding
/// replaces the previous one, and validating always removes it, so every state validates
/// at most once.
#[derive(Clone)]
pub struct StateManager {
    states: Arc<Mutex<HashMap<String, StateData>>>,
    ttl: Duration,
}

impl StateManager {
    /// Create a new state manager with default TTL of 10 minutes.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(10))
    }

    /// Create a new state manager with custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Generate a new state token for `binding`, discarding any state still pending for it.
    ///
    /// # Returns
    ///
    /// The generated state token string.
    pub fn issue(&self, binding: &str) -> String {
        let state = Self::generate_token();
        let data = StateData {
            state: state.clone(),
            expires_at: Utc::now() + self.ttl,
        };

        if self.lock().insert(binding.to_string(), data).is_some() {
            debug!("Replaced a pending OAuth state with a fresh handshake");
        }

        state
    }

    /// Validate and consume the state pending for `binding`.
    ///
    /// The pending state is removed whatever the outcome, so a mismatching guess also burns
    /// the legitimate value.
    pub fn consume(&self, binding: &str, state: &str) -> Result<(), Error> {
        let data = self
            .lock()
            .remove(binding)
            .ok_or_else(|| oauth_error(OAuthErrorKind::StateMissing, "No pending state"))?;

        if !tokens_match(data.state.as_bytes(), state.as_bytes()) {
            return Err(oauth_error(
                OAuthErrorKind::InvalidState,
                "State does not match the pending value",
            ));
        }

        if Utc::now() > data.expires_at {
            return Err(oauth_error(OAuthErrorKind::StateExpired, "State has expired"));
        }

        Ok(())
    }

    /// Clean up expired states.
    ///
    /// Should be called periodically to prevent memory leaks from abandoned logins.
    pub fn cleanup_expired(&self) -> usize {
        let mut states = self.lock();
        let before = states.len();
        let now = Utc::now();
        states.retain(|_, data| data.expires_at > now);
        before - states.len()
    }

    /// Number of states currently pending.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StateData>> {
        // The map holds no invariant that a panicking holder could break.
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate a cryptographically random state token.
    fn generate_token() -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(random_bytes)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparison whose running time does not depend on where the inputs differ.
fn tokens_match(expected: &[u8], supplied: &[u8]) -> bool {
    if expected.len() != supplied.len() {
        return false;
    }
    expected
        .iter()
        .zip(supplied)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
