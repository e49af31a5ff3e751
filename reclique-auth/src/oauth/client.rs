//! The OAuth client used by the login flow.

use std::sync::Arc;

use tracing::debug;

use super::{AccessToken, Provider, StateManager, SubscriptionPolicy, UserInfo};
use crate::error::{Error, ErrorKind, OAuthErrorKind};

/// OAuth client owning the protocol mechanics of the login handshake.
///
/// Composes a [`Provider`] for network calls, a [`StateManager`] for CSRF state and a
/// [`SubscriptionPolicy`] for the access decision. Session storage of the binding that
/// ties a browser to its pending state belongs to the caller.
#[derive(Clone)]
pub struct Client {
    provider: Arc<dyn Provider>,
    states: StateManager,
    policy: SubscriptionPolicy,
}

impl Client {
    pub fn new(
        provider: Arc<dyn Provider>,
        states: StateManager,
        policy: SubscriptionPolicy,
    ) -> Self {
        Self {
            provider,
            states,
            policy,
        }
    }

    /// Start a fresh handshake for `binding` and return the provider authorization URL.
    ///
    /// Any state still pending for the binding is invalidated.
    pub fn build_authentication_url(&self, binding: &str) -> String {
        let state = self.states.issue(binding);
        debug!("Issued OAuth state for a new handshake");
        self.provider.authorization_url(&state)
    }

    /// Check `state` against the value pending for `binding`, consuming it.
    pub fn validate_csrf_token(&self, binding: &str, state: &str) -> Result<(), Error> {
        self.states.consume(binding, state)
    }

    /// Exchange an authorization code at the provider's token endpoint.
    ///
    /// Failures keep their cause in the error kind; an `InvalidResponse` kind stays as is
    /// and everything else is reported under `TokenExchangeFailed` with the cause as source.
    pub async fn exchange_code_for_access_token(&self, code: &str) -> Result<AccessToken, Error> {
        self.provider
            .exchange_code(code)
            .await
            .map_err(|e| stage_error(e, OAuthErrorKind::TokenExchangeFailed))
    }

    /// Fetch the member profile with a freshly exchanged token.
    pub async fn request_user_data(&self, token: &AccessToken) -> Result<UserInfo, Error> {
        self.provider
            .get_user_info(token)
            .await
            .map_err(|e| stage_error(e, OAuthErrorKind::UserInfoFailed))
    }

    /// Whether the member holds an eligible subscription.
    pub fn validate_user_subscription(&self, profile: &UserInfo) -> bool {
        self.policy.is_eligible(profile)
    }

    /// The state manager, for periodic cleanup of abandoned handshakes.
    pub fn state_manager(&self) -> &StateManager {
        &self.states
    }
}

// Tags transport failures with the stage they happened in, keeping the original error as
// the source so logs still show timeout vs. rejection vs. network.
fn stage_error(err: Error, stage: OAuthErrorKind) -> Error {
    match err.error_kind {
        ErrorKind::OAuth(_) => err,
        ErrorKind::Http(_) => Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::OAuth(stage),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{oauth_error, status_error};
    use crate::oauth::Membership;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::error::Error as _;

    struct StubProvider {
        token_status: Option<u16>,
        profile: Option<UserInfo>,
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn authorization_url(&self, state: &str) -> String {
            format!("https://provider.test/authorize?state={state}")
        }

        async fn exchange_code(&self, _code: &str) -> Result<AccessToken, Error> {
            match self.token_status {
                None => Ok(AccessToken {
                    secret: SecretString::new("tok".to_string()),
                    token_type: "Bearer".to_string(),
                    expires_at: None,
                    scopes: vec![],
                }),
                Some(status) => Err(status_error(status, "rejected")),
            }
        }

        async fn get_user_info(&self, _token: &AccessToken) -> Result<UserInfo, Error> {
            self.profile.clone().ok_or_else(|| {
                oauth_error(OAuthErrorKind::InvalidResponse, "profile missing member_id")
            })
        }
    }

    fn client(token_status: Option<u16>, profile: Option<UserInfo>) -> Client {
        Client::new(
            Arc::new(StubProvider {
                token_status,
                profile,
            }),
            StateManager::new(),
            SubscriptionPolicy::default(),
        )
    }

    fn active_profile() -> UserInfo {
        UserInfo {
            member_id: "M-1".to_string(),
            first_name: None,
            last_name: None,
            email: None,
            membership: Some(Membership {
                status: "Active".to_string(),
                expires_at: None,
            }),
        }
    }

    fn state_of(url: &str) -> String {
        url.split("state=").nth(1).unwrap().to_string()
    }

    #[test]
    fn test_generated_state_validates_exactly_once() {
        let client = client(None, None);
        let url = client.build_authentication_url("session-a");
        let state = state_of(&url);

        assert!(client.validate_csrf_token("session-a", &state).is_ok());
        assert!(client.validate_csrf_token("session-a", &state).is_err());
    }

    #[test]
    fn test_unissued_state_is_rejected() {
        let client = client(None, None);
        client.build_authentication_url("session-a");

        assert!(client.validate_csrf_token("session-a", "never-issued").is_err());
    }

    #[tokio::test]
    async fn test_token_rejection_is_tagged_with_stage() {
        let client = client(Some(400), None);
        let err = client.exchange_code_for_access_token("code").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("HTTP error: Status(400)".to_string())
        );
    }

    #[tokio::test]
    async fn test_profile_parse_error_keeps_its_kind() {
        let client = client(None, None);
        let token = client.exchange_code_for_access_token("code").await.unwrap();
        let err = client.request_user_data(&token).await.unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse)
        );
    }

    #[tokio::test]
    async fn test_profile_success_and_subscription() {
        let client = client(None, Some(active_profile()));
        let token = client.exchange_code_for_access_token("code").await.unwrap();
        let profile = client.request_user_data(&token).await.unwrap();

        assert!(client.validate_user_subscription(&profile));
    }
}
