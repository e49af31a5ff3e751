//! OAuth access token types.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Access token returned by the provider's token endpoint.
///
/// Lives only for the duration of one callback request; it is used once to fetch the
/// member profile and then dropped.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer credential for the profile endpoint.
    pub secret: SecretString,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// When the access token expires, if the provider said.
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl AccessToken {
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }
}

/// Wire shape of a successful token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

// Lifetimes chrono cannot represent are treated as unknown.
fn expiry_from_now(secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
}

impl TryFrom<TokenResponse> for AccessToken {
    type Error = Error;

    fn try_from(response: TokenResponse) -> Result<Self, Self::Error> {
        if response.access_token.trim().is_empty() {
            return Err(oauth_error(
                OAuthErrorKind::InvalidResponse,
                "Token response carried a blank access_token",
            ));
        }

        Ok(AccessToken {
            secret: SecretString::new(response.access_token),
            token_type: response.token_type,
            expires_at: response.expires_in.and_then(expiry_from_now),
            scopes: response
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_full_response() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"bearer","expires_in":3600,"scope":"read profile"}"#,
        )
        .unwrap();
        let token = AccessToken::try_from(response).unwrap();

        assert_eq!(token.expose(), "abc");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.scopes, vec!["read", "profile"]);
        assert!(token.expires_at.unwrap() > Utc::now());
    }

    #[test]
    fn test_token_defaults() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        let token = AccessToken::try_from(response).unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_at.is_none());
        assert!(token.scopes.is_empty());
    }

    #[test]
    fn test_out_of_range_expires_in_is_unknown_expiry() {
        for expires_in in [i64::MAX, i64::MIN] {
            let response: TokenResponse = serde_json::from_str(&format!(
                r#"{{"access_token":"abc","expires_in":{expires_in}}}"#
            ))
            .unwrap();
            let token = AccessToken::try_from(response).unwrap();

            assert_eq!(token.expose(), "abc");
            assert!(token.expires_at.is_none());
        }
    }

    #[test]
    fn test_blank_access_token_rejected() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"  "}"#).unwrap();
        assert!(AccessToken::try_from(response).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"super-secret"}"#).unwrap();
        let token = AccessToken::try_from(response).unwrap();
        assert!(!format!("{:?}", token).contains("super-secret"));
    }
}
