//! OAuth provider trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::AccessToken;
use crate::error::Error;

/// Membership record attached to a member profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    /// Provider status string, e.g. "Active" or "Expired".
    pub status: String,
    /// End of the paid period, when the provider reports one.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Member profile retrieved from the OAuth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider's unique member identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub member_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub membership: Option<Membership>,
}

/// Trait for the provider side of the authorization code flow.
///
/// Implementations handle platform-specific details of:
/// - Authorization URL generation
/// - Authorization code exchange for an access token
/// - Member profile retrieval
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the authorization URL the browser is sent to, embedding `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from OAuth callback
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error>;

    /// Get the member profile using an access token.
    async fn get_user_info(&self, access_token: &AccessToken) -> Result<UserInfo, Error>;
}

// Member ids arrive as JSON numbers from some provider deployments.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}
