//! Reclique OAuth provider implementation.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{status_error, Error};
use crate::oauth::token::{AccessToken, TokenResponse};
use crate::oauth::UserInfo;

/// Provider endpoints used by the authorization code flow.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub authorize_url: Url,
    pub token_url: Url,
    pub userinfo_url: Url,
}

impl Endpoints {
    /// Derive the standard endpoint set from a base URL.
    pub fn from_base(base_url: &str) -> Result<Self, Error> {
        let base = Url::parse(base_url.trim_end_matches('/'))?;
        let path = base.path().trim_end_matches('/').to_string();
        let join = |suffix: &str| {
            let mut url = base.clone();
            url.set_path(&format!("{path}{suffix}"));
            url
        };

        Ok(Self {
            authorize_url: join("/oauth/authorize"),
            token_url: join("/oauth/token"),
            userinfo_url: join("/oauth/me"),
        })
    }
}

/// Client registration and endpoint settings for Reclique.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub endpoints: Endpoints,
}

/// Form body sent to the token endpoint.
#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'static str,
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

/// Reclique OAuth provider.
///
/// Handles the provider side of the login handshake:
/// - Authorization URL generation
/// - Authorization code exchange
/// - Member profile retrieval
pub struct Provider {
    settings: Settings,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new Reclique OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `settings` - Client registration and endpoints
    /// * `http_client` - Client carrying the request timeout; see [`crate::http::HttpClientBuilder`]
    pub fn new(settings: Settings, http_client: reqwest::Client) -> Self {
        Self {
            settings,
            http_client,
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn authorization_url(&self, state: &str) -> String {
        let mut url = self.settings.endpoints.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("scope", &self.settings.scopes.join(" "))
            .append_pair("state", state);

        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error> {
        let request = TokenExchangeRequest {
            grant_type: "authorization_code",
            code,
            client_id: &self.settings.client_id,
            client_secret: self.settings.client_secret.expose_secret(),
            redirect_uri: &self.settings.redirect_uri,
        };

        debug!("Exchanging Reclique authorization code for an access token");

        let response = self
            .http_client
            .post(self.settings.endpoints.token_url.clone())
            .form(&request)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach Reclique token endpoint: {:?}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Reclique token endpoint returned {}: {}", status, error_text);
            return Err(status_error(status.as_u16(), &error_text));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .inspect_err(|e| warn!("Failed to parse Reclique token response: {:?}", e))?;

        let token = AccessToken::try_from(token_response)?;
        info!("Successfully exchanged Reclique authorization code");
        Ok(token)
    }

    async fn get_user_info(&self, access_token: &AccessToken) -> Result<UserInfo, Error> {
        let response = self
            .http_client
            .get(self.settings.endpoints.userinfo_url.clone())
            .bearer_auth(access_token.expose())
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach Reclique profile endpoint: {:?}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Reclique profile endpoint returned {}: {}", status, error_text);
            return Err(status_error(status.as_u16(), &error_text));
        }

        let user_info: UserInfo = response
            .json()
            .await
            .inspect_err(|e| warn!("Failed to parse Reclique member profile: {:?}", e))?;

        debug!("Loaded Reclique profile for member {}", user_info.member_id);
        Ok(user_info)
    }
}
