//! Reclique OAuth client.
//!
//! Provides a configured Reclique OAuth client for the login flow.

use std::sync::Arc;
use std::time::Duration;

use log::*;
use reclique_auth::http::HttpClientBuilder;
use reclique_auth::oauth::providers::reclique::{Endpoints, Provider, Settings};
use reclique_auth::oauth::{Client, StateManager, SubscriptionPolicy};
use secrecy::SecretString;
use service::config::Config;
use url::Url;

use crate::error::Error;

/// Create a new Reclique OAuth client.
///
/// # Arguments
///
/// * `config` - Provides the client registration, endpoints, timeouts and the accepted
///   membership statuses
///
/// # Returns
///
/// A configured client ready for use, or a `Config` error naming the missing setting.
pub fn new_client(config: &Config) -> Result<Client, Error> {
    let client_id = config
        .reclique_client_id()
        .ok_or_else(|| Error::config("RECLIQUE_CLIENT_ID is not set"))?;
    let client_secret = config
        .reclique_client_secret()
        .ok_or_else(|| Error::config("RECLIQUE_CLIENT_SECRET is not set"))?;
    let redirect_uri = config
        .reclique_redirect_uri()
        .ok_or_else(|| Error::config("RECLIQUE_REDIRECT_URI is not set"))?;
    Url::parse(&redirect_uri)?;

    let endpoints = endpoints(config)?;
    debug!(
        "Reclique endpoints: authorize={} token={} userinfo={}",
        endpoints.authorize_url, endpoints.token_url, endpoints.userinfo_url
    );

    let http_client = HttpClientBuilder::new()
        .with_timeout(Duration::from_secs(config.provider_timeout_secs))
        .build()
        .map_err(reclique_auth::Error::from)?;

    let provider = Provider::new(
        Settings {
            client_id,
            client_secret: SecretString::new(client_secret),
            redirect_uri,
            scopes: config.reclique_scopes.clone(),
            endpoints,
        },
        http_client,
    );

    Ok(Client::new(
        Arc::new(provider),
        StateManager::with_ttl(chrono::Duration::seconds(config.csrf_state_ttl_secs)),
        SubscriptionPolicy::new(&config.reclique_active_statuses),
    ))
}

fn endpoints(config: &Config) -> Result<Endpoints, Error> {
    let mut endpoints = Endpoints::from_base(config.reclique_base_url())?;
    if let Some(url) = config.reclique_authorize_url() {
        endpoints.authorize_url = Url::parse(&url)?;
    }
    if let Some(url) = config.reclique_token_url() {
        endpoints.token_url = Url::parse(&url)?;
    }
    if let Some(url) = config.reclique_userinfo_url() {
        endpoints.userinfo_url = Url::parse(&url)?;
    }
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["reclique_login"];
        argv.extend_from_slice(args);
        Config::from_args(argv)
    }

    #[test]
    fn test_missing_client_id_is_config_error() {
        let err = new_client(&config(&[]).set_reclique_redirect_uri(
            "https://y.example.org/reclique/oauth2/callback".to_string(),
        ))
        .err()
        .unwrap();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }

    #[test]
    fn test_invalid_redirect_uri_is_config_error() {
        let err = new_client(
            &config(&[])
                .set_reclique_client("id".to_string(), "secret".to_string())
                .set_reclique_redirect_uri("not a url".to_string()),
        )
        .err()
        .unwrap();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }

    #[test]
    fn test_builds_client_with_endpoint_override() {
        let config = config(&["--reclique-authorize-url", "https://login.example.org/authorize"])
            .set_reclique_client("id".to_string(), "secret".to_string())
            .set_reclique_redirect_uri("https://y.example.org/cb".to_string());

        let client = new_client(&config).unwrap();
        let url = client.build_authentication_url("session-a");

        assert!(url.starts_with("https://login.example.org/authorize?"));
        assert!(url.contains("client_id=id"));
        assert_eq!(client.state_manager().pending(), 1);
    }
}
