//! HTTP surface of the Reclique login handshake.
//!
//! Serves the two entry points of the flow: the redirect to Reclique and the callback
//! Reclique sends the member back to. Each browser is tied to its pending handshake
//! through a server-side session.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use domain::identity::IdentityMapper;
use domain::login::{AuthRedirectBuilder, CallbackHandler, LoginUrls};
use domain::user_authorizer::UserAuthorizer;
use domain::{OAuthClient, StateManager};
use log::*;
use service::config::Config;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tower_http::cors::CorsLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;

mod controller;
mod error;
mod extractors;
mod response;
mod router;

pub use error::{Error, Result};

const STATE_CLEANUP_PERIOD: Duration = Duration::from_secs(60);
const SESSION_CLEANUP_PERIOD: Duration = Duration::from_secs(60);

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub redirect_builder: AuthRedirectBuilder,
    pub callback_handler: CallbackHandler,
    states: StateManager,
}

impl AppState {
    pub fn new(
        config: Config,
        client: OAuthClient,
        authorizer: Arc<dyn UserAuthorizer>,
        identity: Arc<dyn IdentityMapper>,
    ) -> std::result::Result<Self, domain::error::Error> {
        let urls = LoginUrls::new(config.virtual_y_url(), config.virtual_y_login_url())?;
        let states = client.state_manager().clone();

        Ok(Self {
            redirect_builder: AuthRedirectBuilder::new(client.clone()),
            callback_handler: CallbackHandler::new(client, authorizer, identity, urls),
            states,
            config,
        })
    }

    /// The pending CSRF states shared by every handler.
    pub fn states(&self) -> &StateManager {
        &self.states
    }
}

/// Opens the session store: an in-memory SQLite database holding the login sessions.
///
/// The pool holds exactly one connection for the life of the process: the database
/// belongs to that connection and disappears with it.
pub async fn init_session_store() -> std::result::Result<SqliteStore, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    let store = SqliteStore::new(pool);
    store.migrate().await?;
    Ok(store)
}

/// Periodically deletes sessions whose inactivity expiry has passed.
pub fn spawn_session_cleanup(store: SqliteStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = store
            .continuously_delete_expired(SESSION_CLEANUP_PERIOD)
            .await
        {
            error!("Session cleanup stopped: {e}");
        }
    })
}

/// Session layer binding each browser to its pending handshake.
///
/// The cookie must survive the top-level cross-site navigation back from Reclique, so it
/// is sent with `SameSite=Lax`.
pub fn session_layer<S>(store: S, config: &Config) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_secure(config.is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            config.session_expiry_seconds as i64,
        )))
}

/// Periodically drops CSRF states whose handshake was never completed.
pub fn spawn_state_cleanup(states: StateManager) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(STATE_CLEANUP_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = states.cleanup_expired();
            if removed > 0 {
                debug!("Removed {removed} expired CSRF states");
            }
        }
    })
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", host, app_state.config.port);
    let listener = TcpListener::bind(&server_url).await?;

    let cors_layer = cors_layer(&app_state.config);
    let session_store = init_session_store().await.map_err(std::io::Error::other)?;
    let session_layer = session_layer(session_store.clone(), &app_state.config);

    let _session_cleanup = spawn_session_cleanup(session_store);

    let _cleanup = spawn_state_cleanup(app_state.states().clone());

    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(
        listener,
        router::define_routes(app_state)
            .layer(session_layer)
            .layer(cors_layer),
    )
    .await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::COOKIE])
        .allow_origin(origins)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_app_state_shares_states_with_client() {
        let state = app_state(
            config_for("http://127.0.0.1:9"),
            Arc::new(RecordingAuthorizer::default()),
        );

        let redirect = state
            .redirect_builder
            .handle_redirect(&domain::login::RedirectMemo::new(), "binding-a");

        assert!(redirect.url.contains("state="));
        assert_eq!(state.states().pending(), 1);
    }

    #[test]
    fn test_app_state_rejects_invalid_login_urls() {
        let config = config_for("http://127.0.0.1:9")
            .set_virtual_y_urls("/virtual-y".to_string(), "http://[bad".to_string());
        let client = domain::gateway::reclique::new_client(&config).unwrap();

        let result = AppState::new(
            config,
            client,
            Arc::new(RecordingAuthorizer::default()),
            Arc::new(ProfileEmail),
        );

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_session_cleanup_task_keeps_running() {
        let store = init_session_store().await.unwrap();

        let handle = spawn_session_cleanup(store);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // A failed delete pass ends the task.
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test]
    async fn test_state_cleanup_task_runs() {
        let states = StateManager::with_ttl(chrono::Duration::seconds(-1));
        states.issue("binding-a");

        let handle = spawn_state_cleanup(states.clone());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(states.pending(), 0);
    }
}
