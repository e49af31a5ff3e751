use crate::error::{Error, WebErrorKind};
use axum::{extract::FromRequestParts, http::request::Parts};
use log::*;
use tower_sessions::Session;

/// Session key holding the browser's binding id.
pub(crate) const BINDING_KEY: &str = "reclique_oauth2.binding";

/// Opaque id tying a browser session to its pending CSRF state.
///
/// The id lives in the server-side session; only the session cookie reaches the browser.
/// A session that has none yet is given a fresh one.
pub(crate) struct SessionBinding(pub String);

impl<S> FromRequestParts<S> for SessionBinding
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session(parts, state).await?;

        if let Some(binding) = session.get::<String>(BINDING_KEY).await? {
            return Ok(SessionBinding(binding));
        }

        let binding = uuid::Uuid::new_v4().simple().to_string();
        session.insert(BINDING_KEY, &binding).await?;
        trace!("Bound new session for the Reclique login flow");
        Ok(SessionBinding(binding))
    }
}

/// The binding of a session that already started a handshake, if any.
///
/// Never creates a session, so requests without a login cookie leave nothing behind in
/// the session store.
pub(crate) struct ExistingSessionBinding(pub Option<String>);

impl<S> FromRequestParts<S> for ExistingSessionBinding
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session(parts, state).await?;
        Ok(ExistingSessionBinding(
            session.get::<String>(BINDING_KEY).await?,
        ))
    }
}

async fn session<S>(parts: &mut Parts, state: &S) -> Result<Session, Error>
where
    S: Send + Sync,
{
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| {
            error!("Session layer missing from router: {msg}");
            Error::Web(WebErrorKind::Session)
        })
}
