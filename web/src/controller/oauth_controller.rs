//! Controller for the Reclique login handshake.
//!
//! Both endpoints are reached through top-level browser navigation, so every answer is
//! either a `302 Found` or a small JSON body the callback page can inspect.

use crate::extractors::redirect_memo::RequestRedirectMemo;
use crate::extractors::session_binding::{ExistingSessionBinding, SessionBinding};
use crate::response::callback_error::CallbackError;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::login::{CallbackFailure, CallbackOutcome};
use log::*;
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters Reclique appends to the callback URL.
///
/// Absent values are treated as empty and fail the check they feed into.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthenticateCallback {
    /// Authorization code issued by Reclique
    #[serde(default)]
    pub code: String,
    /// CSRF state issued with the redirect
    #[serde(default)]
    pub state: String,
}

/// GET /reclique/oauth2/authenticate
///
/// Starts a login handshake by sending the browser to Reclique's authorization endpoint.
#[utoipa::path(
    get,
    path = "/reclique/oauth2/authenticate",
    responses(
        (status = 302, description = "Redirect to the Reclique authorization endpoint"),
        (status = 500, description = "Session store unavailable"),
    )
)]
pub async fn authenticate_redirect(
    State(app_state): State<AppState>,
    SessionBinding(binding): SessionBinding,
    RequestRedirectMemo(memo): RequestRedirectMemo,
) -> impl IntoResponse {
    let redirect = app_state.redirect_builder.handle_redirect(&memo, &binding);
    debug!("Redirecting to Reclique authorization endpoint");

    (
        StatusCode::FOUND,
        [
            (LOCATION, redirect.url),
            (
                CACHE_CONTROL,
                format!("max-age={}, private, no-store", redirect.cache_max_age),
            ),
        ],
    )
}

/// GET /reclique/oauth2/callback
///
/// Completes a login handshake started by `authenticate_redirect`. A browser without a
/// login session fails the cross site check, and no session is created for it.
#[utoipa::path(
    get,
    path = "/reclique/oauth2/callback",
    params(AuthenticateCallback),
    responses(
        (status = 200, description = "The handshake failed at the named stage", body = CallbackError),
        (status = 302, description = "Redirect to Virtual Y, or back to its login page when the member has no eligible subscription"),
        (status = 500, description = "The member could not be authorized locally"),
    )
)]
pub async fn authenticate_callback(
    State(app_state): State<AppState>,
    ExistingSessionBinding(binding): ExistingSessionBinding,
    Query(params): Query<AuthenticateCallback>,
) -> Result<Response, Error> {
    let Some(binding) = binding else {
        warn!("Rejected Reclique callback: no login session");
        return Ok(Json(CallbackError::from(CallbackFailure::CsrfMismatch)).into_response());
    };

    let outcome = app_state
        .callback_handler
        .handle_callback(&binding, &params.code, &params.state)
        .await?;

    Ok(match outcome {
        CallbackOutcome::Failed(failure) => Json(CallbackError::from(failure)).into_response(),
        CallbackOutcome::Granted { redirect_to } | CallbackOutcome::Denied { redirect_to } => {
            (StatusCode::FOUND, [(LOCATION, redirect_to)]).into_response()
        }
    })
}
