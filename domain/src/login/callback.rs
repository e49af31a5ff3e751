use std::error::Error as StdError;
use std::sync::Arc;

use log::*;
use reclique_auth::oauth::Client;
use url::{Position, Url};

use crate::error::Error;
use crate::identity::IdentityMapper;
use crate::user_authorizer::UserAuthorizer;

// Only used to resolve relative denial URLs; never leaves this module.
const RELATIVE_BASE: &str = "http://relative.invalid";

/// Stage at which a callback was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFailure {
    CsrfMismatch,
    TokenExchange,
    ProfileFetch,
}

impl CallbackFailure {
    /// The message shown to the callback page.
    pub fn message(&self) -> &'static str {
        match self {
            CallbackFailure::CsrfMismatch => "Wrong cross site check",
            CallbackFailure::TokenExchange => "Failed to load access token",
            CallbackFailure::ProfileFetch => "Failed to load user data",
        }
    }
}

/// Result of handling one provider callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The handshake stopped; the user must start over from the redirect.
    Failed(CallbackFailure),
    /// The member was authorized locally.
    Granted { redirect_to: String },
    /// The member has no eligible subscription.
    Denied { redirect_to: String },
}

/// Redirect targets for the two terminal outcomes.
#[derive(Debug, Clone)]
pub struct LoginUrls {
    success_url: String,
    denial_url: String,
}

impl LoginUrls {
    /// Validates both targets and precomputes the denial URL with `error=1` appended.
    ///
    /// Relative targets are kept relative.
    pub fn new(success_url: &str, denial_url: &str) -> Result<Self, Error> {
        resolve(success_url)?;
        Ok(Self {
            success_url: success_url.to_string(),
            denial_url: with_error_flag(denial_url)?,
        })
    }

    pub fn success_url(&self) -> &str {
        &self.success_url
    }

    pub fn denial_url(&self) -> &str {
        &self.denial_url
    }
}

/// Handles entry point B: the provider redirecting back with `code` and `state`.
///
/// Runs the stages strictly in order and stops at the first failure. Nothing is retried:
/// both the code and the state are single-use.
#[derive(Clone)]
pub struct CallbackHandler {
    client: Client,
    authorizer: Arc<dyn UserAuthorizer>,
    identity: Arc<dyn IdentityMapper>,
    urls: LoginUrls,
}

impl CallbackHandler {
    pub fn new(
        client: Client,
        authorizer: Arc<dyn UserAuthorizer>,
        identity: Arc<dyn IdentityMapper>,
        urls: LoginUrls,
    ) -> Self {
        Self {
            client,
            authorizer,
            identity,
            urls,
        }
    }

    /// Handle a callback for the session identified by `binding`.
    ///
    /// Stage failures come back as `Ok(CallbackOutcome::Failed(..))`; an `Err` means the
    /// user authorizer itself failed.
    pub async fn handle_callback(
        &self,
        binding: &str,
        code: &str,
        state: &str,
    ) -> Result<CallbackOutcome, Error> {
        if let Err(e) = self.client.validate_csrf_token(binding, state) {
            warn!("Rejected Reclique callback state: {}", cause_chain(&e));
            return Ok(CallbackOutcome::Failed(CallbackFailure::CsrfMismatch));
        }

        let token = match self.client.exchange_code_for_access_token(code).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Reclique token exchange failed: {}", cause_chain(&e));
                return Ok(CallbackOutcome::Failed(CallbackFailure::TokenExchange));
            }
        };

        let profile = match self.client.request_user_data(&token).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Reclique profile fetch failed: {}", cause_chain(&e));
                return Ok(CallbackOutcome::Failed(CallbackFailure::ProfileFetch));
            }
        };
        drop(token);

        if !self.client.validate_user_subscription(&profile) {
            info!(
                "Reclique member {} has no eligible subscription, returning to login",
                profile.member_id
            );
            return Ok(CallbackOutcome::Denied {
                redirect_to: self.urls.denial_url.clone(),
            });
        }

        let identity = self.identity.derive_identity(&profile);
        self.authorizer
            .authorize_user(&identity.name, &identity.email)
            .await
            .inspect_err(|e| {
                error!(
                    "Failed to authorize Reclique member {}: {:?}",
                    profile.member_id, e
                )
            })?;

        info!(
            "Granted gated content access to Reclique member {}",
            profile.member_id
        );
        Ok(CallbackOutcome::Granted {
            redirect_to: self.urls.success_url.clone(),
        })
    }
}

fn cause_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn resolve(target: &str) -> Result<(Url, bool), Error> {
    match Url::parse(target) {
        Ok(url) => Ok((url, false)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if !is_local_reference(target) {
                return Err(Error::config(
                    "Relative redirect targets must start with '/', '?' or '#'",
                ));
            }
            Ok((Url::parse(RELATIVE_BASE)?.join(target)?, true))
        }
        Err(e) => Err(e.into()),
    }
}

// Scheme-relative targets (`//host`, `/\host`) would leave this site once resolved.
fn is_local_reference(target: &str) -> bool {
    match target.as_bytes() {
        [b'/', b'/' | b'\\', ..] => false,
        [b'/' | b'?' | b'#', ..] => true,
        _ => false,
    }
}

fn with_error_flag(target: &str) -> Result<String, Error> {
    let (mut url, relative) = resolve(target)?;
    url.query_pairs_mut().append_pair("error", "1");
    if relative {
        Ok(url[Position::BeforePath..].to_string())
    } else {
        Ok(url.into())
    }
}
