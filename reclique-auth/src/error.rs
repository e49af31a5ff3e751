//! Error types for the `reclique-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for reclique-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in reclique-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    Http(HttpErrorKind),
}

/// Errors from OAuth operations.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// No CSRF state is pending for the session.
    StateMissing,
    /// The supplied state does not match the pending one.
    InvalidState,
    /// The pending state outlived its TTL.
    StateExpired,
    TokenExchangeFailed,
    UserInfoFailed,
    InvalidResponse,
    Configuration,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    Timeout,
    Network,
    /// The provider answered with a non-success status code.
    Status(u16),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_timeout() {
            ErrorKind::Http(HttpErrorKind::Timeout)
        } else if err.is_decode() {
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse)
        } else if let Some(status) = err.status() {
            ErrorKind::Http(HttpErrorKind::Status(status.as_u16()))
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::Configuration),
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create HTTP status errors.
pub fn status_error(status: u16, body: &str) -> Error {
    Error {
        source: Some(body.to_string().into()),
        error_kind: ErrorKind::Http(HttpErrorKind::Status(status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = oauth_error(OAuthErrorKind::InvalidState, "mismatch");
        assert_eq!(err.to_string(), "OAuth error: InvalidState");

        let err = status_error(401, "unauthorized");
        assert_eq!(err.to_string(), "HTTP error: Status(401)");
    }

    #[test]
    fn test_source_is_preserved() {
        let err = oauth_error(OAuthErrorKind::TokenExchangeFailed, "blank access_token");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source, Some("blank access_token".to_string()));
    }

    #[test]
    fn test_url_parse_error_is_configuration() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::Configuration)
        );
    }
}
