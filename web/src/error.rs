use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// The session store could not be read or written.
    Session,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Domain(domain_error) => match domain_error.error_kind {
                DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                    InternalErrorKind::Config => {
                        error!("Configuration error: {:?}", domain_error.source);
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                    InternalErrorKind::Authorization => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                },
                DomainErrorKind::External(external_error_kind) => match external_error_kind {
                    ExternalErrorKind::Network => {
                        (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
                    }
                },
            },
            Error::Web(web_error_kind) => match web_error_kind {
                WebErrorKind::Session => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "SESSION UNAVAILABLE").into_response()
                }
            },
        }
    }
}

impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        Error::Domain(err)
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(err: tower_sessions::session::Error) -> Self {
        warn!("Session store error: {:?}", err);
        Error::Web(WebErrorKind::Session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_500() {
        let response = Error::from(DomainError::config("missing")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_authorization_error_is_500() {
        let response =
            Error::from(DomainError::authorization("store down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_external_network_error_is_502() {
        let err = DomainError {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        };
        assert_eq!(
            Error::from(err).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_session_error_is_500() {
        let response = Error::Web(WebErrorKind::Session).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
