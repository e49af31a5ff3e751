use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use domain::login::RedirectMemo;

/// The redirect memo of the current request, stored in its extensions.
///
/// Every extraction within one request yields a handle on the same memo; a new request
/// starts with an empty one.
pub(crate) struct RequestRedirectMemo(pub RedirectMemo);

impl<S> FromRequestParts<S> for RequestRedirectMemo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(memo) = parts.extensions.get::<RedirectMemo>() {
            return Ok(RequestRedirectMemo(memo.clone()));
        }

        let memo = RedirectMemo::new();
        parts.extensions.insert(memo.clone());
        Ok(RequestRedirectMemo(memo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_memo_is_shared_within_a_request() {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();

        let RequestRedirectMemo(first) = RequestRedirectMemo::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        let RequestRedirectMemo(second) =
            RequestRedirectMemo::from_request_parts(&mut parts, &())
                .await
                .unwrap();

        assert!(parts.extensions.get::<RedirectMemo>().is_some());
        assert!(first.get().is_none());
        assert!(second.get().is_none());
    }
}
