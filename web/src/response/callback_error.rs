use domain::login::CallbackFailure;
use serde::Serialize;
use utoipa::ToSchema;

/// Structured error returned when a callback stops before a redirect.
///
/// Callback pages check `error` to tell a failed handshake from a normal page load.
#[derive(Debug, Serialize, ToSchema)]
pub struct CallbackError {
    /// Always 1.
    #[schema(example = 1)]
    pub error: u8,
    /// Stage-specific message.
    #[schema(example = "Wrong cross site check")]
    pub message: &'static str,
}

impl From<CallbackFailure> for CallbackError {
    fn from(failure: CallbackFailure) -> Self {
        Self {
            error: 1,
            message: failure.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_callback_error() {
        let body = serde_json::to_value(CallbackError::from(CallbackFailure::TokenExchange))
            .unwrap();
        assert_eq!(
            body,
            json!({"error": 1, "message": "Failed to load access token"})
        );
    }
}
