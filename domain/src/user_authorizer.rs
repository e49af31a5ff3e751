//! Local account authorization for members who passed the subscription check.

use async_trait::async_trait;
use log::*;

use crate::error::Error;

/// Logs a member into the platform, creating the local account when needed.
///
/// Implementations own account lookup, provisioning, session establishment and audit
/// logging. A returned error aborts the callback before any redirect is issued.
#[async_trait]
pub trait UserAuthorizer: Send + Sync {
    async fn authorize_user(&self, name: &str, email: &str) -> Result<(), Error>;
}

/// Authorizer that only records an audit entry for every authorization.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditLogAuthorizer;

#[async_trait]
impl UserAuthorizer for AuditLogAuthorizer {
    async fn authorize_user(&self, name: &str, email: &str) -> Result<(), Error> {
        info!("Authorized gated content user name={:?} email={:?}", name, email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_audit_log_authorizer_accepts_any_identity() {
        assert!(AuditLogAuthorizer.authorize_user("", "").await.is_ok());
        assert!(AuditLogAuthorizer
            .authorize_user("Ada Lovelace", "ada@example.com")
            .await
            .is_ok());
    }
}
