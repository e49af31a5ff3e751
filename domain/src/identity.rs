//! Mapping from a provider profile to the local account identity.

use log::*;
use reclique_auth::oauth::UserInfo;

/// Name and email handed to the [`crate::user_authorizer::UserAuthorizer`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Derives the local identity of a member from their provider profile.
///
/// Which profile fields make up the local account is a platform decision; the login flow
/// only requires that some mapping is supplied at startup.
pub trait IdentityMapper: Send + Sync {
    fn derive_identity(&self, profile: &UserInfo) -> Identity;
}

/// Mapper that yields an empty identity for every member.
///
/// Placeholder until the platform supplies its mapping; every login through it is logged
/// as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnmappedIdentity;

impl IdentityMapper for UnmappedIdentity {
    fn derive_identity(&self, profile: &UserInfo) -> Identity {
        warn!(
            "No identity mapping configured; authorizing Reclique member {} with an empty name and email",
            profile.member_id
        );
        Identity::default()
    }
}
