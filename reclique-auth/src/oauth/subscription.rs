//! Subscription eligibility rules.

use chrono::{DateTime, Utc};

use super::UserInfo;

/// Decides whether a member profile grants access to gated content.
#[derive(Debug, Clone)]
pub struct SubscriptionPolicy {
    active_statuses: Vec<String>,
}

impl SubscriptionPolicy {
    /// Policy accepting the given membership statuses, compared case-insensitively.
    pub fn new<I, S>(active_statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            active_statuses: active_statuses
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// True when the member holds a membership in an accepted status that has not lapsed.
    pub fn is_eligible(&self, profile: &UserInfo) -> bool {
        self.is_eligible_at(profile, Utc::now())
    }

    fn is_eligible_at(&self, profile: &UserInfo, now: DateTime<Utc>) -> bool {
        let Some(membership) = &profile.membership else {
            return false;
        };

        let status = membership.status.trim().to_lowercase();
        if !self.active_statuses.contains(&status) {
            return false;
        }

        membership
            .expires_at
            .map_or(true, |expires_at| expires_at > now)
    }
}

impl Default for SubscriptionPolicy {
    fn default() -> Self {
        Self::new(["active"])
    }
}
