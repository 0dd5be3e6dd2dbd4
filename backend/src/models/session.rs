//! Per-request view of the signed-in user.

use crate::models::profile::SteamProfile;

/// Session key holding the verified [`SteamProfile`].
pub const SESSION_USER_KEY: &str = "user";

/// Session state resolved for the current request. A session without an
/// attached user is anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub user: Option<SteamProfile>,
}

impl CurrentSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: SteamProfile) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// True only when a user is attached and its Steam id equals the
    /// configured admin id.
    pub fn is_admin(&self, admin_steam_id: Option<&str>) -> bool {
        match (&self.user, admin_steam_id) {
            (Some(user), Some(admin)) => !admin.is_empty() && user.id == admin,
            _ => false,
        }
    }
}
