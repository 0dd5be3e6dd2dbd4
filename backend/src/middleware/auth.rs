use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::{
    error::AppError,
    models::{
        profile::SteamProfile,
        session::{CurrentSession, SESSION_USER_KEY},
    },
    state::AppState,
};

/// Reads the signed-in user out of the request's session. Missing, forged,
/// and expired cookies have already been turned into an empty session by
/// the session layer, so they resolve to anonymous here.
pub async fn load_current_session(session: &Session) -> Result<CurrentSession, AppError> {
    let user = session.get::<SteamProfile>(SESSION_USER_KEY).await?;
    Ok(CurrentSession { user })
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::InternalServerError(anyhow::anyhow!(msg)))?;
        load_current_session(&session).await
    }
}

/// Authenticated user, or `Unauthorized`.
pub fn ensure_authenticated(current: &CurrentSession) -> Result<&SteamProfile, AppError> {
    current
        .user
        .as_ref()
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))
}

/// Admin user, `Unauthorized` when anonymous, `Forbidden` for anyone else.
pub fn ensure_admin<'a>(
    current: &'a CurrentSession,
    admin_steam_id: Option<&str>,
) -> Result<&'a SteamProfile, AppError> {
    let user = ensure_authenticated(current)?;
    if current.is_admin(admin_steam_id) {
        Ok(user)
    } else {
        Err(AppError::Forbidden("Forbidden: not admin".into()))
    }
}

/// Extractor for admin-only handlers. Runs before any body extractor, so
/// authorization failures win over malformed bodies.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SteamProfile);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentSession::from_request_parts(parts, state).await?;
        let user = ensure_admin(&current, state.admin_steam_id())?;
        Ok(AdminSession(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn profile(id: &str) -> SteamProfile {
        SteamProfile::from_steam_id(id, &format!("https://steamcommunity.com/openid/id/{id}"))
    }

    fn empty_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[test]
    fn anonymous_is_unauthorized() {
        let err = ensure_admin(&CurrentSession::anonymous(), Some("1")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn non_admin_is_forbidden() {
        let current = CurrentSession::signed_in(profile("2"));
        let err = ensure_admin(&current, Some("1")).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(ensure_authenticated(&current).is_ok());
    }

    #[test]
    fn unset_admin_id_forbids_everyone() {
        let err = ensure_admin(&CurrentSession::signed_in(profile("1")), None).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn admin_passes() {
        let current = CurrentSession::signed_in(profile("1"));
        let user = ensure_admin(&current, Some("1")).expect("admin");
        assert_eq!(user.id, "1");
    }

    #[tokio::test]
    async fn empty_session_is_anonymous() {
        let current = load_current_session(&empty_session()).await.expect("load");
        assert!(!current.is_authenticated());
    }

    #[tokio::test]
    async fn stored_profile_is_the_current_user() {
        let session = empty_session();
        session
            .insert(SESSION_USER_KEY, profile("7"))
            .await
            .expect("insert");
        let current = load_current_session(&session).await.expect("load");
        assert_eq!(current.user.map(|u| u.id).as_deref(), Some("7"));
    }
}
