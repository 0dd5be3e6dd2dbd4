use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use time::OffsetDateTime;
use tower_sessions::{Expiry, Session};

use crate::{
    error::AppError,
    models::{
        profile::{MeResponse, MeUser, SteamProfile},
        session::{CurrentSession, SESSION_USER_KEY},
    },
    state::AppState,
};

/// 302 redirect; `axum::response::Redirect` only offers 303/307/308.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static("/"))]).into_response(),
    }
}

/// Starts the Steam handshake.
pub async fn steam_login(State(state): State<AppState>) -> Response {
    found(&state.identity.authorization_url())
}

/// Completes the Steam handshake. Verification failures fall back to an
/// anonymous redirect home; only session store failures are surfaced.
pub async fn steam_return(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let profile = match state.identity.verify(&params).await {
        Ok(profile) => profile,
        Err(err) => {
            tracing::warn!(error = %err, "Steam authentication failed");
            return Ok(found("/"));
        }
    };

    // Fresh id on every sign-in; the previous record is dropped.
    session.cycle_id().await?;
    session.insert(SESSION_USER_KEY, &profile).await?;
    let expires_at = OffsetDateTime::now_utc() + state.config.session_ttl();
    session.set_expiry(Some(Expiry::AtDateTime(expires_at)));

    tracing::info!(steam_id = %profile.id, expires_at = %expires_at, "Session issued");
    Ok(found("/"))
}

/// Detaches the user from the current session.
pub async fn logout(session: Session) -> Result<Response, AppError> {
    if let Some(user) = session.remove::<SteamProfile>(SESSION_USER_KEY).await? {
        tracing::info!(steam_id = %user.id, "User logged out");
    }
    Ok(found("/"))
}

pub async fn me(current: CurrentSession) -> Json<MeResponse> {
    Json(MeResponse {
        user: current.user.as_ref().map(MeUser::from),
    })
}
