use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::{
    config::Config,
    docs, handlers,
    middleware::{log_error_responses, request_id},
    state::AppState,
    utils::cookies::SESSION_COOKIE_NAME,
};

/// Full application: auth redirects, JSON API, and the static front-end as
/// fallback. Sessions live in `store` behind a signed cookie.
pub fn router<Store>(state: AppState, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let sessions = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_path("/")
        .with_http_only(true)
        .with_secure(state.config.cookie_secure)
        .with_same_site(state.config.cookie_same_site.into())
        .with_signed(state.config.session_key());

    let app = Router::new()
        .route("/auth/steam", get(handlers::steam_login))
        .route("/auth/steam/return", get(handlers::steam_return))
        .route("/auth/logout", get(handlers::logout))
        .route("/api/me", get(handlers::me))
        .route(
            "/api/listings",
            get(handlers::list_listings).post(handlers::create_listing),
        )
        .route("/api/listings/{id}", delete(handlers::delete_listing))
        .route("/api/openapi.json", get(docs::openapi_json))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(sessions)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(log_error_responses)),
        );

    let app = match cors_layer(&state.config) {
        Some(cors) => app.layer(cors),
        None => app,
    };
    app.with_state(state)
}

/// Credentialed CORS for the configured origins; `None` keeps the API same-origin.
fn cors_layer(config: &Config) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_is_disabled_without_origins() {
        let config = Config::from_lookup(|_| None).expect("config");
        assert!(cors_layer(&config).is_none());
    }

    #[test]
    fn cors_is_enabled_for_configured_origins() {
        let config = Config::from_lookup(|key| {
            (key == "CORS_ALLOW_ORIGINS").then(|| "https://vault.example".to_string())
        })
        .expect("config");
        assert!(cors_layer(&config).is_some());
    }
}
