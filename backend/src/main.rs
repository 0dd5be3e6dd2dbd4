use std::net::SocketAddr;

use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gamevault_backend::{
    config::Config,
    db::connection::{create_pool, DbPool},
    router::router,
    state::AppState,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamevault_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %mask_database_url(&config.database_url),
        session_secret = %mask_secret(&config.session_secret),
        session_ttl_days = config.session_ttl_days,
        steam_return_url = %config.steam_return_url,
        steam_realm = %config.steam_realm,
        steam_api_key = %config.steam_api_key.as_deref().map(mask_secret).unwrap_or_default(),
        admin_configured = config.admin_steam_id.is_some(),
        static_dir = %config.static_dir,
        "Loaded configuration from environment/.env"
    );
    if config.uses_default_session_secret() {
        tracing::warn!("SESSION_SECRET is not set; using the development secret");
    }
    if config.admin_steam_id.is_none() {
        tracing::warn!("ADMIN_STEAM_ID is not set; listing changes are disabled");
    }

    // Initialize database
    let pool: DbPool = create_pool(&config.database_url, config.database_max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;

    let port = config.port;
    let app = router(AppState::from_pool(pool, config)?, session_store);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Hides the password component of a connection URL.
fn mask_database_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        Ok(parsed) => parsed.to_string(),
        Err(_) => mask_secret(raw),
    }
}
