use gamevault_backend::{config::Config, db::connection::create_pool};
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_cleanup=info,gamevault_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;

    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;
    store
        .delete_expired()
        .await
        .map_err(|e| anyhow::anyhow!("cleanup expired sessions: {e:?}"))?;
    tracing::info!("Deleted expired sessions");

    sqlx::query("VACUUM (ANALYZE) tower_sessions.session")
        .execute(&pool)
        .await?;

    Ok(())
}
