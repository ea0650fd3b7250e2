use anyhow::Context;
use pawapay_sandbox::{
    config::Config,
    routes::build_router,
    services::{pawapay::PawapayClient, transaction_log::TransactionLog},
    AppState,
};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pawapay_sandbox=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(dir) = config.sqlite_data_dir() {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    // Connect to database
    tracing::info!("Connecting to database...");
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .context("Failed to connect to database")?;

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    let gateway = PawapayClient::new(
        config.pawapay_base_url.clone(),
        config.pawapay_api_token.clone(),
    );
    tracing::info!("Using pawaPay API at {}", config.pawapay_base_url);

    let state = AppState::new(Arc::new(gateway), TransactionLog::new(db));
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    tracing::info!(
        "pawaPay Sandbox Tester running on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;

    Ok(())
}
