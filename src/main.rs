use anyhow::{Context, Result};
use locale_relay::config::Config;
use locale_relay::provider::OpenAiProvider;
use locale_relay::server::{self, AppState};
use locale_relay::store::PgStore;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_relay=info".parse()?)
        )
        .init();

    info!("Starting translation server");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        "Canonical locales: {}",
        config
            .locales
            .locales()
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Step 1: Connect to the document store
    let store = PgStore::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    // Step 2: Build the provider client
    let provider = OpenAiProvider::new(&config).context("Failed to build provider client")?;
    info!("Using model {}", config.openai_model);

    // Step 3: Serve
    let state = AppState::new(Arc::new(store), Arc::new(provider), config.locales.clone());
    let app = server::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
