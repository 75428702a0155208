use std::sync::Arc;

use morvo_assistant::analysis::{StrategyGenerator, WebsiteAnalyzer};
use morvo_assistant::assistant::Assistant;
use morvo_assistant::chat::{ChatService, RailwayChatClient};
use morvo_assistant::config::AssistantConfig;
use morvo_assistant::routes::app_router;
use morvo_assistant::store::{LibSqlStore, ProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AssistantConfig::from_env()?;
    let api_key = std::env::var("MORVO_API_KEY")
        .ok()
        .map(secrecy::SecretString::from);
    let port: u16 = std::env::var("MORVO_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);
    let db_path =
        std::env::var("MORVO_DB_PATH").unwrap_or_else(|_| "./data/morvo.db".to_string());

    eprintln!("Morvo v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat backend: {}", config.chat_base_url);
    eprintln!("   Chat API: http://0.0.0.0:{port}/api/chat");
    eprintln!("   Onboarding API: http://0.0.0.0:{port}/api/onboarding/status");

    let store: Arc<dyn ProfileStore> = Arc::new(
        LibSqlStore::new_local(std::path::Path::new(&db_path))
            .await
            .unwrap_or_else(|e| {
                eprintln!("Error: Failed to open database at {db_path}: {e}");
                std::process::exit(1);
            }),
    );

    // One backend client serves all three remote ports.
    let backend = Arc::new(RailwayChatClient::new(
        config.chat_base_url.clone(),
        api_key,
        config.request_timeout,
    )?);
    let analyzer: Arc<dyn WebsiteAnalyzer> = backend.clone();
    let strategist: Arc<dyn StrategyGenerator> = backend.clone();
    let chat: Arc<dyn ChatService> = backend;

    let assistant = Arc::new(Assistant::new(
        Arc::clone(&store),
        analyzer,
        strategist,
        chat,
        config,
    ));

    let app = app_router(assistant, store);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "Server started");
    axum::serve(listener, app).await?;
    Ok(())
}
