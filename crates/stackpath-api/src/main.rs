use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stackpath_api::{app::build_router, config::Config, state::AppState, storage::FsObjectStore};
use stackpath_llm::OpenAIClient;
use stackpath_mcp::ToolRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Stackpath API server");

    // Chat client
    let mut client = OpenAIClient::new(config.openai_api_key.clone())?;
    if let Some(base_url) = &config.llm.base_url {
        client = client.with_base_url(base_url);
    }
    let chat_client: Arc<dyn stackpath_llm::ChatClient> = Arc::new(client);

    // Tool registry: the config file is re-read per request, server
    // connections are cached. Warm them up front so the first turn does
    // not pay the connect cost.
    tracing::info!(path = %config.tools.config_path, "Loading tool registry");
    let tool_registry = Arc::new(ToolRegistry::new(&config.tools.config_path));
    let warm = tool_registry.executor().await;
    tracing::info!(tools = warm.llm_tools().await.len(), "Tool registry ready");

    // Attachment storage
    let object_store = Arc::new(FsObjectStore::new(
        &config.upload.dir,
        &config.upload.public_base_url,
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(
        config,
        chat_client,
        tool_registry,
        object_store,
    ));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
