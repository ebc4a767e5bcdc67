//! Kennisbank, a single-binary question answering server over the internal
//! document base.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kennisbank_llm::{LLMConfig, LlmGenerator, OpenAiEmbedder};
use kennisbank_server::routes::build_router;
use kennisbank_server::state::AppState;
use kennisbank_store::SqliteStore;

fn resolve_data_dir() -> PathBuf {
    std::env::var("KENNISBANK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();

    info!("Data directory: {}", data_dir.display());

    // Initialize configuration
    let config = kennisbank_core::KennisbankConfig::from_env(&data_dir)?;
    let port = config.port;

    // Initialize store
    let store = Arc::new(
        SqliteStore::open(&config.data_paths.database)
            .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?,
    );

    // Load LLM configuration. Missing keys do not stop the server; ask
    // requests fail upstream until a provider is configured.
    let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
    match llm_config.active_provider_name() {
        Some(provider) => info!("LLM provider: {}", provider),
        None => warn!(
            "No LLM provider configured; set API keys in {} or via environment",
            config.data_paths.llm_config_file.display()
        ),
    }

    let client = reqwest::Client::new();
    let embedder = OpenAiEmbedder::new(client.clone(), llm_config.embedding_api_key());
    let generator = LlmGenerator::new(client, llm_config.clone());

    // Build application state
    let state = Arc::new(AppState::new(store, llm_config, embedder, generator));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Kennisbank server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
