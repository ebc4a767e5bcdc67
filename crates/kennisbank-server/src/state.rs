//! Shared application state.

use std::sync::Arc;

use kennisbank_llm::{EmbedderBackend, GeneratorBackend, LLMConfig};
use kennisbank_retrieval::AskEngine;
use kennisbank_store::SqliteStore;

/// Shared application state accessible from all route handlers. Generic
/// over the two outbound collaborators so tests can swap in fakes.
pub struct AppState<E, G> {
    pub store: Arc<SqliteStore>,
    pub llm_config: LLMConfig,
    pub engine: AskEngine<E, G>,
}

impl<E, G> AppState<E, G>
where
    E: EmbedderBackend,
    G: GeneratorBackend,
{
    pub fn new(
        store: Arc<SqliteStore>,
        llm_config: LLMConfig,
        embedder: E,
        generator: G,
    ) -> Self {
        let engine = AskEngine::new(store.clone(), embedder, generator);
        Self {
            store,
            llm_config,
            engine,
        }
    }
}
