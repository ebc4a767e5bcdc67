//! Outbound collaborators: query embedding and answer generation against
//! hosted LLM providers, plus the persisted provider configuration.

pub mod backend;
pub mod config;
pub mod embedder;
pub mod generator;
pub mod types;

pub use backend::{EmbedderBackend, GeneratorBackend};
pub use config::{LLMConfig, EMBEDDING_DIM, EMBEDDING_MODEL};
pub use embedder::OpenAiEmbedder;
pub use generator::LlmGenerator;
pub use types::{ChatMessage, LLMProvider};
