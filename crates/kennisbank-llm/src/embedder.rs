//! OpenAI embeddings client.
//!
//! Embeddings always go to OpenAI regardless of the generation provider:
//! the stored chunk vectors were produced with `text-embedding-ada-002`
//! and query vectors must come from the same model.

use ndarray::Array1;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::backend::EmbedderBackend;
use crate::config::{EMBEDDING_DIM, EMBEDDING_MODEL};
use kennisbank_core::{Error, Result};

pub struct OpenAiEmbedder {
    client: Client,
    api_key: Option<String>,
    model: String,
    dim: usize,
}

impl OpenAiEmbedder {
    /// The key is optional so the server can start unconfigured; embedding
    /// calls fail as retryable upstream errors until a key is set.
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            model: EMBEDDING_MODEL.into(),
            dim: EMBEDDING_DIM,
        }
    }
}

impl EmbedderBackend for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Array1<f32>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            Error::Upstream("OpenAI API key not configured (required for embeddings)".into())
        })?;

        debug!("Embedding query with model {}", self.model);

        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.model,
                "input": text,
            }))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Embedding API error {}: {}",
                status, body
            )));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Embedding response unreadable: {}", e)))?;

        let values = parsed["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| Error::Upstream("Embedding response missing vector".into()))?;

        Ok(values
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
