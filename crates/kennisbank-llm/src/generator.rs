//! External LLM provider completion implementations.
//!
//! One bounded request per answer. The provider is resolved per call so
//! an unconfigured server starts fine and reports the gap as a retryable
//! upstream error. OpenAI and Groq use the same wire format. Anthropic
//! uses a different one.

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::backend::GeneratorBackend;
use crate::config::LLMConfig;
use crate::types::{ChatMessage, LLMProvider};
use kennisbank_core::{Error, Result};

/// Answer generator for the configured provider.
pub struct LlmGenerator {
    client: Client,
    config: LLMConfig,
}

impl LlmGenerator {
    pub fn new(client: Client, config: LLMConfig) -> Self {
        Self { client, config }
    }

    /// Complete against OpenAI-compatible APIs (OpenAI, Groq).
    async fn complete_openai_compat(
        &self,
        url: &str,
        model: &str,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String> {
        let msgs: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        debug!("Completing via {} with model {}", url, model);

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": model,
                "messages": msgs,
                "temperature": self.config.temperature,
                "max_tokens": self.config.max_tokens,
            }))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("API error {}: {}", status, body)));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Completion response unreadable: {}", e)))?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| Error::Upstream("Completion response missing content".into()))
    }

    /// Complete against Anthropic's Messages API.
    async fn complete_anthropic(
        &self,
        model: &str,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String> {
        // Separate system message from conversation
        let system_msg: Option<String> = messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.clone());

        let conv_msgs: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": conv_msgs,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });
        if let Some(sys) = system_msg {
            body["system"] = json!(sys);
        }

        debug!("Completing via Anthropic with model {}", model);

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!("API error {}: {}", status, body)));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("Completion response unreadable: {}", e)))?;

        parsed["content"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| Error::Upstream("Completion response missing content".into()))
    }
}

impl GeneratorBackend for LlmGenerator {
    async fn generate(&self, system_prompt: &str, question: &str) -> Result<String> {
        let (provider, model, api_key) = self
            .config
            .resolve_provider()
            .ok_or_else(|| Error::Upstream("No LLM provider configured".into()))?;

        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(question),
        ];

        match provider {
            LLMProvider::OpenAI => {
                self.complete_openai_compat(
                    "https://api.openai.com/v1/chat/completions",
                    &model,
                    &api_key,
                    &messages,
                )
                .await
            }
            LLMProvider::Groq => {
                self.complete_openai_compat(
                    "https://api.groq.com/openai/v1/chat/completions",
                    &model,
                    &api_key,
                    &messages,
                )
                .await
            }
            LLMProvider::Anthropic => self.complete_anthropic(&model, &api_key, &messages).await,
        }
    }
}
