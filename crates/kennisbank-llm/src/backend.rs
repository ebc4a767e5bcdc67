//! Collaborator traits for the two outbound calls the engine makes.
//!
//! Both are async seams over remote APIs. The engine takes them as
//! generics so tests can drop in deterministic fakes.

use std::future::Future;

use ndarray::Array1;

use kennisbank_core::Result;

/// Turns a query string into an embedding vector.
pub trait EmbedderBackend: Send + Sync {
    /// Embed a single query string.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Array1<f32>>> + Send;

    /// Dimension of the vectors this backend produces.
    fn dimension(&self) -> usize;
}

/// Produces one complete answer for a prompt pair. No streaming; the
/// caller bounds the call with a timeout.
pub trait GeneratorBackend: Send + Sync {
    fn generate(
        &self,
        system_prompt: &str,
        question: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}
