//! The ask flow: resolve access, fetch and rank evidence, assemble the
//! context, call the generator, score confidence, and record the
//! interaction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::spawn_blocking;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::access::{resolve_scope, AccessScope};
use crate::confidence::score;
use crate::context::assemble;
use crate::ranker::rank;
use crate::types::{AnswerPayload, AskOutcome, AskRequest, Identity};
use kennisbank_core::{Error, Result};
use kennisbank_llm::{EmbedderBackend, GeneratorBackend};
use kennisbank_store::{ChatRecord, DocumentMeta, FeedbackValue, NewChatRecord, SqliteStore};

/// Upper bound on one generator call.
pub const GENERATOR_TIMEOUT: Duration = Duration::from_secs(60);

/// History reaches back this many days.
pub const HISTORY_WINDOW_DAYS: i64 = 30;

/// Default number of history entries returned.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// The retrieval and answer-synthesis engine. Holds no per-request state;
/// collaborators are injected so tests can swap in deterministic fakes.
pub struct AskEngine<E, G> {
    store: Arc<SqliteStore>,
    embedder: E,
    generator: G,
    generator_timeout: Duration,
}

impl<E, G> AskEngine<E, G>
where
    E: EmbedderBackend,
    G: GeneratorBackend,
{
    pub fn new(store: Arc<SqliteStore>, embedder: E, generator: G) -> Self {
        Self {
            store,
            embedder,
            generator,
            generator_timeout: GENERATOR_TIMEOUT,
        }
    }

    pub fn with_generator_timeout(mut self, generator_timeout: Duration) -> Self {
        self.generator_timeout = generator_timeout;
        self
    }

    /// Answer one question within the caller's access scope.
    ///
    /// Empty-retrieval outcomes come back as `Ok` payloads with
    /// confidence 0; only upstream and storage faults are errors. A ledger
    /// row is written for generated answers only, and a failed write never
    /// fails the answer.
    pub async fn ask(&self, identity: &Identity, request: AskRequest) -> Result<AnswerPayload> {
        let scope = {
            let store = self.store.clone();
            let user_id = identity.id.clone();
            let role = identity.role;
            let category_filters = request.category_filters.clone();
            spawn_blocking(move || {
                resolve_scope(&store, &user_id, role, category_filters.as_deref())
            })
            .await
            .map_err(|e| Error::Internal(e.to_string()))??
        };

        let document_ids = match scope {
            AccessScope::NoCategories => {
                return Ok(AnswerPayload::empty(AskOutcome::NoCategories));
            }
            AccessScope::Documents(ids) if ids.is_empty() => {
                return Ok(AnswerPayload::empty(AskOutcome::NoDocuments));
            }
            AccessScope::Documents(ids) => ids,
        };

        // The embedding call and the two store reads only depend on the
        // resolved id set, so they run concurrently.
        let chunks_task = {
            let store = self.store.clone();
            let ids = document_ids.clone();
            spawn_blocking(move || store.chunk_embeddings_for(&ids))
        };
        let documents_task = {
            let store = self.store.clone();
            let ids = document_ids.clone();
            spawn_blocking(move || store.documents_meta_by_ids(&ids))
        };
        let (question_vector, chunks, documents) = tokio::join!(
            self.embedder.embed(&request.question),
            chunks_task,
            documents_task,
        );
        let question_vector = question_vector?;
        let chunks = chunks.map_err(|e| Error::Internal(e.to_string()))??;
        let documents = documents.map_err(|e| Error::Internal(e.to_string()))??;

        if chunks.is_empty() {
            return Ok(AnswerPayload::empty(AskOutcome::NotIndexed));
        }

        let ranked = rank(&question_vector, &chunks);
        debug!(
            "Ranked {} of {} chunks above the relevance floor",
            ranked.len(),
            chunks.len()
        );
        if ranked.is_empty() {
            return Ok(AnswerPayload::empty(AskOutcome::NoRelevantDocuments));
        }

        let documents: HashMap<String, DocumentMeta> =
            documents.into_iter().map(|d| (d.id.clone(), d)).collect();
        let assembled = assemble(&ranked, &documents, &request, Utc::now());
        if assembled.sources.is_empty() {
            return Ok(AnswerPayload::empty(AskOutcome::FilteredOut));
        }

        let system_prompt = build_system_prompt(&assembled.context_text);
        let answer = timeout(
            self.generator_timeout,
            self.generator.generate(&system_prompt, &request.question),
        )
        .await
        .map_err(|_| Error::Upstream("Answer generation timed out".into()))??;

        let confidence = score(&assembled.similarities, &answer);

        let record_id = match self.store.insert_chat_record(&NewChatRecord {
            user_id: identity.id.clone(),
            question: request.question.clone(),
            answer: answer.clone(),
            confidence_score: confidence,
            source_documents: assembled.sources.clone(),
            created_at: None,
        }) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Failed to record chat interaction: {}", e);
                None
            }
        };

        Ok(AnswerPayload {
            answer,
            confidence,
            sources: assembled.sources,
            outcome: AskOutcome::Answered,
            record_id,
        })
    }

    /// Dimension of the query vectors the configured embedder produces.
    pub fn embedding_dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// The caller's recent interactions, newest first.
    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatRecord>> {
        let since = Utc::now() - chrono::Duration::days(HISTORY_WINDOW_DAYS);
        self.store.chat_history(user_id, since, limit)
    }

    /// Attach feedback to an owned record. Last write wins.
    pub fn submit_feedback(
        &self,
        user_id: &str,
        record_id: &str,
        value: FeedbackValue,
    ) -> Result<()> {
        let record = self
            .store
            .get_chat_record(record_id)?
            .ok_or_else(|| Error::NotFound("Chat record not found".into()))?;
        if record.user_id != user_id {
            return Err(Error::Forbidden(
                "Chat record belongs to another user".into(),
            ));
        }
        self.store.set_feedback(record_id, value)?;
        Ok(())
    }

    /// Remove all of the caller's records. Returns the number removed.
    pub fn clear_history(&self, user_id: &str) -> Result<usize> {
        self.store.clear_chat_history(user_id)
    }
}

/// Fixed instruction block plus the assembled evidence.
pub fn build_system_prompt(context: &str) -> String {
    format!(
        "Je bent een behulpzame AI-assistent voor de interne kennisbank. \
         Gebruik ALLEEN de verstrekte context om vragen te beantwoorden.\n\n\
         BELANGRIJKE REGELS:\n\
         - Als het antwoord niet in de context staat, zeg dan: \
         \"Deze informatie staat niet in mijn kennisbank.\"\n\
         - Citeer indien mogelijk de bron\n\
         - Wees specifiek en concreet\n\
         - Gebruik een vriendelijke, professionele toon\n\
         - Antwoord in het Nederlands tenzij anders gevraagd\n\
         - Beantwoord de vraag ALLEEN op basis van de gegeven context\n\
         - Wees beknopt maar volledig\n\n\
         Context uit bedrijfsdocumenten:\n{}",
        context
    )
}
