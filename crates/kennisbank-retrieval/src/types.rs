//! Request, outcome, and response types for the ask flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kennisbank_store::{SourceDocument, UserRole};

/// Validated caller identity, supplied by the gateway.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub role: UserRole,
}

/// An incoming question with optional refinement filters. Absent filters
/// mean "no restriction beyond access control".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub category_filters: Option<Vec<String>>,
    #[serde(default)]
    pub date_filter_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_filter_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_type_filters: Option<Vec<String>>,
}

/// How the ask flow concluded. Everything except `Answered` is an empty
/// result carried as data, with a fixed Dutch answer and confidence 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AskOutcome {
    /// Evidence was found and the generator produced an answer.
    Answered,
    /// Non-admin caller with no category assignments.
    NoCategories,
    /// The caller's categories link to no documents (or, for admins, the
    /// corpus is empty).
    NoDocuments,
    /// Accessible documents exist but none have embedded chunks yet.
    NotIndexed,
    /// No chunk cleared the relevance floor.
    NoRelevantDocuments,
    /// Relevant chunks existed but every one was dropped by the caller's
    /// date, file-type, or expiry filtering.
    FilteredOut,
}

impl AskOutcome {
    /// The fixed user-facing answer for empty outcomes; `None` for
    /// `Answered`.
    pub fn canned_answer(self) -> Option<&'static str> {
        match self {
            AskOutcome::Answered => None,
            AskOutcome::NoCategories => {
                Some("Je hebt nog geen toegang tot documentcategorieën.")
            }
            AskOutcome::NoDocuments => Some("Er zijn nog geen documenten beschikbaar."),
            AskOutcome::NotIndexed => Some("Er zijn nog geen documenten geïndexeerd."),
            AskOutcome::NoRelevantDocuments => {
                Some("Ik kan geen relevant antwoord vinden in de beschikbare documenten.")
            }
            AskOutcome::FilteredOut => {
                Some("Geen documenten voldoen aan de gekozen filters.")
            }
        }
    }
}

/// The final answer envelope returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPayload {
    pub answer: String,
    pub confidence: f64,
    pub sources: Vec<SourceDocument>,
    pub outcome: AskOutcome,
    /// Ledger row id; absent for empty outcomes and when the ledger write
    /// failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl AnswerPayload {
    /// A canned response for one of the empty outcomes.
    pub fn empty(outcome: AskOutcome) -> Self {
        Self {
            answer: outcome.canned_answer().unwrap_or_default().to_string(),
            confidence: 0.0,
            sources: Vec::new(),
            outcome,
            record_id: None,
        }
    }
}

/// A chunk that cleared the relevance floor, with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedChunk {
    pub document_id: String,
    pub chunk_text: String,
    pub similarity: f64,
}
