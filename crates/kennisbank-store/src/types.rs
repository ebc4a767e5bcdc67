//! Typed records at the storage boundary.
//!
//! The database keeps JSON-encoded source lists and raw embedding BLOBs;
//! everything crossing into the engine is already decoded into these types.

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Role of an authenticated user. Only `Admin` is special to retrieval:
/// admins see the full corpus without category checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Medewerker,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "medewerker" => Ok(UserRole::Medewerker),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Manager => write!(f, "manager"),
            UserRole::Medewerker => write!(f, "medewerker"),
        }
    }
}

/// A user row from the identity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

/// A document category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A full document row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub file_type: String,
    pub content_text: String,
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    pub upload_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Document metadata projection used when assembling answer context.
/// The full `content_text` body is never loaded on the question path.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub id: String,
    pub title: String,
    pub file_type: String,
    pub file_url: String,
    pub upload_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Fields for inserting a document. `id` and `upload_date` default to a
/// fresh UUID and the current time when absent.
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub id: Option<String>,
    pub title: String,
    pub file_type: String,
    pub content_text: String,
    pub file_url: String,
    pub file_size: Option<i64>,
    pub uploaded_by: Option<String>,
    pub upload_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// One embedded chunk, with its vector already decoded.
#[derive(Debug, Clone)]
pub struct ChunkEmbedding {
    pub document_id: String,
    pub chunk_index: i32,
    pub chunk_text: String,
    pub embedding: Array1<f32>,
}

/// A cited source document, one entry per distinct document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub document_id: String,
    pub document_title: String,
    pub document_url: String,
    pub file_type: String,
}

/// A question/answer ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub confidence_score: f64,
    pub source_documents: Vec<SourceDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Fields for appending a ledger row. `created_at` defaults to now.
#[derive(Debug, Clone)]
pub struct NewChatRecord {
    pub user_id: String,
    pub question: String,
    pub answer: String,
    pub confidence_score: f64,
    pub source_documents: Vec<SourceDocument>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Validated feedback value: thumbs up (+1) or thumbs down (-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackValue {
    Up,
    Down,
}

impl FeedbackValue {
    /// Accepts exactly +1 or -1.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(FeedbackValue::Up),
            -1 => Some(FeedbackValue::Down),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            FeedbackValue::Up => 1,
            FeedbackValue::Down => -1,
        }
    }
}

/// A recurring low-confidence question surfaced on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeGap {
    pub question: String,
    pub count: i64,
    pub avg_confidence: f64,
    pub last_asked: DateTime<Utc>,
}

/// Admin dashboard aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_documents: i64,
    pub embedded_chunks: i64,
    pub active_users: i64,
    pub questions_this_month: i64,
    pub storage_used_mb: f64,
    pub feedback_up: i64,
    pub feedback_down: i64,
    pub knowledge_gaps: Vec<KnowledgeGap>,
}
