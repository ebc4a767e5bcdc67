//! SQLite adapter for the shared knowledge-base database.
//!
//! The ingestion and admin services own most tables; this service reads
//! identity links, document metadata, and chunk embeddings, and owns only
//! the `chat_history` ledger. Vector decoding happens here so callers only
//! ever see typed records with `Array1<f32>` embeddings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::Array1;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::embedding::{decode_embedding, encode_embedding};
use crate::schema::{ACCESS_SCHEMA_SQL, CORPUS_SCHEMA_SQL, LEDGER_SCHEMA_SQL};
use crate::types::*;
use kennisbank_core::{Error, Result};

/// SQLite store behind a single pooled connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the SQLite store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be
    /// `db_dir/kennisbank.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Database(e.to_string()))?;
        let db_path = db_dir.join("kennisbank.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let doc_count = store.count_documents()?;
        let chunk_count = store.count_chunk_embeddings()?;
        info!(
            "SqliteStore initialized: {} documents, {} embedded chunks, path={}",
            doc_count,
            chunk_count,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA cache_size = -65536;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        let full_schema = format!(
            "{}\n{}\n{}",
            CORPUS_SCHEMA_SQL, ACCESS_SCHEMA_SQL, LEDGER_SCHEMA_SQL
        );
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Identity & access-control reads
    // ---------------------------------------------------------------

    /// Insert or replace a user. Used by the identity service and tests.
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT OR REPLACE INTO users (id, email, full_name, role, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            user.id,
            user.email,
            user.full_name,
            user.role.to_string(),
            user.is_active as i64,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    pub fn count_active_users(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached("SELECT COUNT(*) FROM users WHERE is_active = 1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row([], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()));
        count
    }

    /// Create a category. Returns the new category ID.
    pub fn add_category(&self, name: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.conn.lock();
        conn.prepare_cached("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![id, name])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(id)
    }

    pub fn assign_user_category(&self, user_id: &str, category_id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT OR IGNORE INTO user_categories (user_id, category_id) VALUES (?1, ?2)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![user_id, category_id])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    pub fn link_document_category(&self, document_id: &str, category_id: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT OR IGNORE INTO document_categories (document_id, category_id) VALUES (?1, ?2)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![document_id, category_id])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Category ids the user is linked to.
    pub fn user_category_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT category_id FROM user_categories WHERE user_id = ?1 ORDER BY category_id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![user_id], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Distinct document ids linked to any of the given categories.
    pub fn document_ids_for_categories(&self, category_ids: &[String]) -> Result<Vec<String>> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; category_ids.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT document_id FROM document_categories
             WHERE category_id IN ({}) ORDER BY document_id",
            placeholders
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql).map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(category_ids.iter()), |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Every document id in the corpus (the admin view).
    pub fn all_document_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT id FROM documents ORDER BY id")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------

    /// Insert a document. Returns the document ID.
    pub fn add_document(&self, doc: &NewDocument) -> Result<String> {
        let id = doc
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let upload_date = doc
            .upload_date
            .unwrap_or_else(Utc::now)
            .timestamp_millis();
        let expiry_date = doc.expiry_date.map(|d| d.timestamp_millis());

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO documents
                 (id, title, file_type, content_text, file_url, file_size,
                  uploaded_by, upload_date, expiry_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            id,
            doc.title,
            doc.file_type,
            doc.content_text,
            doc.file_url,
            doc.file_size,
            doc.uploaded_by,
            upload_date,
            expiry_date,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(id)
    }

    /// Get a document by ID.
    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM documents WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_document(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// Metadata projections for the given document ids, in id order.
    pub fn documents_meta_by_ids(&self, ids: &[String]) -> Result<Vec<DocumentMeta>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, title, file_type, file_url, upload_date, expiry_date
             FROM documents WHERE id IN ({}) ORDER BY id",
            placeholders
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql).map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(ids.iter()), |row| {
                Ok(Self::row_to_document_meta(row))
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn count_documents(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached("SELECT COUNT(*) FROM documents")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row([], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()));
        count
    }

    /// Total stored document size in megabytes, rounded to two decimals.
    pub fn storage_used_mb(&self) -> Result<f64> {
        let conn = self.conn.lock();
        let bytes: i64 = conn
            .prepare_cached("SELECT COALESCE(SUM(file_size), 0) FROM documents")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row([], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok((bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0)
    }

    // ---------------------------------------------------------------
    // Chunk embeddings
    // ---------------------------------------------------------------

    /// Store one chunk's text and vector. Embeddings are written once at
    /// ingestion and never updated.
    pub fn add_chunk_embedding(
        &self,
        document_id: &str,
        chunk_index: i32,
        chunk_text: &str,
        embedding: &Array1<f32>,
    ) -> Result<()> {
        let bytes = encode_embedding(embedding);
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO chunk_embeddings (document_id, chunk_index, chunk_text, embedding)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![document_id, chunk_index, chunk_text, bytes])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Fetch all embedded chunks for the given document ids, decoded, in
    /// (document_id, chunk_index) order. This scoping is the access-control
    /// boundary: chunks of documents outside the set are never returned.
    pub fn chunk_embeddings_for(&self, document_ids: &[String]) -> Result<Vec<ChunkEmbedding>> {
        if document_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; document_ids.len()].join(", ");
        let sql = format!(
            "SELECT document_id, chunk_index, chunk_text, embedding
             FROM chunk_embeddings WHERE document_id IN ({})
             ORDER BY document_id, chunk_index",
            placeholders
        );
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql).map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(document_ids.iter()), |row| {
                let bytes: Vec<u8> = row.get("embedding")?;
                Ok(ChunkEmbedding {
                    document_id: row.get("document_id")?,
                    chunk_index: row.get("chunk_index")?,
                    chunk_text: row.get("chunk_text")?,
                    embedding: decode_embedding(&bytes),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn count_chunk_embeddings(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached("SELECT COUNT(*) FROM chunk_embeddings")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row([], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()));
        count
    }

    // ---------------------------------------------------------------
    // Interaction ledger
    // ---------------------------------------------------------------

    /// Append a ledger row. Returns the new record ID.
    pub fn insert_chat_record(&self, record: &NewChatRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let created_at = record
            .created_at
            .unwrap_or_else(Utc::now)
            .timestamp_millis();
        let sources_json = serde_json::to_string(&record.source_documents)?;

        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO chat_history
                 (id, user_id, question, answer, confidence_score,
                  source_documents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            id,
            record.user_id,
            record.question,
            record.answer,
            record.confidence_score,
            sources_json,
            created_at,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(id)
    }

    pub fn get_chat_record(&self, id: &str) -> Result<Option<ChatRecord>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM chat_history WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_chat_record(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// A user's records created at or after `since`, newest first.
    pub fn chat_history(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ChatRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM chat_history
                 WHERE user_id = ?1 AND created_at >= ?2
                 ORDER BY created_at DESC LIMIT ?3",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![user_id, since.timestamp_millis(), limit as i64],
                |row| Ok(Self::row_to_chat_record(row)),
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Overwrite the feedback field. Last write wins. Returns whether a
    /// row was updated.
    pub fn set_feedback(&self, record_id: &str, value: FeedbackValue) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached("UPDATE chat_history SET feedback = ?1 WHERE id = ?2")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![value.as_i32(), record_id])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Delete every record for the user. Returns the number removed.
    pub fn clear_chat_history(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let removed = conn
            .prepare_cached("DELETE FROM chat_history WHERE user_id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![user_id])
            .map_err(|e| Error::Database(e.to_string()));
        removed
    }

    pub fn count_questions_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .prepare_cached("SELECT COUNT(*) FROM chat_history WHERE created_at >= ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![since.timestamp_millis()], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()));
        count
    }

    /// (thumbs up, thumbs down) totals across all users.
    pub fn feedback_counts(&self) -> Result<(i64, i64)> {
        let conn = self.conn.lock();
        let counts = conn
            .prepare_cached(
                "SELECT COALESCE(SUM(CASE WHEN feedback = 1 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN feedback = -1 THEN 1 ELSE 0 END), 0)
                 FROM chat_history",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| Error::Database(e.to_string()));
        counts
    }

    /// Recurring low-confidence questions: scan the most recent
    /// `scan_limit` records under `max_confidence`, group by question text,
    /// return the `top` most frequent.
    pub fn knowledge_gaps(
        &self,
        max_confidence: f64,
        scan_limit: usize,
        top: usize,
    ) -> Result<Vec<KnowledgeGap>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT question, COUNT(*) AS cnt, AVG(confidence_score) AS avg_conf,
                        MAX(created_at) AS last_asked
                 FROM (
                     SELECT question, confidence_score, created_at
                     FROM chat_history
                     WHERE confidence_score < ?1
                     ORDER BY created_at DESC
                     LIMIT ?2
                 )
                 GROUP BY question
                 ORDER BY cnt DESC, last_asked DESC
                 LIMIT ?3",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![max_confidence, scan_limit as i64, top as i64],
                |row| {
                    let avg: f64 = row.get("avg_conf")?;
                    let last: i64 = row.get("last_asked")?;
                    Ok(KnowledgeGap {
                        question: row.get("question")?,
                        count: row.get("cnt")?,
                        avg_confidence: (avg * 10.0).round() / 10.0,
                        last_asked: millis_to_datetime(last),
                    })
                },
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Admin dashboard aggregates. `month_start` bounds the
    /// questions-this-month counter.
    pub fn dashboard_stats(&self, month_start: DateTime<Utc>) -> Result<DashboardStats> {
        let (feedback_up, feedback_down) = self.feedback_counts()?;
        Ok(DashboardStats {
            total_documents: self.count_documents()?,
            embedded_chunks: self.count_chunk_embeddings()?,
            active_users: self.count_active_users()?,
            questions_this_month: self.count_questions_since(month_start)?,
            storage_used_mb: self.storage_used_mb()?,
            feedback_up,
            feedback_down,
            knowledge_gaps: self.knowledge_gaps(50.0, 100, 10)?,
        })
    }

    // ---------------------------------------------------------------
    // Row mappers
    // ---------------------------------------------------------------

    fn row_to_document(row: &rusqlite::Row<'_>) -> Document {
        Document {
            id: row.get("id").unwrap_or_default(),
            title: row.get("title").unwrap_or_default(),
            file_type: row.get("file_type").unwrap_or_default(),
            content_text: row.get("content_text").unwrap_or_default(),
            file_url: row.get("file_url").unwrap_or_default(),
            file_size: row.get("file_size").ok().flatten(),
            uploaded_by: row.get("uploaded_by").ok().flatten(),
            upload_date: millis_to_datetime(row.get("upload_date").unwrap_or(0)),
            expiry_date: row
                .get::<_, Option<i64>>("expiry_date")
                .ok()
                .flatten()
                .map(millis_to_datetime),
        }
    }

    fn row_to_document_meta(row: &rusqlite::Row<'_>) -> DocumentMeta {
        DocumentMeta {
            id: row.get("id").unwrap_or_default(),
            title: row.get("title").unwrap_or_default(),
            file_type: row.get("file_type").unwrap_or_default(),
            file_url: row.get("file_url").unwrap_or_default(),
            upload_date: millis_to_datetime(row.get("upload_date").unwrap_or(0)),
            expiry_date: row
                .get::<_, Option<i64>>("expiry_date")
                .ok()
                .flatten()
                .map(millis_to_datetime),
        }
    }

    fn row_to_chat_record(row: &rusqlite::Row<'_>) -> ChatRecord {
        ChatRecord {
            id: row.get("id").unwrap_or_default(),
            user_id: row.get("user_id").unwrap_or_default(),
            question: row.get("question").unwrap_or_default(),
            answer: row.get("answer").unwrap_or_default(),
            confidence_score: row.get("confidence_score").unwrap_or(0.0),
            source_documents: row
                .get::<_, String>("source_documents")
                .ok()
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
            feedback: row.get("feedback").ok().flatten(),
            created_at: millis_to_datetime(row.get("created_at").unwrap_or(0)),
        }
    }
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
