//! Database schema SQL: the tables the ingestion and admin services
//! maintain, plus the chat ledger this service owns.

/// Identity and access-control tables. Read-only for this service.
pub const ACCESS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    full_name TEXT,
    role TEXT NOT NULL DEFAULT 'medewerker',
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS user_categories (
    user_id TEXT NOT NULL,
    category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, category_id)
);

CREATE TABLE IF NOT EXISTS document_categories (
    document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    PRIMARY KEY (document_id, category_id)
);

CREATE INDEX IF NOT EXISTS idx_user_categories_user ON user_categories(user_id);
CREATE INDEX IF NOT EXISTS idx_document_categories_category ON document_categories(category_id);
CREATE INDEX IF NOT EXISTS idx_document_categories_document ON document_categories(document_id);
"#;

/// Document corpus and precomputed chunk embeddings. Written by the
/// ingestion service, read here.
pub const CORPUS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    file_type TEXT NOT NULL,
    content_text TEXT NOT NULL DEFAULT '',
    file_url TEXT NOT NULL DEFAULT '',
    file_size INTEGER,
    uploaded_by TEXT,
    upload_date INTEGER NOT NULL,
    expiry_date INTEGER
);

CREATE TABLE IF NOT EXISTS chunk_embeddings (
    document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    chunk_index INTEGER NOT NULL,
    chunk_text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    PRIMARY KEY (document_id, chunk_index)
);

CREATE INDEX IF NOT EXISTS idx_documents_upload_date ON documents(upload_date);
CREATE INDEX IF NOT EXISTS idx_chunk_embeddings_document ON chunk_embeddings(document_id);
"#;

/// Question/answer ledger. The only table this service writes.
pub const LEDGER_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS chat_history (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    confidence_score REAL NOT NULL,
    source_documents TEXT NOT NULL DEFAULT '[]',
    feedback INTEGER,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chat_history_user_created
    ON chat_history(user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_chat_history_confidence
    ON chat_history(confidence_score);
"#;
