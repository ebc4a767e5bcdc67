//! Storage layer: SQLite persistence for documents, chunk embeddings,
//! access-control links, and the chat ledger.

pub mod embedding;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
