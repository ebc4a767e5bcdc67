//! Retrieval and answer synthesis over an access-controlled document
//! corpus: who may read what, which chunks count as evidence, how the
//! generator context is built, and how confident the answer is.

pub mod access;
pub mod confidence;
pub mod context;
pub mod engine;
pub mod ranker;
pub mod types;

pub use engine::{AskEngine, DEFAULT_HISTORY_LIMIT, GENERATOR_TIMEOUT, HISTORY_WINDOW_DAYS};
pub use types::{AnswerPayload, AskOutcome, AskRequest, Identity, RankedChunk};
