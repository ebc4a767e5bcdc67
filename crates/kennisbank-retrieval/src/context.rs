//! Context assembly: post-filters, deduplicated sources, and the evidence
//! text fed to the generator.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::types::{AskRequest, RankedChunk};
use kennisbank_store::{DocumentMeta, SourceDocument};

/// Separator between evidence blocks in the generator context.
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// The evidence actually used for one answer.
#[derive(Debug, Clone, Default)]
pub struct AssembledContext {
    pub context_text: String,
    /// One entry per distinct document, in first-seen ranked order.
    pub sources: Vec<SourceDocument>,
    /// Similarities of the chunks that made it into the context, for the
    /// confidence scorer.
    pub similarities: Vec<f64>,
}

/// Apply the caller's post-filters and build the bounded context.
///
/// Filters run per parent document: date range on `upload_date`
/// (inclusive bounds), file-type whitelist, and non-expiry at `now`.
/// A chunk whose document fails any filter is dropped even though it
/// cleared the relevance floor. Empty filter lists mean "no restriction".
pub fn assemble(
    ranked: &[RankedChunk],
    documents: &HashMap<String, DocumentMeta>,
    request: &AskRequest,
    now: DateTime<Utc>,
) -> AssembledContext {
    let file_types = request
        .file_type_filters
        .as_deref()
        .filter(|f| !f.is_empty());

    let mut blocks: Vec<String> = Vec::new();
    let mut sources: Vec<SourceDocument> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut similarities: Vec<f64> = Vec::new();

    for chunk in ranked {
        let Some(doc) = documents.get(&chunk.document_id) else {
            continue;
        };
        if let Some(start) = request.date_filter_start {
            if doc.upload_date < start {
                continue;
            }
        }
        if let Some(end) = request.date_filter_end {
            if doc.upload_date > end {
                continue;
            }
        }
        if let Some(types) = file_types {
            if !types.contains(&doc.file_type) {
                continue;
            }
        }
        if let Some(expiry) = doc.expiry_date {
            if expiry <= now {
                continue;
            }
        }

        blocks.push(format!("[Document: {}]\n{}", doc.title, chunk.chunk_text));
        similarities.push(chunk.similarity);
        if seen.insert(chunk.document_id.as_str()) {
            sources.push(SourceDocument {
                document_id: doc.id.clone(),
                document_title: doc.title.clone(),
                document_url: doc.file_url.clone(),
                file_type: doc.file_type.clone(),
            });
        }
    }

    AssembledContext {
        context_text: blocks.join(CONTEXT_DELIMITER),
        sources,
        similarities,
    }
}
