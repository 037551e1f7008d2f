//! Chunk records produced by the structure-aware chunker.
//!
//! Records are built in two phases: the document scan produces internal
//! [`DraftChunk`]s, and [`finalize`] turns the surviving drafts into
//! frozen [`Chunk`]s once the total count is known. Nothing mutates a
//! `Chunk` after it leaves `finalize`.

use serde::{Deserialize, Serialize};

/// An emitted chunk, ready for the downstream extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier derived from the source document name; shared by all
    /// chunks of that document.
    pub id: String,
    /// Rendered payload: breadcrumb context line (when present) followed
    /// by the body. See [`Chunk::body`] for the framing.
    pub text: String,
    /// 0-based position among the chunks emitted for this document,
    /// assigned after dedup filtering.
    pub sequence_index: i64,
    /// True when a single paragraph alone exceeded the budget and was
    /// emitted whole rather than split mid-paragraph.
    #[serde(default)]
    pub oversized: bool,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source document name or path.
    pub source: String,
    /// Final chunk count for the document; known only after the full
    /// scan, so it is filled in during finalization.
    pub total_chunks: usize,
}

impl Chunk {
    /// The body with the `Context:`/`Content:` framing stripped off.
    ///
    /// Text produced by this crate is either
    /// `"Context: <breadcrumb>\n\nContent:\n<body>"` or, when the
    /// breadcrumb was empty, `"Content:\n<body>"`. Anything else (a
    /// legacy plain-text chunk) is returned unchanged.
    pub fn body(&self) -> &str {
        if self.text.starts_with("Context: ") {
            if let Some((_, body)) = self.text.split_once("\n\nContent:\n") {
                return body;
            }
        }
        self.text.strip_prefix("Content:\n").unwrap_or(&self.text)
    }

    /// The breadcrumb embedded in the text, or `""` if there is none.
    pub fn breadcrumb(&self) -> &str {
        self.text
            .strip_prefix("Context: ")
            .and_then(|rest| rest.split_once("\n\nContent:\n"))
            .map(|(crumb, _)| crumb)
            .unwrap_or("")
    }
}

/// A chunk under construction during the document scan. Carries no
/// index or total; those exist only on finalized [`Chunk`]s.
#[derive(Debug, Clone)]
pub(crate) struct DraftChunk {
    pub breadcrumb: String,
    pub body: String,
    pub oversized: bool,
}

impl DraftChunk {
    pub fn render(&self) -> String {
        let mut text = context_prefix(&self.breadcrumb);
        text.push_str(&self.body);
        text
    }
}

/// Rendered framing that precedes a chunk body. The `Content:` marker is
/// always present so [`Chunk::body`] can strip framing uniformly; the
/// `Context:` line is omitted for an empty breadcrumb.
pub(crate) fn context_prefix(breadcrumb: &str) -> String {
    if breadcrumb.is_empty() {
        "Content:\n".to_string()
    } else {
        format!("Context: {}\n\nContent:\n", breadcrumb)
    }
}

/// Assign `sequence_index` 0..k−1 and `total_chunks = k` to the
/// surviving drafts, in scan order. The single point where counts are
/// known; the returned records are frozen.
pub(crate) fn finalize(doc_id: &str, source: &str, drafts: Vec<DraftChunk>) -> Vec<Chunk> {
    let total = drafts.len();
    drafts
        .into_iter()
        .enumerate()
        .map(|(idx, draft)| Chunk {
            id: doc_id.to_string(),
            text: draft.render(),
            sequence_index: idx as i64,
            oversized: draft.oversized,
            metadata: ChunkMetadata {
                source: source.to_string(),
                total_chunks: total,
            },
        })
        .collect()
}
