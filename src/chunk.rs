//! Structure-aware Markdown chunker.
//!
//! Splits a document into chunks that respect the configured character
//! budget while carrying the breadcrumb of ancestor headers valid at
//! each chunk's starting position. Splitting occurs on paragraph
//! boundaries (`\n\n`) to preserve semantic coherence; a single
//! paragraph that alone exceeds the budget is emitted whole and flagged
//! rather than split mid-paragraph.
//!
//! # Algorithm
//!
//! 1. Scan the document line by line, maintaining a [`HeaderStack`].
//! 2. Content lines accumulate into a pending section; a header line
//!    flushes the section under the breadcrumb active before the header
//!    mutates the stack. End of document flushes the remainder.
//! 3. A section over budget is split at paragraph boundaries: whole
//!    paragraphs accumulate into a buffer until the next would exceed
//!    the budget, then the buffer flushes as a chunk. Every sub-chunk
//!    carries the section's breadcrumb.
//! 4. Optionally, chunks whose body is an exact repeat of earlier
//!    content in the same document are dropped (SHA-256 content keys,
//!    scoped to one chunking run).
//! 5. Surviving chunks are finalized: `sequence_index` 0..k−1 in scan
//!    order and `total_chunks = k`.
//!
//! The budget bounds the rendered `text` including the context prefix,
//! so what is sent downstream is what was measured.

use std::collections::HashSet;

use anyhow::Result;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::ChunkingConfig;
use crate::header_stack::{is_header_line, HeaderStack};
use crate::models::{context_prefix, finalize, Chunk, DraftChunk};

/// Chunk a Markdown document into finalized records.
///
/// `source` is the document name or path; the chunk `id` is derived from
/// its file stem and shared by every chunk of the document. Validates
/// the configuration before scanning and returns an error without
/// producing any chunks if the derived budget is invalid.
///
/// An empty document yields an empty vector, not an error.
pub fn chunk_markdown(source: &str, text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;
    let drafts = scan_markdown(text, config);
    let chunks = finalize(&doc_id_from_source(source), source, drafts);
    debug!(source, chunks = chunks.len(), "chunked markdown document");
    Ok(chunks)
}

/// Chunk an unstructured plain-text document: every paragraph is its own
/// implicit top-level section with an empty breadcrumb, still subject to
/// the budget, dedup, and finalization.
pub fn chunk_plain_text(source: &str, text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;
    let drafts = scan_plain_text(text, config);
    let chunks = finalize(&doc_id_from_source(source), source, drafts);
    debug!(source, chunks = chunks.len(), "chunked plain-text document");
    Ok(chunks)
}

/// Document id from the source name: the file stem, or the name itself
/// when there is no extension to strip.
pub(crate) fn doc_id_from_source(source: &str) -> String {
    std::path::Path::new(source)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| source.to_string())
}

/// One forward scan over Markdown text, producing post-dedup drafts in
/// document order. All scan state (header stack, pending section, seen
/// keys) lives here and dies here.
pub(crate) fn scan_markdown(text: &str, config: &ChunkingConfig) -> Vec<DraftChunk> {
    let mut stack = HeaderStack::new();
    let mut section: Vec<&str> = Vec::new();
    let mut emitter = Emitter::new(config);

    for line in text.lines() {
        if is_header_line(line) {
            emitter.flush_section(&stack.render(), &section);
            section.clear();
            stack.observe(line);
        } else {
            section.push(line);
        }
    }
    emitter.flush_section(&stack.render(), &section);

    emitter.into_drafts()
}

pub(crate) fn scan_plain_text(text: &str, config: &ChunkingConfig) -> Vec<DraftChunk> {
    let mut emitter = Emitter::new(config);
    for para in text.split("\n\n") {
        if para.trim().is_empty() {
            continue;
        }
        let lines: Vec<&str> = para.lines().collect();
        emitter.flush_section("", &lines);
    }
    emitter.into_drafts()
}

/// Accumulates drafts for one chunking run, applying the budget fallback
/// and exact-duplicate suppression.
struct Emitter {
    max_chunk_chars: usize,
    deduplicate: bool,
    seen: HashSet<[u8; 32]>,
    drafts: Vec<DraftChunk>,
    suppressed: usize,
}

impl Emitter {
    fn new(config: &ChunkingConfig) -> Self {
        Self {
            max_chunk_chars: config.max_chunk_chars(),
            deduplicate: config.deduplicate,
            seen: HashSet::new(),
            drafts: Vec::new(),
            suppressed: 0,
        }
    }

    /// Emit one section as one or more drafts under `breadcrumb`.
    /// Blank-only sections emit nothing.
    fn flush_section(&mut self, breadcrumb: &str, lines: &[&str]) {
        let body = lines.join("\n");
        let body = body.trim();
        if body.is_empty() {
            return;
        }

        // The budget bounds the rendered text, context prefix included.
        let body_budget = self
            .max_chunk_chars
            .saturating_sub(context_prefix(breadcrumb).len());

        if body.len() <= body_budget {
            self.push(breadcrumb, body, false);
            return;
        }

        // Fallback: split at paragraph boundaries. Whole paragraphs
        // accumulate until the next would exceed the budget; a single
        // paragraph over budget is emitted whole and flagged.
        let mut buffer = String::new();
        for para in body.split("\n\n") {
            let para = para.trim();
            if para.is_empty() {
                continue;
            }

            let would_be = if buffer.is_empty() {
                para.len()
            } else {
                buffer.len() + 2 + para.len()
            };
            if would_be > body_budget && !buffer.is_empty() {
                let flushed = std::mem::take(&mut buffer);
                self.push(breadcrumb, &flushed, false);
            }

            if para.len() > body_budget {
                self.push(breadcrumb, para, true);
            } else {
                if !buffer.is_empty() {
                    buffer.push_str("\n\n");
                }
                buffer.push_str(para);
            }
        }
        if !buffer.is_empty() {
            self.push(breadcrumb, &buffer, false);
        }
    }

    fn push(&mut self, breadcrumb: &str, body: &str, oversized: bool) {
        if self.deduplicate {
            let key: [u8; 32] = Sha256::digest(body.as_bytes()).into();
            if !self.seen.insert(key) {
                self.suppressed += 1;
                return;
            }
        }
        self.drafts.push(DraftChunk {
            breadcrumb: breadcrumb.to_string(),
            body: body.to_string(),
            oversized,
        });
    }

    fn into_drafts(self) -> Vec<DraftChunk> {
        if self.suppressed > 0 {
            debug!(suppressed = self.suppressed, "dropped duplicate chunks");
        }
        self.drafts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChunkingConfig {
        ChunkingConfig::default()
    }

    /// Config with a small, exact character budget and dedup off.
    fn small_budget(max_chars: usize) -> ChunkingConfig {
        ChunkingConfig {
            token_limit: max_chars + 1,
            instruction_tokens: 1,
            chars_per_token: 1.0,
            deduplicate: false,
            min_chunk_chars: 0,
        }
    }

    #[test]
    fn empty_document_produces_no_chunks() {
        let chunks = chunk_markdown("empty.md", "", &config()).unwrap();
        assert!(chunks.is_empty());
        let chunks = chunk_markdown("blank.md", "\n\n  \n", &config()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn invalid_config_fails_before_scanning() {
        let cfg = ChunkingConfig {
            token_limit: 10,
            instruction_tokens: 10,
            ..Default::default()
        };
        assert!(chunk_markdown("doc.md", "# A\n\nbody", &cfg).is_err());
    }

    #[test]
    fn headerless_document_is_single_neutral_chunk() {
        let chunks = chunk_markdown("notes.md", "Just a short note.\nSecond line.", &config())
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].breadcrumb(), "");
        assert_eq!(chunks[0].text, "Content:\nJust a short note.\nSecond line.");
        assert_eq!(chunks[0].metadata.total_chunks, 1);
    }

    #[test]
    fn breadcrumb_follows_header_nesting() {
        let text = "# A\n## B\n### C\nbody\n## D\nbody2";
        let chunks = chunk_markdown("doc.md", text, &config()).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].breadcrumb(), "A > B > C");
        assert_eq!(chunks[0].body(), "body");
        assert_eq!(chunks[1].breadcrumb(), "A > D");
        assert_eq!(chunks[1].body(), "body2");
    }

    #[test]
    fn duplicate_sections_suppressed_when_dedup_on() {
        let text = "# Diabetes\n\nBody text.\n\n# Diabetes\n\nBody text.";
        let chunks = chunk_markdown("diabetes.md", text, &config()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].body(), "Body text.");
        assert_eq!(chunks[0].metadata.total_chunks, 1);
    }

    #[test]
    fn duplicate_sections_retained_when_dedup_off() {
        let cfg = ChunkingConfig {
            deduplicate: false,
            ..Default::default()
        };
        let text = "# Diabetes\n\nBody text.\n\n# Diabetes\n\nBody text.";
        let chunks = chunk_markdown("diabetes.md", text, &cfg).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].body(), chunks[1].body());
        // Indices stay contiguous and totals reflect the retained count.
        assert_eq!(chunks[1].sequence_index, 1);
        assert_eq!(chunks[1].metadata.total_chunks, 2);
    }

    #[test]
    fn dedup_state_does_not_leak_across_documents() {
        let text = "# A\n\nShared boilerplate.";
        let first = chunk_markdown("one.md", text, &config()).unwrap();
        let second = chunk_markdown("two.md", text, &config()).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn oversized_section_splits_at_paragraph_boundaries() {
        // Ten paragraphs of 1000 chars under one header, budget 4096.
        let para = "x".repeat(1000);
        let body = vec![para; 10].join("\n\n");
        let cfg = small_budget(4096);
        let text = format!("# Big\n\n{}", body);
        let chunks = chunk_markdown("big.md", &text, &cfg).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.oversized);
            assert!(chunk.text.len() <= 4096, "chunk over budget: {}", chunk.text.len());
            assert_eq!(chunk.breadcrumb(), "Big");
        }
        // Nothing was lost: rejoining the bodies reconstructs the section.
        let rejoined = chunks
            .iter()
            .map(|c| c.body())
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(rejoined, body);
    }

    #[test]
    fn single_paragraph_over_budget_emitted_whole_and_flagged() {
        let para = "y".repeat(5000);
        let text = format!("# Huge\n\nsmall intro\n\n{}\n\nsmall outro", para);
        let cfg = small_budget(1000);
        let chunks = chunk_markdown("huge.md", &text, &cfg).unwrap();
        let oversized: Vec<_> = chunks.iter().filter(|c| c.oversized).collect();
        assert_eq!(oversized.len(), 1);
        assert_eq!(oversized[0].body(), para);
        for chunk in chunks.iter().filter(|c| !c.oversized) {
            assert!(chunk.text.len() <= 1000);
        }
    }

    #[test]
    fn budget_accounts_for_context_prefix() {
        // Body alone fits in 100 chars, but not once the context line is
        // prepended, so the section must split.
        let text = format!(
            "# A fairly long header title here\n\n{}\n\n{}",
            "a".repeat(40),
            "b".repeat(40)
        );
        let chunks = chunk_markdown("doc.md", &text, &small_budget(100)).unwrap();
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert!(!chunk.oversized);
            assert!(chunk.text.len() <= 100);
        }
    }

    #[test]
    fn sequence_indices_follow_scan_order_after_dedup() {
        let text = "# A\n\nfirst\n\n# B\n\nfirst\n\n# C\n\nsecond";
        let chunks = chunk_markdown("doc.md", text, &config()).unwrap();
        // The repeat of "first" under B is suppressed.
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].body(), "first");
        assert_eq!(chunks[1].body(), "second");
        assert_eq!(chunks[0].sequence_index, 0);
        assert_eq!(chunks[1].sequence_index, 1);
    }

    #[test]
    fn malformed_headers_are_content() {
        let text = "#notaheader\nreal content\n####\nmore";
        let chunks = chunk_markdown("doc.md", text, &config()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].breadcrumb(), "");
        assert!(chunks[0].body().contains("#notaheader"));
        assert!(chunks[0].body().contains("####"));
    }

    #[test]
    fn doc_id_is_source_stem() {
        assert_eq!(doc_id_from_source("data/parsed/guide.md"), "guide");
        assert_eq!(doc_id_from_source("notes.txt"), "notes");
        assert_eq!(doc_id_from_source("bare"), "bare");
    }

    #[test]
    fn plain_text_paragraphs_become_neutral_chunks() {
        let text = "First paragraph here, long enough.\n\nSecond paragraph here.";
        let chunks = chunk_plain_text("notes.txt", text, &config()).unwrap();
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert_eq!(chunk.breadcrumb(), "");
            assert_eq!(chunk.id, "notes");
        }
        assert_eq!(chunks[0].body(), "First paragraph here, long enough.");
    }
}
