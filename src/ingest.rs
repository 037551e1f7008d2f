//! File-loading glue between the filesystem and the chunker.
//!
//! Reads an already-decoded UTF-8 document, dispatches on extension
//! (Markdown vs plain text), and filters out very short segments before
//! finalization so `total_chunks` reflects what survives. Encoding and
//! transport concerns beyond that stay with the caller.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::chunk::{doc_id_from_source, scan_markdown, scan_plain_text};
use crate::config::ChunkingConfig;
use crate::models::{finalize, Chunk};

/// Load a document from disk and segment it into chunk records.
///
/// The document id is derived from the file stem. Files ending in `.md`
/// go through the structure-aware scan; anything else is treated as
/// plain text split on blank lines. Fails fast on invalid configuration
/// or unreadable input.
pub async fn segment_file(path: &Path, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let source = path.display().to_string();
    let chunks = segment_text(&source, &content, config)?;
    info!(
        source = %source,
        chunks = chunks.len(),
        "segmented document for extraction"
    );
    Ok(chunks)
}

/// Segment already-loaded text. Dispatches on the `.md` extension of
/// `source` the same way [`segment_file`] does, and applies the
/// `min_chunk_chars` filter; segments whose body is shorter than the
/// minimum (often parsing artifacts) are dropped before finalization.
pub fn segment_text(source: &str, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let mut drafts = if source.ends_with(".md") {
        scan_markdown(content, config)
    } else {
        scan_plain_text(content, config)
    };

    if config.min_chunk_chars > 0 {
        drafts.retain(|draft| draft.body.len() >= config.min_chunk_chars);
    }

    Ok(finalize(&doc_id_from_source(source), source, drafts))
}
