//! # Chunk Harness
//!
//! Structure-aware Markdown chunking for fixed-context-window extraction
//! pipelines.
//!
//! Chunk Harness splits long-form Markdown into bounded-size chunk
//! records for a relation-extraction service, prepending the breadcrumb
//! of ancestor headers to each chunk so it stays semantically
//! self-contained on its own. The budget is derived from the target
//! service's token window, splitting falls back to paragraph boundaries,
//! and exact-duplicate content (repeated boilerplate) can be suppressed.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────────────┐   ┌────────────┐
//! │ Markdown │──▶│  Chunker                      │──▶│ Extraction │
//! │ document │   │ headers → budget → dedup      │   │  service   │
//! └──────────┘   └──────────────────────────────┘   └────────────┘
//!                  one forward scan, finalized
//!                  records frozen on return
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chunk_harness::chunk::chunk_markdown;
//! use chunk_harness::config::ChunkingConfig;
//!
//! let config = ChunkingConfig::default();
//! let chunks = chunk_markdown(
//!     "guide.md",
//!     "# Overview\n\nSome body text worth extracting.",
//!     &config,
//! )?;
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].breadcrumb(), "Overview");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Chunking configuration + budget derivation |
//! | [`models`] | Chunk records and finalization |
//! | [`header_stack`] | Breadcrumb tracking over nested headers |
//! | [`chunk`] | Budget-aware splitter with dedup (the core) |
//! | [`ingest`] | File loading and segment filtering |
//! | [`extract`] | Extraction-service boundary types |

pub mod chunk;
pub mod config;
pub mod extract;
pub mod header_stack;
pub mod ingest;
pub mod models;
