//! Boundary types for the downstream relation-extraction service.
//!
//! The service itself lives elsewhere; this module fixes the contract:
//! chunk records go in, `(head, relation, tail)` triples come out. It
//! also resolves the legacy plain-text chunk shape exactly once at the
//! boundary, so nothing downstream branches on input shape again.

use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Chunk, ChunkMetadata};

/// Incoming chunk record: either the structured form produced by this
/// crate or a bare string from an older producer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChunkInput {
    Structured(Chunk),
    LegacyText(String),
}

impl ChunkInput {
    /// Normalize to a [`Chunk`]. A legacy string becomes a single-chunk
    /// document with a minted id, since it carries no identity of its
    /// own.
    pub fn resolve(self) -> Chunk {
        match self {
            ChunkInput::Structured(chunk) => chunk,
            ChunkInput::LegacyText(text) => Chunk {
                id: Uuid::new_v4().to_string(),
                text,
                sequence_index: 0,
                oversized: false,
                metadata: ChunkMetadata {
                    source: "legacy".to_string(),
                    total_chunks: 1,
                },
            },
        }
    }
}

/// Whether a triple endpoint names a static entity or a happening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Entity,
    Event,
}

/// Triple taxonomy used by the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripleKind {
    #[serde(rename = "E-E")]
    EntityEntity,
    #[serde(rename = "E-Ev")]
    EntityEvent,
    #[serde(rename = "Ev-Ev")]
    EventEvent,
}

impl TripleKind {
    pub fn head_kind(self) -> NodeKind {
        match self {
            TripleKind::EntityEntity | TripleKind::EntityEvent => NodeKind::Entity,
            TripleKind::EventEvent => NodeKind::Event,
        }
    }

    pub fn tail_kind(self) -> NodeKind {
        match self {
            TripleKind::EntityEntity => NodeKind::Entity,
            TripleKind::EntityEvent | TripleKind::EventEvent => NodeKind::Event,
        }
    }
}

/// A processed `(head, relation, tail)` triple tied back to the chunk it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub kind: TripleKind,
    pub head: String,
    pub relation: String,
    pub tail: String,
    pub head_kind: NodeKind,
    pub tail_kind: NodeKind,
    pub sequence_index: i64,
    pub doc_id: String,
    pub confidence: f64,
}

/// One raw triple as the service emits it. Components may be null or
/// padded; [`collect_triples`] cleans them up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTriple {
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub tail: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Wire shape of one extraction response, grouped by triple kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTripleResponse {
    #[serde(default)]
    pub entity_entity: Vec<RawTriple>,
    #[serde(default)]
    pub entity_event: Vec<RawTriple>,
    #[serde(default)]
    pub event_event: Vec<RawTriple>,
}

/// Convert a raw response into processed triples. Triples with any
/// empty component after trimming are dropped; missing confidence
/// defaults to 1.0.
pub fn collect_triples(raw: &RawTripleResponse, chunk: &Chunk) -> Vec<Triple> {
    let groups = [
        (TripleKind::EntityEntity, &raw.entity_entity),
        (TripleKind::EntityEvent, &raw.entity_event),
        (TripleKind::EventEvent, &raw.event_event),
    ];

    let mut triples = Vec::new();
    for (kind, raws) in groups {
        for raw in raws {
            let head = raw.head.as_deref().unwrap_or("").trim();
            let relation = raw.relation.as_deref().unwrap_or("").trim();
            let tail = raw.tail.as_deref().unwrap_or("").trim();
            if head.is_empty() || relation.is_empty() || tail.is_empty() {
                continue;
            }
            triples.push(Triple {
                kind,
                head: head.to_string(),
                relation: relation.to_string(),
                tail: tail.to_string(),
                head_kind: kind.head_kind(),
                tail_kind: kind.tail_kind(),
                sequence_index: chunk.sequence_index,
                doc_id: chunk.id.clone(),
                confidence: raw.confidence.unwrap_or(1.0),
            });
        }
    }
    triples
}

/// A relation-extraction backend. Implementations wrap whatever service
/// turns one chunk into raw triples; the chunker side never depends on
/// a concrete one.
#[async_trait]
pub trait RelationExtractor: Send + Sync {
    async fn extract(&self, chunk: &Chunk) -> Result<RawTripleResponse>;
}

/// Run every chunk through the extractor in order and aggregate the
/// processed triples plus the set of unique node names. Sequential by
/// design; callers wanting parallelism fan out across documents.
pub async fn extract_all(
    extractor: &dyn RelationExtractor,
    chunks: &[Chunk],
) -> Result<(Vec<Triple>, BTreeSet<String>)> {
    let mut triples = Vec::new();
    for chunk in chunks {
        let raw = extractor.extract(chunk).await?;
        triples.extend(collect_triples(&raw, chunk));
    }

    let mut nodes = BTreeSet::new();
    for triple in &triples {
        nodes.insert(triple.head.clone());
        nodes.insert(triple.tail.clone());
    }
    debug!(
        triples = triples.len(),
        nodes = nodes.len(),
        "extraction pass complete"
    );
    Ok((triples, nodes))
}
