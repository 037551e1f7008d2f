use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

/// Knobs controlling the structure-aware chunker.
///
/// The character budget is never stored; it is derived from the three
/// token-level values via [`ChunkingConfig::max_chunk_chars`] so that
/// changing any input changes the budget.
#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Context window of the downstream extraction service, in tokens.
    #[serde(default = "default_token_limit")]
    pub token_limit: usize,
    /// Tokens reserved for the extraction instructions/prompt.
    #[serde(default = "default_instruction_tokens")]
    pub instruction_tokens: usize,
    /// Average characters per token for the target tokenizer.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f64,
    /// Suppress chunks whose body exactly repeats earlier content.
    #[serde(default = "default_deduplicate")]
    pub deduplicate: bool,
    /// Minimum body length for file-loaded segments; 0 disables the
    /// filter. Applies only in [`crate::ingest`], not to the core API.
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
}

fn default_token_limit() -> usize {
    4096
}
fn default_instruction_tokens() -> usize {
    200
}
fn default_chars_per_token() -> f64 {
    3.5
}
fn default_deduplicate() -> bool {
    true
}
fn default_min_chunk_chars() -> usize {
    50
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            token_limit: default_token_limit(),
            instruction_tokens: default_instruction_tokens(),
            chars_per_token: default_chars_per_token(),
            deduplicate: default_deduplicate(),
            min_chunk_chars: default_min_chunk_chars(),
        }
    }
}

impl ChunkingConfig {
    /// Maximum characters per emitted chunk:
    /// `(token_limit − instruction_tokens) × chars_per_token`.
    pub fn max_chunk_chars(&self) -> usize {
        let available = self.token_limit.saturating_sub(self.instruction_tokens);
        (available as f64 * self.chars_per_token) as usize
    }

    /// Rejects configurations that would produce a non-positive budget.
    /// Called before any scanning begins; the chunker never attempts to
    /// emit zero-length chunks.
    pub fn validate(&self) -> Result<()> {
        if self.token_limit == 0 {
            anyhow::bail!("chunking.token_limit must be > 0");
        }
        if self.instruction_tokens >= self.token_limit {
            anyhow::bail!(
                "chunking.instruction_tokens ({}) must be < token_limit ({})",
                self.instruction_tokens,
                self.token_limit
            );
        }
        if !self.chars_per_token.is_finite() || self.chars_per_token <= 0.0 {
            anyhow::bail!("chunking.chars_per_token must be a positive number");
        }
        if self.max_chunk_chars() == 0 {
            anyhow::bail!("derived chunk budget is 0 chars; raise token_limit or chars_per_token");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.chunking.validate()?;

    Ok(config)
}
