//! strata-corpus: corpus data providers for strata.
//!
//! Each source reads raw corpus data (adjacency lines, layer texts, position
//! arrays) and hands it over as [`strata_core::CorpusData`] for
//! [`strata_core::CorpusIndex::build`].
//!
//! The document format is one JSON object:
//!
//! ```text
//! {
//!   "up":        ["1-4\t10", "10-11\t100"],
//!   "texts":     { "word": { "text": "the cat sat down" } },
//!   "positions": { "word": { "text": [1, 1, 1, 1, 2, …] } }
//! }
//! ```
//!
//! optionally wrapped in a JavaScript assignment (`const corpusData = {…};`)
//! as written by the corpus build tooling.

pub mod file;

pub use file::FileSource;

use strata_core::CorpusData;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed corpus data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Trait implemented by each corpus data source.
pub trait CorpusSource {
    /// Short human-readable description, for logs.
    fn describe(&self) -> String;

    fn load(&self) -> Result<CorpusData, LoadError>;
}

/// Corpus data held in memory, e.g. embedded in a binary or built by tests.
#[derive(Debug, Clone)]
pub struct InlineSource {
    text: String,
}

impl InlineSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CorpusSource for InlineSource {
    fn describe(&self) -> String {
        format!("inline ({} bytes)", self.text.len())
    }

    fn load(&self) -> Result<CorpusData, LoadError> {
        parse(&self.text)
    }
}

/// Parse a corpus document, with or without an assignment prefix.
pub fn parse(text: &str) -> Result<CorpusData, LoadError> {
    let data: CorpusData = serde_json::from_str(strip_assignment(text))?;
    tracing::debug!(
        up = data.up.len(),
        types = data.texts.len(),
        "corpus data parsed"
    );
    Ok(data)
}

/// Strip a leading `const name =` (or `var`/`let`) and a trailing `;`.
pub fn strip_assignment(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find(['{', '[']) else {
        return text;
    };
    let prefix = text[..open].trim_end();
    if prefix.is_empty() || !prefix.ends_with('=') {
        return text;
    }
    let body = text[open..].trim_end();
    body.strip_suffix(';').unwrap_or(body).trim_end()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
