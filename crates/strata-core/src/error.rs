//! Error types for strata-core.

use crate::types::NodeId;
use thiserror::Error;

/// Errors raised while searching, reconciling, or exporting.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The pattern does not compile.
    #[error("\"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The pattern exceeds the configured maximum length; not compiled.
    #[error("pattern must be at most {max} characters long (got {len})")]
    PatternTooLong { len: usize, max: usize },

    /// A fault while scanning a layer: missing data or an offset outside the
    /// layer's position array.
    #[error("layer match failed: {0}")]
    LayerMatchFailure(String),

    /// Up/Down inconsistency found during a run. Signals a build-time defect
    /// and aborts the run.
    #[error("index corruption: {0}")]
    IndexCorruption(String),

    #[error("export failed: {0}")]
    ExportFailure(#[from] std::io::Error),
}

/// A per-layer gather error. Only the named layer is excluded from its
/// type's intersection.
#[derive(Debug, Error)]
#[error("{ntype}/{layer}: {error}")]
pub struct LayerError {
    pub ntype: String,
    pub layer: String,
    #[source]
    pub error: SearchError,
}

/// Errors raised while building the [`CorpusIndex`](crate::index::CorpusIndex).
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("adjacency line {line}: {reason}")]
    BadAdjacency { line: usize, reason: String },

    #[error("node {child} is listed under parents {first} and {second}")]
    DuplicateParent {
        child: NodeId,
        first: NodeId,
        second: NodeId,
    },

    #[error("node {0} lies outside every type interval")]
    NodeOutOfRange(NodeId),

    #[error("node {child} has parent {parent}, which is not of the next type up")]
    WrongParentType { child: NodeId, parent: NodeId },

    #[error("{ntype}/{layer}: text has {text_len} characters but {positions_len} positions")]
    PositionLengthMismatch {
        ntype: String,
        layer: String,
        text_len: usize,
        positions_len: usize,
    },
}

/// Errors raised while validating a loaded [`Config`](crate::config::Config).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no node types configured")]
    NoTypes,

    #[error("node type {0:?} is configured more than once")]
    DuplicateType(String),

    #[error("layer {layer:?} is configured more than once for type {ntype:?}")]
    DuplicateLayer { ntype: String, layer: String },

    #[error("id interval of type {0:?} overlaps or precedes the type below it")]
    IntervalOrder(String),

    #[error("unknown node type {0:?}")]
    UnknownType(String),
}
