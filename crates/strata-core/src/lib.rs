//! strata-core: layered search over annotated, hierarchically structured
//! text corpora.
//!
//! This crate exposes each engine phase as a public module, plus the shared
//! types used across all of them.
//!
//! # Architecture
//!
//! ```text
//! CorpusIndex (built once, immutable)
//!      │
//!      ▼
//! Gather ──► Weed ──► Compose ──► Render
//!                        │
//!                        └──────► Export
//! ```
//!
//! [`session::Session`] runs gather → weed → compose for one query and owns
//! nothing mutable between runs; the caller keeps the [`query::Query`] and
//! the [`session::ViewState`].

pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod gather;
pub mod index;
pub mod matcher;
pub mod query;
pub mod render;
pub mod session;
pub mod types;
pub mod weed;

pub use error::{ConfigError, CorpusError, LayerError, SearchError};
pub use index::CorpusIndex;
pub use query::{LayerQuery, MatchFlags, Query};
pub use session::{RunOutcome, RunStatus, Session, ViewState};
pub use types::{CorpusData, LayerDef, NodeId, NodeSet, NodeType, TypeChain, TypeInfo};
