//! Weeder: reconcile per-type partial node sets into one consistent
//! assignment.
//!
//! With `lo`/`hi` the lowest/highest types that carry a concrete set:
//!
//! ```text
//!  top     ▲
//!   …      │ 2. project up from lo, all the way to the top
//!  hi   ─┐ │
//!   …    │ 1. purify down from hi to lo
//!  lo   ◄┘─┘─┐
//!   …        │ 3. expand down from lo to the bottom
//!  bottom    ▼
//! ```
//!
//! The purified set at `lo` is authoritative: every set above it is its
//! `up` image and every set below it the union of `down` of the level above.

use crate::error::SearchError;
use crate::index::CorpusIndex;
use crate::types::{NodeSet, NodeType};
use std::collections::BTreeMap;

/// Concrete node sets for every type, pairwise consistent under Up/Down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Weeded {
    /// One set per node type, lowest first.
    pub sets: Vec<NodeSet>,
    /// `(lo, hi)` of the explicitly searched types; `None` when no type was
    /// searched, in which case every set is empty.
    pub anchor: Option<(NodeType, NodeType)>,
}

impl Weeded {
    pub fn set(&self, ntype: NodeType) -> &NodeSet {
        &self.sets[ntype.index()]
    }

    pub fn contains(&self, ntype: NodeType, node: u32) -> bool {
        self.sets
            .get(ntype.index())
            .is_some_and(|s| s.contains(&node))
    }

    /// Result counts per type name. Empty when no type was searched, so that
    /// every type reports "absent" rather than zero.
    pub fn statistics(&self, index: &CorpusIndex) -> Statistics {
        let chain = index.chain();
        let mut counts = BTreeMap::new();
        if self.anchor.is_some() {
            for ntype in chain.iter() {
                counts.insert(chain.name(ntype).to_string(), self.set(ntype).len());
            }
        }
        Statistics { counts }
    }
}

/// Per-type result counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    counts: BTreeMap<String, usize>,
}

impl Statistics {
    /// `None` when the type is absent (no search anchored the run).
    pub fn get(&self, ntype: &str) -> Option<usize> {
        self.counts.get(ntype).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Reconcile `sets` (one per node type, lowest first; `None` = unset).
///
/// Fails with [`SearchError::IndexCorruption`] when a node below the top type
/// has no parent while projecting upward.
pub fn weed(index: &CorpusIndex, mut sets: Vec<Option<NodeSet>>) -> Result<Weeded, SearchError> {
    let n = index.chain().len();
    sets.resize(n, None);

    let lo = sets.iter().position(Option::is_some);
    let hi = sets.iter().rposition(Option::is_some);
    let (Some(lo), Some(hi)) = (lo, hi) else {
        tracing::debug!("weed: nothing searched");
        return Ok(Weeded {
            sets: vec![NodeSet::new(); n],
            anchor: None,
        });
    };

    // 1. purify downward from hi to lo
    for i in (lo + 1..=hi).rev() {
        let parents = sets[i].take().unwrap_or_default();
        let children = match sets[i - 1].take() {
            None => expand(index, &parents),
            Some(mut found) => {
                found.retain(|d| index.up(*d).is_some_and(|p| parents.contains(&p)));
                found
            }
        };
        tracing::debug!(level = i - 1, nodes = children.len(), "weed: purified");
        sets[i] = Some(parents);
        sets[i - 1] = Some(children);
    }

    let mut done: Vec<NodeSet> = sets.into_iter().map(Option::unwrap_or_default).collect();

    // 2. project upward from lo, discarding what was there
    for i in lo..n.saturating_sub(1) {
        let mut parents = NodeSet::new();
        for d in &done[i] {
            let p = index.up(*d).ok_or_else(|| {
                SearchError::IndexCorruption(format!(
                    "node {d} of type {} has no parent",
                    index.chain().name(NodeType::new(i))
                ))
            })?;
            parents.insert(p);
        }
        tracing::debug!(level = i + 1, nodes = parents.len(), "weed: projected up");
        done[i + 1] = parents;
    }

    // 3. expand downward from lo to the bottom
    for i in (1..=lo).rev() {
        done[i - 1] = expand(index, &done[i]);
        tracing::debug!(level = i - 1, nodes = done[i - 1].len(), "weed: expanded down");
    }

    Ok(Weeded {
        sets: done,
        anchor: Some((NodeType::new(lo), NodeType::new(hi))),
    })
}

fn expand(index: &CorpusIndex, parents: &NodeSet) -> NodeSet {
    parents.iter().flat_map(|p| index.children(*p)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
