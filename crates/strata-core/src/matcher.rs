//! LayerMatcher: one pattern against one layer's character stream.
//!
//! [`LayerMatcher::search`] finds every match with the offsets of each
//! capture group; [`project`] maps matched offsets to the nodes owning them.
//! All offsets are character offsets into the layer text.

use crate::error::SearchError;
use crate::index::{LayerText, PositionMap};
use crate::query::MatchFlags;
use crate::types::{NodeId, NodeSet};
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

/// Owned offset → group label, for one node.
pub type OffsetLabels = BTreeMap<usize, usize>;

/// Node → its matched offsets and their group labels, for one layer.
pub type NodeLabels = HashMap<NodeId, OffsetLabels>;

/// One match: the whole match and each capture group (`None` when the group
/// did not participate). `groups[0]` is the whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMatch {
    pub groups: Vec<Option<Range<usize>>>,
}

impl LayerMatch {
    pub fn whole(&self) -> Range<usize> {
        self.groups.first().cloned().flatten().unwrap_or(0..0)
    }

    /// Label of an offset inside the whole match: the lowest-numbered capture
    /// group covering it, else 0.
    pub fn label(&self, offset: usize) -> usize {
        self.groups
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, g)| g.as_ref().is_some_and(|r| r.contains(&offset)))
            .map_or(0, |(i, _)| i)
    }
}

/// Matched nodes of one layer with their per-offset labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub labels: NodeLabels,
    pub nodes: NodeSet,
}

/// A compiled layer pattern.
#[derive(Debug, Clone)]
pub struct LayerMatcher {
    regex: Regex,
}

impl LayerMatcher {
    /// Compile `pattern`. Patterns longer than `max_len` characters are
    /// rejected before compilation.
    pub fn compile(pattern: &str, flags: MatchFlags, max_len: usize) -> Result<Self, SearchError> {
        let len = pattern.chars().count();
        if len > max_len {
            return Err(SearchError::PatternTooLong { len, max: max_len });
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flags.ignore_case)
            .multi_line(flags.multi_line)
            .dot_matches_new_line(flags.dot_all)
            .build()
            .map_err(|source| SearchError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// All non-overlapping matches, scanning the whole stream.
    pub fn search(&self, text: &LayerText) -> Vec<LayerMatch> {
        self.regex
            .captures_iter(text.as_str())
            .map(|caps| LayerMatch {
                groups: caps
                    .iter()
                    .map(|g| {
                        g.map(|m| text.char_offset(m.start())..text.char_offset(m.end()))
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Map every matched offset to its owning node, skipping unowned offsets.
///
/// Offsets beyond the position array are a [`SearchError::LayerMatchFailure`].
pub fn project(matches: &[LayerMatch], positions: &PositionMap) -> Result<Projection, SearchError> {
    let mut projection = Projection::default();
    for m in matches {
        for offset in m.whole() {
            if offset >= positions.len() {
                return Err(SearchError::LayerMatchFailure(format!(
                    "offset {offset} beyond position array of length {}",
                    positions.len()
                )));
            }
            let Some(node) = positions.owner(offset) else {
                continue;
            };
            projection
                .labels
                .entry(node)
                .or_default()
                .entry(offset)
                .or_insert_with(|| m.label(offset));
            projection.nodes.insert(node);
        }
    }
    Ok(projection)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
