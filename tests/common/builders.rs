//! Test builders: corpus data and queries without hand-counting offsets.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use strata_core::{
    CorpusData, CorpusIndex, LayerQuery, MatchFlags, NodeSet, Query, TypeChain, TypeInfo,
};

// ---------------------------------------------------------------------------
// CorpusBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for raw corpus data.
///
/// A layer is given as segments of `(owner, text)`; the builder concatenates
/// the texts and emits one owner per character. `None` marks characters that
/// belong to no node.
///
/// # Example
///
/// ```rust
/// let data = CorpusBuilder::new()
///     .up("1-2\t10")
///     .layer("word", "text", &[(Some(1), "the "), (Some(2), "cat")])
///     .build();
/// ```
#[derive(Default)]
pub struct CorpusBuilder {
    up: Vec<String>,
    texts: Map<String, Value>,
    positions: Map<String, Value>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn up(mut self, line: &str) -> Self {
        self.up.push(line.to_string());
        self
    }

    /// A layer with its own position array.
    pub fn layer(mut self, ntype: &str, key: &str, segments: &[(Option<u32>, &str)]) -> Self {
        let mut text = String::new();
        let mut owners = Vec::new();
        for (owner, piece) in segments {
            text.push_str(piece);
            owners.extend(std::iter::repeat(json!(owner)).take(piece.chars().count()));
        }
        self.insert_text(ntype, key, text);
        self.positions
            .entry(ntype.to_string())
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .unwrap()
            .insert(key.to_string(), Value::Array(owners));
        self
    }

    /// A layer whose text is aligned with another layer's position array.
    pub fn shared_layer(mut self, ntype: &str, key: &str, text: &str) -> Self {
        self.insert_text(ntype, key, text.to_string());
        self
    }

    fn insert_text(&mut self, ntype: &str, key: &str, text: String) {
        self.texts
            .entry(ntype.to_string())
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .unwrap()
            .insert(key.to_string(), Value::String(text));
    }

    /// The corpus document as a data provider would read it.
    pub fn to_json(&self) -> Value {
        json!({
            "up": self.up,
            "texts": self.texts,
            "positions": self.positions,
        })
    }

    pub fn build(self) -> CorpusData {
        serde_json::from_value(self.to_json()).expect("builder produced invalid corpus data")
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Build a query from `(type, layer, pattern)` triples with default flags.
pub fn query(patterns: &[(&str, &str, &str)]) -> Query {
    let mut q = Query::new();
    for (ntype, layer, pattern) in patterns {
        q.set(ntype, layer, *pattern);
    }
    q
}

/// Same as [`query`] with case-sensitive matching.
pub fn query_case_sensitive(patterns: &[(&str, &str, &str)]) -> Query {
    let flags = MatchFlags {
        ignore_case: false,
        ..MatchFlags::default()
    };
    let mut q = Query::new();
    for (ntype, layer, pattern) in patterns {
        q.insert(ntype, layer, LayerQuery::new(*pattern).with_flags(flags));
    }
    q
}

// ---------------------------------------------------------------------------
// Random hierarchies
// ---------------------------------------------------------------------------

/// First node id of each type of a random [`Hierarchy`], lowest first.
pub const HIERARCHY_INITS: [u32; 3] = [1, 1000, 2000];

/// A random three-level hierarchy (word → phrase → doc) in which every node
/// above the bottom type has at least one child.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    /// Node count per type, lowest first.
    pub counts: [u32; 3],
    /// `(child, parent)` pairs.
    pub edges: Vec<(u32, u32)>,
}

impl Hierarchy {
    pub fn chain(&self) -> TypeChain {
        TypeChain::new(vec![
            TypeInfo::new("word", HIERARCHY_INITS[0], self.counts[0]),
            TypeInfo::new("phrase", HIERARCHY_INITS[1], self.counts[1]),
            TypeInfo::new("doc", HIERARCHY_INITS[2], self.counts[2]),
        ])
    }

    pub fn nodes(&self, level: usize) -> Vec<u32> {
        (HIERARCHY_INITS[level]..HIERARCHY_INITS[level] + self.counts[level]).collect()
    }

    pub fn index(&self) -> CorpusIndex {
        let data = CorpusData {
            up: self.edges.iter().map(|(c, p)| format!("{c}\t{p}")).collect(),
            ..CorpusData::default()
        };
        CorpusIndex::build(self.chain(), vec![vec![]; 3], data).expect("random hierarchy builds")
    }
}

pub fn arb_hierarchy() -> impl Strategy<Value = Hierarchy> {
    (1u32..=3, 0u32..=4, 0u32..=8)
        .prop_flat_map(|(docs, extra_phrases, extra_words)| {
            let phrases = docs + extra_phrases;
            let words = phrases + extra_words;
            (
                Just([words, phrases, docs]),
                proptest::collection::vec(0..docs, phrases as usize),
                proptest::collection::vec(0..phrases, words as usize),
            )
        })
        .prop_map(|(counts, phrase_parents, word_parents)| {
            let mut edges = Vec::new();
            // the first `count` children cover every parent once
            for (level, parents) in [(0, word_parents), (1, phrase_parents)] {
                let above = counts[level + 1];
                for (i, random) in parents.into_iter().enumerate() {
                    let i = i as u32;
                    let parent = if i < above { i } else { random };
                    edges.push((HIERARCHY_INITS[level] + i, HIERARCHY_INITS[level + 1] + parent));
                }
            }
            Hierarchy { counts, edges }
        })
}

/// A hierarchy plus one optional subset of nodes per type.
pub fn arb_partial_sets() -> impl Strategy<Value = (Hierarchy, Vec<Option<NodeSet>>)> {
    arb_hierarchy().prop_flat_map(|h| {
        let sets: Vec<_> = (0..3)
            .map(|level| {
                let nodes = h.nodes(level);
                let len = nodes.len();
                proptest::option::of(
                    proptest::sample::subsequence(nodes, 0..=len)
                        .prop_map(|picked| picked.into_iter().collect::<NodeSet>()),
                )
            })
            .collect();
        (Just(h), sets)
    })
}
