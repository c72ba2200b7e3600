//! CorpusIndex: immutable adjacency and position indexes over a corpus.
//!
//! Built once from [`CorpusData`] and read-only afterwards, so a single
//! index can be shared (`Arc<CorpusIndex>`) by any number of concurrent
//! readers. Holds:
//!
//! - `up`: child → parent, one level at a time;
//! - `down`: parent → children, the exact inverse of `up`;
//! - per (type, layer) the layer text with a character offset table;
//! - per (type, position key) the owner of every character and its
//!   inversion, node → ascending owned offsets.

use crate::config::Config;
use crate::error::CorpusError;
use crate::types::{CorpusData, LayerDef, NodeId, NodeSet, NodeType, TypeChain};
use std::collections::HashMap;
use std::ops::RangeInclusive;

// ---------------------------------------------------------------------------
// Layer storage
// ---------------------------------------------------------------------------

/// The character stream of one layer. Offsets used throughout the engine are
/// character offsets, not byte offsets.
#[derive(Debug, Clone)]
pub struct LayerText {
    text: String,
    /// Byte offset of every character.
    char_starts: Vec<usize>,
}

impl LayerText {
    pub fn new(text: String) -> Self {
        let char_starts = text.char_indices().map(|(b, _)| b).collect();
        Self { text, char_starts }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.char_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.char_starts.is_empty()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        let start = *self.char_starts.get(offset)?;
        self.text[start..].chars().next()
    }

    /// Character offset of a byte offset on a character boundary. The end of
    /// the text maps to `len()`.
    pub fn char_offset(&self, byte: usize) -> usize {
        self.char_starts.partition_point(|&b| b < byte)
    }
}

/// Owner of every character of the texts aligned with one position key.
#[derive(Debug, Clone)]
pub struct PositionMap {
    owners: Vec<Option<NodeId>>,
    inverted: HashMap<NodeId, Vec<usize>>,
}

impl PositionMap {
    pub fn new(owners: Vec<Option<NodeId>>) -> Self {
        let mut inverted: HashMap<NodeId, Vec<usize>> = HashMap::new();
        for (offset, owner) in owners.iter().enumerate() {
            if let Some(node) = owner {
                inverted.entry(*node).or_default().push(offset);
            }
        }
        Self { owners, inverted }
    }

    pub fn owner(&self, offset: usize) -> Option<NodeId> {
        self.owners.get(offset).copied().flatten()
    }

    /// Ascending character offsets owned by `node`; empty when it owns none.
    pub fn offsets(&self, node: NodeId) -> &[usize] {
        self.inverted.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// A borrowed view of one searchable layer.
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub def: &'a LayerDef,
    pub text: &'a LayerText,
    pub positions: &'a PositionMap,
}

#[derive(Debug, Default)]
struct TypeLayers {
    defs: Vec<LayerDef>,
    texts: HashMap<String, LayerText>,
    positions: HashMap<String, PositionMap>,
}

// ---------------------------------------------------------------------------
// CorpusIndex
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CorpusIndex {
    chain: TypeChain,
    up: HashMap<NodeId, NodeId>,
    down: HashMap<NodeId, NodeSet>,
    layers: Vec<TypeLayers>,
}

impl CorpusIndex {
    /// Build from a validated config and the raw corpus data.
    pub fn from_config(config: &Config, data: CorpusData) -> Result<Self, CorpusError> {
        Self::build(config.type_chain(), config.layer_defs(), data)
    }

    /// Build the index. `layer_defs` holds the layers of each type of
    /// `chain`, lowest type first.
    pub fn build(
        chain: TypeChain,
        layer_defs: Vec<Vec<LayerDef>>,
        mut data: CorpusData,
    ) -> Result<Self, CorpusError> {
        let (up, down) = build_adjacency(&chain, &data.up)?;

        let mut layers = Vec::with_capacity(chain.len());
        let mut defs_iter = layer_defs.into_iter();
        for ntype in chain.iter() {
            let defs = defs_iter.next().unwrap_or_default();
            let name = chain.name(ntype);
            let mut type_texts = data.texts.remove(name).unwrap_or_default();
            let mut type_positions = data.positions.remove(name).unwrap_or_default();

            let mut entry = TypeLayers::default();
            for def in &defs {
                let Some(text) = type_texts.remove(&def.key) else {
                    tracing::warn!(ntype = name, layer = %def.key, "layer has no text in corpus data");
                    continue;
                };
                let text = LayerText::new(text);
                let pos_key = def.pos_key();
                if !entry.positions.contains_key(pos_key) {
                    match type_positions.remove(pos_key) {
                        Some(owners) => {
                            entry.positions.insert(pos_key.to_string(), PositionMap::new(owners));
                        }
                        None => {
                            tracing::warn!(ntype = name, layer = %def.key, pos = pos_key, "layer has no position array");
                            continue;
                        }
                    }
                }
                let positions_len = entry.positions[pos_key].len();
                if positions_len != text.len() {
                    return Err(CorpusError::PositionLengthMismatch {
                        ntype: name.to_string(),
                        layer: def.key.clone(),
                        text_len: text.len(),
                        positions_len,
                    });
                }
                entry.texts.insert(def.key.clone(), text);
            }
            for key in type_texts.keys() {
                tracing::debug!(ntype = name, layer = %key, "ignoring unconfigured layer");
            }
            entry.defs = defs;
            layers.push(entry);
        }

        tracing::info!(
            types = chain.len(),
            up = up.len(),
            parents = down.len(),
            "corpus index built"
        );

        Ok(Self {
            chain,
            up,
            down,
            layers,
        })
    }

    pub fn chain(&self) -> &TypeChain {
        &self.chain
    }

    /// The immediate parent of `node`; `None` for top-type nodes.
    pub fn up(&self, node: NodeId) -> Option<NodeId> {
        self.up.get(&node).copied()
    }

    /// Iterate the children of `node`, ascending; empty for parents absent
    /// from `down`.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.down.get(&node).into_iter().flatten().copied()
    }

    pub fn layer_defs(&self, ntype: NodeType) -> &[LayerDef] {
        self.layers
            .get(ntype.index())
            .map(|l| l.defs.as_slice())
            .unwrap_or(&[])
    }

    pub fn layer_def(&self, ntype: NodeType, key: &str) -> Option<&LayerDef> {
        self.layer_defs(ntype).iter().find(|d| d.key == key)
    }

    /// The searchable data of one layer; `None` when the layer is not
    /// configured or the corpus supplied no data for it.
    pub fn layer(&self, ntype: NodeType, key: &str) -> Option<Layer<'_>> {
        let entry = self.layers.get(ntype.index())?;
        let def = entry.defs.iter().find(|d| d.key == key)?;
        Some(Layer {
            def,
            text: entry.texts.get(key)?,
            positions: entry.positions.get(def.pos_key())?,
        })
    }

    /// Check that `up` and `down` are mutually inverse.
    pub fn check_consistency(&self) -> Result<(), String> {
        for (child, parent) in &self.up {
            if !self.down.get(parent).is_some_and(|c| c.contains(child)) {
                return Err(format!("{child} → {parent} missing from down[{parent}]"));
            }
        }
        for (parent, children) in &self.down {
            for child in children {
                if self.up.get(child) != Some(parent) {
                    return Err(format!("down[{parent}] holds {child}, which maps elsewhere"));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Adjacency parsing
// ---------------------------------------------------------------------------

fn build_adjacency(
    chain: &TypeChain,
    lines: &[String],
) -> Result<(HashMap<NodeId, NodeId>, HashMap<NodeId, NodeSet>), CorpusError> {
    let mut up: HashMap<NodeId, NodeId> = HashMap::new();
    let mut down: HashMap<NodeId, NodeSet> = HashMap::new();

    for (i, line) in lines.iter().enumerate() {
        let (ranges, parent) = parse_adjacency_line(line)
            .map_err(|reason| CorpusError::BadAdjacency { line: i + 1, reason })?;

        let parent_type = chain
            .type_of(parent)
            .ok_or(CorpusError::NodeOutOfRange(parent))?;
        let downs = down.entry(parent).or_default();
        for range in ranges {
            // type intervals are contiguous: checking both ends covers the range
            for end in [*range.start(), *range.end()] {
                let child_type = chain
                    .type_of(end)
                    .ok_or(CorpusError::NodeOutOfRange(end))?;
                if chain.parent_of(child_type) != Some(parent_type) {
                    return Err(CorpusError::WrongParentType { child: end, parent });
                }
            }
            for child in range {
                if let Some(first) = up.insert(child, parent) {
                    if first != parent {
                        return Err(CorpusError::DuplicateParent {
                            child,
                            first,
                            second: parent,
                        });
                    }
                }
                downs.insert(child);
            }
        }
    }
    Ok((up, down))
}

/// Parse `"<child spec>\t<parent>"`.
pub fn parse_adjacency_line(
    line: &str,
) -> Result<(Vec<RangeInclusive<NodeId>>, NodeId), String> {
    let (spec, parent) = line
        .split_once('\t')
        .ok_or_else(|| format!("expected `<children>\\t<parent>`, got {line:?}"))?;
    let parent = parse_id(parent)?;
    Ok((child_ranges(spec)?, parent))
}

/// Split `"1-4,7"` into the inclusive ranges `[1..=4, 7..=7]`.
pub fn child_ranges(spec: &str) -> Result<Vec<RangeInclusive<NodeId>>, String> {
    spec.split(',')
        .map(|part| match part.split_once('-') {
            None => parse_id(part).map(|id| id..=id),
            Some((lo, hi)) => {
                let (lo, hi) = (parse_id(lo)?, parse_id(hi)?);
                if lo > hi {
                    return Err(format!("empty range {part:?}"));
                }
                Ok(lo..=hi)
            }
        })
        .collect()
}

fn parse_id(s: &str) -> Result<NodeId, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("invalid node id {s:?}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
