//! Core types for strata-core.
//!
//! This module defines the structural vocabulary shared by every engine
//! phase: node identifiers, node sets, the ordered [`TypeChain`] of node
//! types, the per-type [`LayerDef`]s, and the raw [`CorpusData`] handed over
//! by a corpus data provider.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Globally unique node identifier. Per type, ids occupy a contiguous interval.
pub type NodeId = u32;

/// A concrete set of nodes. Ordered, so iteration follows the index's native
/// (ascending id) order.
pub type NodeSet = BTreeSet<NodeId>;

/// One level of the structural hierarchy, as a position in the [`TypeChain`].
///
/// `NodeType(0)` is the smallest unit; higher indices are larger containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeType(usize);

impl NodeType {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// TypeChain
// ---------------------------------------------------------------------------

/// Name and id interval of one node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    /// First node id of this type.
    pub init: NodeId,
    /// Number of nodes of this type.
    pub count: u32,
    pub description: String,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, init: NodeId, count: u32) -> Self {
        Self {
            name: name.into(),
            init,
            count,
            description: String::new(),
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node >= self.init && node - self.init < self.count
    }
}

/// The fixed, strictly ordered sequence of node types, lowest first.
///
/// Every type but the last has exactly one parent type (the next one up) and
/// every type but the first has exactly one child type (the next one down).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeChain {
    types: Vec<TypeInfo>,
}

impl TypeChain {
    pub fn new(types: Vec<TypeInfo>) -> Self {
        Self { types }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All node types, lowest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeType> + ExactSizeIterator {
        (0..self.types.len()).map(NodeType)
    }

    pub fn info(&self, ntype: NodeType) -> &TypeInfo {
        &self.types[ntype.0]
    }

    pub fn name(&self, ntype: NodeType) -> &str {
        &self.types[ntype.0].name
    }

    pub fn lookup(&self, name: &str) -> Option<NodeType> {
        self.types.iter().position(|t| t.name == name).map(NodeType)
    }

    pub fn bottom(&self) -> NodeType {
        NodeType(0)
    }

    pub fn top(&self) -> NodeType {
        NodeType(self.types.len().saturating_sub(1))
    }

    /// The next type up, `None` for the top type.
    pub fn parent_of(&self, ntype: NodeType) -> Option<NodeType> {
        (ntype.0 + 1 < self.types.len()).then(|| NodeType(ntype.0 + 1))
    }

    /// The next type down, `None` for the bottom type.
    pub fn child_of(&self, ntype: NodeType) -> Option<NodeType> {
        ntype.0.checked_sub(1).map(NodeType)
    }

    /// The type whose id interval contains `node`.
    pub fn type_of(&self, node: NodeId) -> Option<NodeType> {
        self.types.iter().position(|t| t.contains(node)).map(NodeType)
    }

    /// 1-based sequence number of `node` within its type.
    pub fn seq_number(&self, ntype: NodeType, node: NodeId) -> u32 {
        node.saturating_sub(self.types[ntype.0].init) + 1
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// A named textual or categorical attribute of one node type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerDef {
    pub key: String,
    /// Name of the position array this layer's text is aligned with. Layers
    /// may share one; defaults to the layer's own key.
    #[serde(default)]
    pub pos: Option<String>,
    /// Code → human label, for layers whose node content is a code.
    #[serde(default)]
    pub value_map: Option<BTreeMap<String, String>>,
    /// Resolve the concatenated owned characters through `value_map`.
    #[serde(default)]
    pub tip: bool,
    /// Shown by default in the display and export.
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub description: String,
    /// Example pattern shown to users.
    #[serde(default)]
    pub example: String,
}

impl LayerDef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pos: None,
            value_map: None,
            tip: false,
            visible: false,
            description: String::new(),
            example: String::new(),
        }
    }

    pub fn pos_key(&self) -> &str {
        self.pos.as_deref().unwrap_or(&self.key)
    }
}

// ---------------------------------------------------------------------------
// Raw corpus data
// ---------------------------------------------------------------------------

/// Raw corpus data exactly as supplied by a corpus data provider.
///
/// `up` holds adjacency lines of the form `"<child spec>\t<parent id>"`,
/// where the child spec is a comma-separated list of ids and inclusive
/// ranges (`"1-4,7"`). `texts` is keyed by type name then layer key;
/// `positions` by type name then position key, with one owner (or `null`)
/// per character of every text aligned with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CorpusData {
    #[serde(default)]
    pub up: Vec<String>,
    #[serde(default)]
    pub texts: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub positions: HashMap<String, HashMap<String, Vec<Option<NodeId>>>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> TypeChain {
        TypeChain::new(vec![
            TypeInfo::new("word", 1, 4),
            TypeInfo::new("sentence", 10, 2),
            TypeInfo::new("line", 100, 1),
        ])
    }

    #[test]
    fn type_steps() {
        let chain = chain();
        let word = chain.lookup("word").unwrap();
        let line = chain.lookup("line").unwrap();
        assert_eq!(chain.parent_of(word), chain.lookup("sentence"));
        assert_eq!(chain.parent_of(line), None);
        assert_eq!(chain.child_of(word), None);
        assert_eq!(chain.child_of(line), chain.lookup("sentence"));
        assert_eq!(chain.top(), line);
    }

    #[test]
    fn type_of_uses_intervals() {
        let chain = chain();
        assert_eq!(chain.type_of(4), chain.lookup("word"));
        assert_eq!(chain.type_of(11), chain.lookup("sentence"));
        assert_eq!(chain.type_of(5), None);
        assert_eq!(chain.seq_number(NodeType::new(1), 11), 2);
    }

    #[test]
    fn pos_key_defaults_to_key() {
        let mut def = LayerDef::new("text");
        assert_eq!(def.pos_key(), "text");
        def.pos = Some("shared".into());
        assert_eq!(def.pos_key(), "shared");
    }
}
