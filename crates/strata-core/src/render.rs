//! Renderer: highlighted spans and the nested display structure.
//!
//! [`spans`] turns a node's owned offsets plus its match labels into runs of
//! equally labelled characters. [`RenderContext::rows`] mirrors each
//! [`ResultTree`] as a [`DisplayRow`], for a bounded window of results around
//! the focus.

use crate::compose::{Cursor, ResultTree, TreeNode};
use crate::config::SearchConfig;
use crate::gather::Gathered;
use crate::index::{CorpusIndex, Layer, LayerText};
use crate::matcher::{NodeLabels, OffsetLabels};
use crate::types::{LayerDef, NodeId, NodeType};
use crate::weed::Weeded;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;

/// Pseudo-layer that shows the node number.
pub const NODE_LAYER: &str = "_";

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// A maximal run of characters with the same match status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Capture group label; `None` for unmatched text.
    pub group: Option<usize>,
    pub text: String,
}

impl Span {
    pub fn new(group: Option<usize>, text: impl Into<String>) -> Self {
        Self {
            group,
            text: text.into(),
        }
    }
}

/// Coalesce the characters at `offsets` (ascending) into spans.
pub fn spans(offsets: &[usize], labels: Option<&OffsetLabels>, text: &LayerText) -> Vec<Span> {
    let mut out: Vec<Span> = Vec::new();
    for &offset in offsets {
        let Some(ch) = text.char_at(offset) else {
            continue;
        };
        let group = labels.and_then(|l| l.get(&offset)).copied();
        match out.last_mut() {
            Some(last) if last.group == group => last.text.push(ch),
            _ => out.push(Span {
                group,
                text: ch.to_string(),
            }),
        }
    }
    out
}

/// Resolve a node's owned characters through the layer's value map. Only
/// the digits of `owned` form the code; material after the node is ignored.
pub fn resolve_label(def: &LayerDef, owned: &str) -> Option<String> {
    let map = def.value_map.as_ref().filter(|_| def.tip)?;
    let code: String = owned.chars().filter(char::is_ascii_digit).collect();
    map.get(&code).cloned()
}

/// The spans and resolved label of one node in one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    pub spans: Vec<Span>,
    pub label: Option<String>,
}

pub fn highlight(layer: Layer<'_>, node: NodeId, labels: Option<&NodeLabels>) -> Highlight {
    let offsets = layer.positions.offsets(node);
    let spans = spans(offsets, labels.and_then(|l| l.get(&node)), layer.text);
    let label = if layer.def.tip {
        let owned: String = spans.iter().map(|s| s.text.as_str()).collect();
        resolve_label(layer.def, &owned)
    } else {
        None
    };
    Highlight { spans, label }
}

// ---------------------------------------------------------------------------
// Visible layers
// ---------------------------------------------------------------------------

/// Which layers (and the node-number pseudo-layer) are shown, per type name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleLayers {
    layers: BTreeMap<String, BTreeSet<String>>,
}

impl VisibleLayers {
    /// The layers configured as `visible`.
    pub fn from_index(index: &CorpusIndex) -> Self {
        let chain = index.chain();
        let mut visible = Self::default();
        for ntype in chain.iter() {
            for def in index.layer_defs(ntype).iter().filter(|d| d.visible) {
                visible.show(chain.name(ntype), &def.key);
            }
        }
        visible
    }

    pub fn show(&mut self, ntype: &str, layer: &str) {
        self.layers
            .entry(ntype.to_string())
            .or_default()
            .insert(layer.to_string());
    }

    pub fn hide(&mut self, ntype: &str, layer: &str) {
        if let Some(set) = self.layers.get_mut(ntype) {
            set.remove(layer);
        }
    }

    pub fn is_visible(&self, ntype: &str, layer: &str) -> bool {
        self.layers.get(ntype).is_some_and(|s| s.contains(layer))
    }

    /// Visible layer keys of a type in configured order, the node-number
    /// pseudo-layer first when `with_node` and visible.
    pub fn keys<'a>(
        &self,
        index: &'a CorpusIndex,
        ntype: NodeType,
        with_node: bool,
    ) -> Vec<&'a str> {
        let name = index.chain().name(ntype);
        let node = (with_node && self.is_visible(name, NODE_LAYER)).then_some(NODE_LAYER);
        node.into_iter()
            .chain(
                index
                    .layer_defs(ntype)
                    .iter()
                    .map(|d| d.key.as_str())
                    .filter(|k| self.is_visible(name, k)),
            )
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Display structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    Number(u32),
    Text {
        layer: String,
        spans: Vec<Span>,
        label: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub ntype: String,
    pub node: NodeId,
    /// Member of its type's final set.
    pub hit: bool,
    pub values: Vec<DisplayValue>,
    pub children: Vec<DisplayNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    None,
    Focus,
    PreviousFocus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Position in the full result list.
    pub index: usize,
    pub mark: Mark,
    pub ancestors: Vec<DisplayNode>,
    /// The container node; `None` when it has nothing visible.
    pub node: Option<DisplayNode>,
    pub descendants: Vec<DisplayNode>,
}

/// Result positions rendered for a focus: up to `2 * window` results on
/// either side of it.
pub fn window(count: usize, focus: Option<usize>, window: usize) -> Range<usize> {
    let start = focus.unwrap_or(0).saturating_sub(2 * window);
    let end = (start + 4 * window + 1).min(count);
    start.min(end)..end
}

/// Everything a display or export needs from one finished run.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub index: &'a CorpusIndex,
    pub settings: &'a SearchConfig,
    pub gathered: &'a Gathered,
    pub weeded: &'a Weeded,
    pub visible: &'a VisibleLayers,
}

impl<'a> RenderContext<'a> {
    /// Node number as shown to users.
    pub fn number(&self, ntype: NodeType, node: NodeId) -> u32 {
        if self.settings.node_seq {
            self.index.chain().seq_number(ntype, node)
        } else {
            node
        }
    }

    /// Highlighted value of one (existing) layer of a node.
    pub fn highlight(&self, ntype: NodeType, key: &str, node: NodeId) -> Option<Highlight> {
        let layer = self.index.layer(ntype, key)?;
        Some(highlight(layer, node, self.gathered.labels(ntype, key)))
    }

    /// Display rows for the results in the window around the focus.
    pub fn rows(&self, trees: &[ResultTree], cursor: Cursor) -> Vec<DisplayRow> {
        window(trees.len(), cursor.focus, self.settings.window)
            .map(|i| {
                let tree = &trees[i];
                let mark = if cursor.focus == Some(i) {
                    Mark::Focus
                } else if cursor.prev_focus == Some(i) {
                    Mark::PreviousFocus
                } else {
                    Mark::None
                };
                DisplayRow {
                    index: i,
                    mark,
                    ancestors: tree
                        .ancestors
                        .iter()
                        .filter_map(|&(t, n)| self.node(t, n, &[]))
                        .collect(),
                    node: self.node(tree.ntype, tree.node, &[]),
                    descendants: tree
                        .descendants
                        .iter()
                        .filter_map(|d| self.tree_node(d))
                        .collect(),
                }
            })
            .collect()
    }

    fn tree_node(&self, tree: &TreeNode) -> Option<DisplayNode> {
        self.node(tree.ntype(), tree.node(), tree.children())
    }

    fn node(&self, ntype: NodeType, node: NodeId, children: &[TreeNode]) -> Option<DisplayNode> {
        let chain = self.index.chain();
        let keys = self.visible.keys(self.index, ntype, true);
        let children: Vec<DisplayNode> =
            children.iter().filter_map(|c| self.tree_node(c)).collect();
        if keys.is_empty() && children.is_empty() {
            return None;
        }
        let values = keys
            .into_iter()
            .filter_map(|key| {
                if key == NODE_LAYER {
                    return Some(DisplayValue::Number(self.number(ntype, node)));
                }
                let Highlight { spans, label } = self.highlight(ntype, key, node)?;
                Some(DisplayValue::Text {
                    layer: key.to_string(),
                    spans,
                    label,
                })
            })
            .collect();
        let plain = self.settings.simple_base && ntype == chain.bottom();
        Some(DisplayNode {
            ntype: chain.name(ntype).to_string(),
            node,
            hit: !plain && self.weeded.contains(ntype, node),
            values,
            children,
        })
    }
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Number(n) => write!(f, "[{n}]"),
            DisplayValue::Text { spans, label, .. } => {
                for span in spans {
                    match span.group {
                        Some(_) => write!(f, "«{}»", span.text)?,
                        None => f.write_str(&span.text)?,
                    }
                }
                if let Some(label) = label {
                    write!(f, "(={label})")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for DisplayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hit {
            f.write_str("*")?;
        }
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{value}")?;
        }
        if !self.children.is_empty() {
            f.write_str("{")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.mark {
            Mark::Focus => '>',
            Mark::PreviousFocus => '-',
            Mark::None => ' ',
        };
        write!(f, "{mark}{:>5} ", self.index + 1)?;
        for ancestor in &self.ancestors {
            write!(f, "{ancestor} ")?;
        }
        f.write_str("| ")?;
        if let Some(node) = &self.node {
            write!(f, "{node} ")?;
        }
        for (i, d) in self.descendants.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
