//! Composer: organise reconciled results around container nodes.
//!
//! Every node of the container type's final set becomes one [`ResultTree`]:
//! its ancestor chain up to the top type, the container node itself, and
//! all of its descendants down to the bottom type. Trees never share nodes.

use crate::error::SearchError;
use crate::index::CorpusIndex;
use crate::types::{NodeId, NodeType};
use crate::weed::Weeded;

/// A descendant of a container node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A node of the bottom type.
    Leaf { ntype: NodeType, node: NodeId },
    /// A node above the bottom type with its children (possibly none).
    Branch {
        ntype: NodeType,
        node: NodeId,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn node(&self) -> NodeId {
        match self {
            TreeNode::Leaf { node, .. } | TreeNode::Branch { node, .. } => *node,
        }
    }

    pub fn ntype(&self) -> NodeType {
        match self {
            TreeNode::Leaf { ntype, .. } | TreeNode::Branch { ntype, .. } => *ntype,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Leaf { .. } => &[],
            TreeNode::Branch { children, .. } => children.as_slice(),
        }
    }
}

/// One result: a container node in its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTree {
    /// Ancestors, root first, ending with the container's parent.
    pub ancestors: Vec<(NodeType, NodeId)>,
    pub ntype: NodeType,
    pub node: NodeId,
    pub descendants: Vec<TreeNode>,
}

impl ResultTree {
    pub fn ancestor_ids(&self) -> Vec<NodeId> {
        self.ancestors.iter().map(|(_, n)| *n).collect()
    }
}

/// Compose one tree per node in the final set of `container`, in ascending
/// node order.
pub fn compose(
    index: &CorpusIndex,
    weeded: &Weeded,
    container: NodeType,
) -> Result<Vec<ResultTree>, SearchError> {
    let Some(nodes) = weeded.sets.get(container.index()) else {
        return Ok(Vec::new());
    };
    let trees = nodes
        .iter()
        .map(|&node| -> Result<ResultTree, SearchError> {
            Ok(ResultTree {
                ancestors: ancestors(index, container, node)?,
                ntype: container,
                node,
                descendants: descendants(index, container, node),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        container = index.chain().name(container),
        results = trees.len(),
        "composed"
    );
    Ok(trees)
}

fn ancestors(
    index: &CorpusIndex,
    ntype: NodeType,
    node: NodeId,
) -> Result<Vec<(NodeType, NodeId)>, SearchError> {
    let chain = index.chain();
    let mut chain_up = Vec::new();
    let (mut t, mut n) = (ntype, node);
    while let Some(parent) = index.up(n) {
        t = chain.parent_of(t).ok_or_else(|| {
            SearchError::IndexCorruption(format!("node {n} of the top type has parent {parent}"))
        })?;
        n = parent;
        chain_up.push((t, n));
    }
    chain_up.reverse();
    Ok(chain_up)
}

fn descendants(index: &CorpusIndex, ntype: NodeType, node: NodeId) -> Vec<TreeNode> {
    let chain = index.chain();
    let Some(child_type) = chain.child_of(ntype) else {
        return Vec::new();
    };
    index
        .children(node)
        .map(|child| {
            if child_type == chain.bottom() {
                TreeNode::Leaf {
                    ntype: child_type,
                    node: child,
                }
            } else {
                TreeNode::Branch {
                    ntype: child_type,
                    node: child,
                    children: descendants(index, child_type, child),
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Focus cursor
// ---------------------------------------------------------------------------

/// Focus and previous focus, as indices into the composed result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub focus: Option<usize>,
    pub prev_focus: Option<usize>,
}

/// How the cursor follows a recomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reflow {
    /// Same results shape: keep, clamped to the new count.
    Keep,
    /// Structural change (e.g. another container type): scale both positions
    /// by `count / old_count`.
    Rescale { old_count: usize },
    /// The query changed since the last run: focus the first result.
    Reset,
}

impl Cursor {
    pub fn reflow(self, count: usize, reflow: Reflow) -> Self {
        let clamp = |pos: Option<usize>| match count {
            0 => None,
            _ => pos.map(|p| p.min(count - 1)),
        };
        match reflow {
            Reflow::Keep => Self {
                focus: clamp(self.focus),
                prev_focus: clamp(self.prev_focus),
            },
            Reflow::Rescale { old_count } => {
                let ratio = count as f64 / old_count.max(1) as f64;
                let scale =
                    |pos: Option<usize>| clamp(pos.map(|p| (p as f64 * ratio).round() as usize));
                Self {
                    focus: scale(self.focus),
                    prev_focus: scale(self.prev_focus),
                }
            }
            Reflow::Reset => Self {
                focus: (count > 0).then_some(0),
                prev_focus: None,
            },
        }
    }

    /// Move the focus, remembering where it was.
    pub fn move_to(self, focus: usize, count: usize) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            focus: Some(focus.min(count - 1)),
            prev_focus: self.focus,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
