//! Gatherer: per node type, run every active layer pattern and intersect.
//!
//! Types are independent of each other here. For one type, the node sets of
//! all layers that actually ran are intersected; a type where no layer ran is
//! left *unset* (`None`), which is distinct from a search that ran and found
//! nothing (`Some` of an empty set). A failing layer is recorded as a
//! [`LayerError`] and left out of the intersection; nothing else is affected.

use crate::error::{LayerError, SearchError};
use crate::index::CorpusIndex;
use crate::matcher::{project, LayerMatcher, NodeLabels, Projection};
use crate::query::{LayerQuery, Query};
use crate::types::{NodeSet, NodeType};
use std::collections::BTreeMap;

/// Gather result for one node type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMatches {
    /// Intersection over all layers that ran; `None` when none ran.
    pub nodes: Option<NodeSet>,
    /// Per layer that ran, the node → offset label map used for
    /// highlighting. Not intersected.
    pub layers: BTreeMap<String, NodeLabels>,
}

#[derive(Debug, Default)]
pub struct Gathered {
    /// One entry per node type, lowest first.
    pub types: Vec<TypeMatches>,
    pub errors: Vec<LayerError>,
}

impl Gathered {
    /// The per-type node sets, ready for weeding.
    pub fn node_sets(&self) -> Vec<Option<NodeSet>> {
        self.types.iter().map(|t| t.nodes.clone()).collect()
    }

    /// Highlight labels of one layer, if its search ran.
    pub fn labels(&self, ntype: NodeType, layer: &str) -> Option<&NodeLabels> {
        self.types.get(ntype.index())?.layers.get(layer)
    }
}

/// Run all active layer patterns of `query` against `index`.
pub fn gather(index: &CorpusIndex, query: &Query, max_pattern_length: usize) -> Gathered {
    let chain = index.chain();
    let mut gathered = Gathered::default();

    for ntype in chain.iter() {
        let type_name = chain.name(ntype);
        let mut result = TypeMatches::default();

        for def in index.layer_defs(ntype) {
            let Some(lq) = query.get(type_name, &def.key).filter(|q| q.runs()) else {
                continue;
            };
            match search_layer(index, ntype, &def.key, lq, max_pattern_length) {
                Ok(Projection { labels, nodes }) => {
                    tracing::debug!(
                        ntype = type_name,
                        layer = %def.key,
                        pattern = %lq.pattern,
                        nodes = nodes.len(),
                        "layer searched"
                    );
                    result.nodes = Some(match result.nodes.take() {
                        None => nodes,
                        Some(acc) => acc.intersection(&nodes).copied().collect(),
                    });
                    result.layers.insert(def.key.clone(), labels);
                }
                Err(error) => {
                    tracing::warn!(ntype = type_name, layer = %def.key, %error, "layer search failed");
                    gathered.errors.push(LayerError {
                        ntype: type_name.to_string(),
                        layer: def.key.clone(),
                        error,
                    });
                }
            }
        }
        gathered.types.push(result);
    }

    // Patterns aimed at layers the corpus does not define.
    for (ntype, layer, lq) in query.iter() {
        if !lq.runs() {
            continue;
        }
        let known = chain
            .lookup(ntype)
            .is_some_and(|t| index.layer_def(t, layer).is_some());
        if !known {
            gathered.errors.push(LayerError {
                ntype: ntype.to_string(),
                layer: layer.to_string(),
                error: SearchError::LayerMatchFailure("no such layer".to_string()),
            });
        }
    }

    gathered
}

fn search_layer(
    index: &CorpusIndex,
    ntype: NodeType,
    key: &str,
    lq: &LayerQuery,
    max_pattern_length: usize,
) -> Result<Projection, SearchError> {
    let matcher = LayerMatcher::compile(&lq.pattern, lq.flags, max_pattern_length)?;
    let layer = index.layer(ntype, key).ok_or_else(|| {
        SearchError::LayerMatchFailure("layer has no data in this corpus".to_string())
    })?;
    let matches = matcher.search(layer.text);
    project(&matches, layer.positions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
