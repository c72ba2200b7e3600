//! Query values: one pattern per (type, layer), with match flags.
//!
//! A [`Query`] is a plain value owned by the caller and passed into each run;
//! the engine never mutates it.

use std::collections::BTreeMap;

/// Flags controlling how a layer pattern is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchFlags {
    /// Case-insensitive matching.
    pub ignore_case: bool,
    /// `^` and `$` match at every line boundary instead of only at the start
    /// and end of the whole stream.
    pub multi_line: bool,
    /// `.` also matches line breaks.
    pub dot_all: bool,
}

impl Default for MatchFlags {
    fn default() -> Self {
        Self {
            ignore_case: true,
            multi_line: true,
            dot_all: false,
        }
    }
}

/// The pattern for one layer of one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerQuery {
    pub pattern: String,
    pub flags: MatchFlags,
    /// Inactive layers keep their pattern but take no part in the search.
    pub active: bool,
}

impl LayerQuery {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: MatchFlags::default(),
            active: true,
        }
    }

    pub fn with_flags(mut self, flags: MatchFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether this layer takes part in the search.
    pub fn runs(&self) -> bool {
        self.active && !self.pattern.is_empty()
    }
}

/// Patterns keyed by type name, then layer key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    layers: BTreeMap<String, BTreeMap<String, LayerQuery>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an active pattern with default flags.
    pub fn set(&mut self, ntype: &str, layer: &str, pattern: impl Into<String>) -> &mut Self {
        self.insert(ntype, layer, LayerQuery::new(pattern))
    }

    pub fn insert(&mut self, ntype: &str, layer: &str, query: LayerQuery) -> &mut Self {
        self.layers
            .entry(ntype.to_string())
            .or_default()
            .insert(layer.to_string(), query);
        self
    }

    pub fn get(&self, ntype: &str, layer: &str) -> Option<&LayerQuery> {
        self.layers.get(ntype)?.get(layer)
    }

    pub fn get_mut(&mut self, ntype: &str, layer: &str) -> Option<&mut LayerQuery> {
        self.layers.get_mut(ntype)?.get_mut(layer)
    }

    /// Toggle a layer without losing its pattern.
    pub fn set_active(&mut self, ntype: &str, layer: &str, active: bool) {
        if let Some(q) = self.get_mut(ntype, layer) {
            q.active = active;
        }
    }

    /// All (type, layer, query) triples, sorted by type name then layer key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &LayerQuery)> {
        self.layers.iter().flat_map(|(t, layers)| {
            layers
                .iter()
                .map(move |(l, q)| (t.as_str(), l.as_str(), q))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, _, q)| !q.runs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_are_insensitive_multiline() {
        let flags = MatchFlags::default();
        assert!(flags.ignore_case);
        assert!(flags.multi_line);
        assert!(!flags.dot_all);
    }

    #[test]
    fn inactive_or_empty_layers_do_not_run() {
        let mut query = Query::new();
        query.set("word", "text", "a").set("word", "cls", "");
        assert!(query.get("word", "text").unwrap().runs());
        assert!(!query.get("word", "cls").unwrap().runs());

        query.set_active("word", "text", false);
        assert!(!query.get("word", "text").unwrap().runs());
        assert_eq!(query.get("word", "text").unwrap().pattern, "a");
        assert!(query.is_empty());
    }
}
