//! Configuration types for strata.
//!
//! [`Config::load`] reads a corpus configuration file (TOML), layered on top
//! of the built-in `[search]` defaults. [`Config::defaults`] returns the same
//! defaults without touching the filesystem (useful in tests), and
//! [`Config::from_toml_str`] layers an in-memory document instead of a file.
//!
//! The node type hierarchy and its layers are corpus-specific and have no
//! defaults:
//!
//! ```toml
//! [[types]]
//! name  = "word"
//! init  = 1
//! count = 4
//!
//! [[types.layers]]
//! key     = "text"
//! visible = true
//! ```

use crate::error::ConfigError;
use crate::types::{LayerDef, NodeId, NodeType, TypeChain, TypeInfo};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
max_pattern_length = 1000
window             = 10
node_seq           = false
simple_base        = false
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level corpus configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    /// Node types, lowest first.
    #[serde(default)]
    pub types: Vec<TypeConfig>,
}

/// `[search]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Patterns longer than this are rejected before compilation.
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,
    /// Half the number of results rendered on either side of the focus.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Number nodes from 1 within their type instead of by global id.
    #[serde(default)]
    pub node_seq: bool,
    /// Never mark nodes of the lowest type as hits in the display.
    #[serde(default)]
    pub simple_base: bool,
    #[serde(default)]
    pub default_container: Option<String>,
}

fn default_max_pattern_length() -> usize { 1000 }
fn default_window() -> usize { 10 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_pattern_length: default_max_pattern_length(),
            window: default_window(),
            node_seq: false,
            simple_base: false,
            default_container: None,
        }
    }
}

/// One `[[types]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeConfig {
    pub name: String,
    pub init: NodeId,
    pub count: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `path`, layered on top of the built-in defaults, and
    /// validate the result.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(true))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Same as [`Config::load`] for an in-memory TOML document.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Check the structural constraints the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.types.is_empty() {
            return Err(ConfigError::NoTypes);
        }

        let mut names = HashSet::new();
        let mut floor: Option<u64> = None;
        for t in &self.types {
            if !names.insert(t.name.as_str()) {
                return Err(ConfigError::DuplicateType(t.name.clone()));
            }
            if floor.is_some_and(|f| u64::from(t.init) < f) {
                return Err(ConfigError::IntervalOrder(t.name.clone()));
            }
            floor = Some(u64::from(t.init) + u64::from(t.count));

            let mut keys = HashSet::new();
            for layer in &t.layers {
                if !keys.insert(layer.key.as_str()) {
                    return Err(ConfigError::DuplicateLayer {
                        ntype: t.name.clone(),
                        layer: layer.key.clone(),
                    });
                }
            }
        }

        if let Some(name) = &self.search.default_container {
            if !names.contains(name.as_str()) {
                return Err(ConfigError::UnknownType(name.clone()));
            }
        }
        Ok(())
    }

    pub fn type_chain(&self) -> TypeChain {
        TypeChain::new(
            self.types
                .iter()
                .map(|t| TypeInfo {
                    name: t.name.clone(),
                    init: t.init,
                    count: t.count,
                    description: t.description.clone(),
                })
                .collect(),
        )
    }

    /// Layer definitions per type, lowest type first.
    pub fn layer_defs(&self) -> Vec<Vec<LayerDef>> {
        self.types.iter().map(|t| t.layers.clone()).collect()
    }

    /// The configured container type, else the second-lowest type (or the
    /// only one).
    pub fn default_container(&self) -> NodeType {
        self.search
            .default_container
            .as_deref()
            .and_then(|name| self.types.iter().position(|t| t.name == name))
            .map(NodeType::new)
            .unwrap_or_else(|| NodeType::new(usize::from(self.types.len() > 1)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
