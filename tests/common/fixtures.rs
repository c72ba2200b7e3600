//! The worked corpus used across harnesses.
//!
//! Three node types, two sentences of three words under one line:
//!
//! ```text
//! line      100 "story"
//! sentence  10 "decl"             11 "excl"
//! word      1 the  2 cat  3 sat.  4 a  5 dog  6 ran!
//! ```
//!
//! Word layers: `text` (visible), `cls` (a code per word, resolved through
//! a value map: 1 article, 2 noun, 3 verb) and `lemma` (hidden, upper-case,
//! sharing the `text` position array).

use super::builders::CorpusBuilder;
use std::sync::Arc;
use strata_core::config::Config;
use strata_core::{CorpusData, CorpusIndex, Session};

pub const WORKED_CONFIG: &str = r#"
[search]
window = 2

[[types]]
name  = "word"
init  = 1
count = 6

[[types.layers]]
key     = "text"
visible = true

[[types.layers]]
key     = "cls"
tip     = true
visible = true

[types.layers.value_map]
"1" = "article"
"2" = "noun"
"3" = "verb"

[[types.layers]]
key = "lemma"
pos = "text"

[[types]]
name  = "sentence"
init  = 10
count = 2

[[types.layers]]
key     = "kind"
visible = true

[[types]]
name  = "line"
init  = 100
count = 1

[[types.layers]]
key     = "title"
visible = true
"#;

pub const WORD_TEXT: &str = "the cat sat. a dog ran!";

pub fn worked_corpus() -> CorpusBuilder {
    CorpusBuilder::new()
        .up("1-3\t10")
        .up("4-6\t11")
        .up("10-11\t100")
        .layer(
            "word",
            "text",
            &[
                (Some(1), "the "),
                (Some(2), "cat "),
                (Some(3), "sat. "),
                (Some(4), "a "),
                (Some(5), "dog "),
                (Some(6), "ran!"),
            ],
        )
        .layer(
            "word",
            "cls",
            &[
                (Some(1), "1 "),
                (Some(2), "2 "),
                (Some(3), "3 "),
                (Some(4), "1 "),
                (Some(5), "2 "),
                (Some(6), "3"),
            ],
        )
        .shared_layer("word", "lemma", "THE CAT SAT. A DOG RAN!")
        .layer("sentence", "kind", &[(Some(10), "decl"), (None, " "), (Some(11), "excl")])
        .layer("line", "title", &[(Some(100), "story")])
}

pub fn worked_config() -> Config {
    Config::from_toml_str(WORKED_CONFIG).expect("worked config is valid")
}

pub fn worked_data() -> CorpusData {
    worked_corpus().build()
}

pub fn worked_index() -> CorpusIndex {
    CorpusIndex::from_config(&worked_config(), worked_data()).expect("worked corpus builds")
}

pub fn worked_session() -> Session {
    Session::new(Arc::new(worked_index()), worked_config())
}
