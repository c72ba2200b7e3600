#![allow(unused)]
//! Export integration harness.
//!
//! # What this covers
//!
//! - **Table shape**: header columns per visible layer of every type, rows
//!   per type in type order and ascending node order within a type.
//! - **Cells**: capture group delimiters, resolved labels, flattened tabs and
//!   newlines, and `seqno` numbering.
//! - **Determinism**: exporting the same final state twice is byte-identical.
//! - **Encodings**: UTF-8 and UTF-16LE with a byte order mark, written to a
//!   real file.
//!
//! # What this does NOT cover
//!
//! - How the final state was reached (see weed_harness and session_harness)
//!
//! # Running
//!
//! ```sh
//! cargo test --test export_harness
//! INSTA_UPDATE=always cargo test --test export_harness   # refresh snapshots
//! ```

mod common;
use common::*;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use strata_core::export::Encoding;
use strata_core::{CorpusIndex, Query, RunOutcome, Session};

fn run(session: &Session, query: &Query) -> RunOutcome {
    session.run(query, &session.initial_view()).unwrap()
}

fn joined_rows(outcome: &RunOutcome, session: &Session) -> Vec<String> {
    session
        .export(outcome)
        .rows
        .iter()
        .map(|r| r.join("|"))
        .collect()
}

// ---------------------------------------------------------------------------
// Table shape
// ---------------------------------------------------------------------------

#[test]
fn word_search_table() {
    let session = worked_session();
    let outcome = run(&session, &query(&[("word", "text", "cat|dog")]));
    let table = session.export(&outcome);

    insta::assert_snapshot!(
        table.header.join(" | "),
        @"node | type | word-text | word-cls | sentence-kind | line-title"
    );
    insta::assert_debug_snapshot!(joined_rows(&outcome, &session), @r###"
    [
        "2|word|«0=cat» |2 (=noun)||",
        "5|word|«0=dog» |2 (=noun)||",
        "10|sentence|||decl|",
        "11|sentence|||excl|",
        "100|line||||story",
    ]
    "###);
}

#[test]
fn capture_groups_are_numbered() {
    let session = worked_session();
    let outcome = run(&session, &query(&[("word", "text", "c(a)t")]));
    let rows = joined_rows(&outcome, &session);
    assert_eq!(rows[0], "2|word|«0=c»«1=a»«0=t» |2 (=noun)||");
    assert_eq!(rows.len(), 3);
}

#[test]
fn searched_code_layer_keeps_its_label() {
    let session = worked_session();
    let outcome = run(&session, &query(&[("word", "cls", "3")]));
    let rows = joined_rows(&outcome, &session);
    assert_eq!(rows[0], "3|word|sat. |«0=3» (=verb)||");
    assert_eq!(rows[1], "6|word|ran!|«0=3»(=verb)||");
}

#[test]
fn nothing_searched_exports_only_the_header() {
    let session = worked_session();
    let table = session.export(&run(&session, &Query::new()));
    assert_eq!(table.header, vec!["node", "type"]);
    assert!(table.rows.is_empty());
    assert_eq!(table.to_tsv(), "node\ttype\n");
}

#[test]
fn seqno_numbering() {
    let mut config = worked_config();
    config.search.node_seq = true;
    let session = Session::new(Arc::new(worked_index()), config);
    let table = session.export(&run(&session, &query(&[("sentence", "kind", "excl")])));
    assert_eq!(table.header[0], "seqno");
    let numbers: Vec<(&str, &str)> = table
        .rows
        .iter()
        .map(|r| (r[1].as_str(), r[0].as_str()))
        .collect();
    assert_eq!(
        numbers,
        vec![
            ("word", "4"),
            ("word", "5"),
            ("word", "6"),
            ("sentence", "2"),
            ("line", "1"),
        ]
    );
}

#[test]
fn tabs_and_newlines_are_flattened() {
    let config = worked_config();
    let data = worked_corpus()
        .layer("line", "title", &[(Some(100), "a\tstory\n")])
        .build();
    let session = Session::new(Arc::new(CorpusIndex::from_config(&config, data).unwrap()), config);
    let table = session.export(&run(&session, &query(&[("line", "title", "story")])));
    let line = table.rows.last().unwrap();
    assert_eq!(line[1], "line");
    assert_eq!(line[5], "a «0=story» ");
    assert!(!table.to_tsv().contains("story\n"));
}

// ---------------------------------------------------------------------------
// Determinism and encodings
// ---------------------------------------------------------------------------

#[test]
fn export_is_deterministic() {
    let q = query(&[("word", "text", "a"), ("sentence", "kind", "e")]);
    let first = {
        let session = worked_session();
        let outcome = run(&session, &q);
        session.export(&outcome).to_tsv()
    };
    let session = worked_session();
    let outcome = run(&session, &q);
    assert_eq!(session.export(&outcome).to_tsv(), first);
    assert_eq!(session.export(&outcome).to_tsv(), first);
}

#[test]
fn utf8_file_matches_tsv() {
    let session = worked_session();
    let table = session.export(&run(&session, &query(&[("word", "text", "dog")])));
    let file = tempfile::NamedTempFile::new().unwrap();
    table
        .write_tsv(std::fs::File::create(file.path()).unwrap(), Encoding::Utf8)
        .unwrap();
    assert_eq!(std::fs::read_to_string(file.path()).unwrap(), table.to_tsv());
}

#[test]
fn utf16_file_has_bom() {
    let session = worked_session();
    let table = session.export(&run(&session, &query(&[("word", "text", "dog")])));
    let file = tempfile::NamedTempFile::new().unwrap();
    table
        .write_tsv(std::fs::File::create(file.path()).unwrap(), Encoding::Utf16Le)
        .unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
    let units: Vec<u16> = bytes[2..]
        .chunks_exact(2)
        .map(|p| u16::from_le_bytes([p[0], p[1]]))
        .collect();
    assert_eq!(String::from_utf16(&units).unwrap(), table.to_tsv());
}
