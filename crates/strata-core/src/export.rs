//! Exporter: the flattened result table.
//!
//! One row per result node of every type, in type order and ascending node
//! order within a type. Columns are the node number, the type name, and one
//! `"<type>-<layer>"` column per visible layer. Exporting the same final
//! state twice yields byte-identical output.

use crate::error::SearchError;
use crate::render::{Highlight, RenderContext, NODE_LAYER};
use std::fmt::Write as _;
use std::io::Write;

/// Text encoding of a written table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// UTF-16 little endian with a byte order mark, for spreadsheets.
    Utf16Le,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// Tab separated, one line per row, header first.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for line in std::iter::once(&self.header).chain(&self.rows) {
            out.push_str(&line.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn write_tsv<W: Write>(&self, mut sink: W, encoding: Encoding) -> Result<(), SearchError> {
        let tsv = self.to_tsv();
        match encoding {
            Encoding::Utf8 => sink.write_all(tsv.as_bytes())?,
            Encoding::Utf16Le => {
                let mut bytes = Vec::with_capacity(2 + tsv.len() * 2);
                bytes.extend_from_slice(&[0xFF, 0xFE]);
                for unit in tsv.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                }
                sink.write_all(&bytes)?;
            }
        }
        sink.flush()?;
        Ok(())
    }
}

/// Flatten the final state of a run into an [`ExportTable`].
pub fn tabulate(ctx: &RenderContext<'_>) -> ExportTable {
    let chain = ctx.index.chain();
    let first = if ctx.settings.node_seq { "seqno" } else { "node" };
    let mut table = ExportTable {
        header: vec![first.to_string(), "type".to_string()],
        rows: Vec::new(),
    };
    if ctx.weeded.anchor.is_none() {
        return table;
    }

    // (type, layer keys, first column index) per type
    let mut columns = Vec::new();
    for ntype in chain.iter() {
        let keys: Vec<&str> = ctx
            .visible
            .keys(ctx.index, ntype, false)
            .into_iter()
            .filter(|k| *k != NODE_LAYER)
            .collect();
        let offset = table.header.len();
        for key in &keys {
            table.header.push(format!("{}-{key}", chain.name(ntype)));
        }
        columns.push((ntype, keys, offset));
    }

    let width = table.header.len();
    for (ntype, keys, offset) in &columns {
        for &node in ctx.weeded.set(*ntype) {
            let mut row = vec![String::new(); width];
            row[0] = ctx.number(*ntype, node).to_string();
            row[1] = chain.name(*ntype).to_string();
            for (i, key) in keys.iter().enumerate() {
                if let Some(h) = ctx.highlight(*ntype, key, node) {
                    row[offset + i] = cell(&h);
                }
            }
            table.rows.push(row);
        }
    }

    tracing::info!(rows = table.rows.len(), columns = width, "results tabulated");
    table
}

/// `«group=text»` around matched spans, the resolved label appended once,
/// tabs and newlines flattened to spaces.
fn cell(h: &Highlight) -> String {
    let mut piece = String::new();
    for span in &h.spans {
        match span.group {
            Some(g) => {
                let _ = write!(piece, "«{g}={}»", span.text);
            }
            None => piece.push_str(&span.text),
        }
    }
    if let Some(label) = &h.label {
        let _ = write!(piece, "(={label})");
    }
    piece.replace(['\n', '\t'], " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
