//! File source: reads a corpus document from disk.

use crate::{parse, CorpusSource, LoadError};
use std::path::{Path, PathBuf};
use strata_core::CorpusData;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<CorpusData, LoadError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.describe(),
            source,
        })?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "corpus file read");
        parse(&text)
    }
}
