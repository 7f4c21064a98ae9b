//! Document loading
//!
//! A [`Document`] is the full text of the file scanned for snippets. It is read
//! once, up front, and never mutated afterwards. Loading from a string exists so
//! that extraction can be exercised without touching the filesystem.

use crate::error::{RunnerError, RunnerResult};
use std::fs;
use std::path::{Path, PathBuf};

/// The text scanned for snippets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: Option<PathBuf>,
    source: String,
}

impl Document {
    /// Read a document from disk.
    ///
    /// Fails with [`RunnerError::Io`] naming `path` when the file is missing or
    /// unreadable.
    pub fn from_path<P: AsRef<Path>>(path: P) -> RunnerResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| RunnerError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = source.len(), "loaded document");
        Ok(Document {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Wrap in-memory text.
    pub fn from_string<S: Into<String>>(source: S) -> Self {
        Document {
            path: None,
            source: source.into(),
        }
    }

    /// Where the document was read from, if it came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
