//! Note file loading and write-back.

use crate::error::{Result, VaultError};
use crate::vault::VaultFile;
use std::path::{Path, PathBuf};

/// A note's text as read from disk.
#[derive(Debug, Clone)]
pub struct Note {
    /// Absolute path on disk.
    pub path: PathBuf,

    /// Vault-relative path (e.g., "proj/My Project.md").
    pub relative: String,

    /// Raw content of the note.
    pub content: String,
}

impl Note {
    /// Create a new note from path and content.
    pub fn new(path: impl Into<PathBuf>, relative: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            relative: relative.into(),
            content: content.into(),
        }
    }

    /// Load a scanned note. Invalid UTF-8 sequences are replaced rather than
    /// failing the read.
    pub fn load(file: &VaultFile) -> Result<Self> {
        let bytes = std::fs::read(&file.path)?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };
        Ok(Self::new(&file.path, &file.relative, content))
    }

    /// Replace the content and write it back to disk.
    pub fn save(&mut self, content: String) -> Result<()> {
        write_file(&self.path, &content)?;
        self.content = content;
        Ok(())
    }
}

/// Write `content` to `path`, tagging failures with the path.
pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| VaultError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
