//! Sources of included file content.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use therion_common::error::{Result, TherionError};

/// Supplies the physical lines of a file named by an `input` directive.
pub trait SourceFetcher {
    /// Reads the file at `path` as physical lines, terminators removed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and an encoding
    /// error if its bytes are not valid text.
    fn fetch(&self, path: &Path) -> Result<Vec<String>>;
}

fn split_physical(text: &str) -> Vec<String> {
    text.strip_prefix('\u{feff}')
        .unwrap_or(text)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Reads files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl SourceFetcher for FsFetcher {
    fn fetch(&self, path: &Path) -> Result<Vec<String>> {
        tracing::debug!(path = %path.display(), "reading source file");
        let bytes = std::fs::read(path).map_err(|e| TherionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            TherionError::encoding(format!(
                "{} is not valid UTF-8 at byte {}",
                path.display(),
                e.utf8_error().valid_up_to()
            ))
        })?;
        Ok(split_physical(&text))
    }
}

/// Serves file content from memory, keyed by exact path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    files: HashMap<PathBuf, String>,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` under `path`, replacing any previous content.
    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let _ = self.files.insert(path.into(), text.into());
    }

    /// Builder form of [`MemoryFetcher::insert`].
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl SourceFetcher for MemoryFetcher {
    fn fetch(&self, path: &Path) -> Result<Vec<String>> {
        self.files
            .get(path)
            .map(|text| split_physical(text))
            .ok_or_else(|| TherionError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such in-memory file"),
            })
    }
}
