//! Document loading and export.
//!
//! This module is the boundary between files on disk and the pure engine in
//! `core`. Key features:
//!
//! - **Lenient import**: any JSON object loads; schema problems are left to
//!   the validator
//! - **Verbatim export**: 2-space indented JSON, key order as loaded
//! - **Gated writes**: export is refused while the validator reports errors
//! - **Automatic backups**: an existing export target is backed up first
//!
//! # Example
//!
//! ```no_run
//! use remap_doctor::config::{DocumentManager, ExportTransaction};
//!
//! let manager = DocumentManager::new("~/.config/karabiner/karabiner.json")?;
//! let config = manager.load()?;
//!
//! // Refuses to write while the document has validation errors
//! ExportTransaction::begin("/tmp/karabiner.json".into())?.commit(&config)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod export;
pub mod watcher;

pub use error::DocumentError;
pub use export::ExportTransaction;
pub use watcher::DocumentWatcher;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::types::Configuration;

/// Expands `~` and environment variables in a user-supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, DocumentError> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| DocumentError::InvalidPath(e.to_string()))
}

/// Parses JSON text into a document.
///
/// No schema checks happen here beyond the top level being an object;
/// run [`crate::core::validate`] on the result. The parsed JSON is kept
/// with the document so export can reproduce it.
pub fn parse_document(text: &str) -> Result<Configuration, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Configuration::from_value(value)
}

/// Renders a document as export text: 2-space indentation, trailing newline.
///
/// Documents read by [`parse_document`] are written from their source JSON
/// with keys in load order. Documents built in code are written from the
/// typed model.
pub fn render_document(config: &Configuration) -> Result<String, DocumentError> {
    let rendered = match config.source() {
        Some(source) => serde_json::to_string_pretty(source),
        None => serde_json::to_string_pretty(config),
    };

    let mut text = rendered.map_err(DocumentError::Serialise)?;
    text.push('\n');
    Ok(text)
}

/// Reads a document file from disk.
#[derive(Debug)]
pub struct DocumentManager {
    /// Path to the JSON document.
    path: PathBuf,
}

impl DocumentManager {
    /// Creates a manager for the document at `path` (`~` is expanded).
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotFound` if the file doesn't exist.
    pub fn new(path: &str) -> Result<Self, DocumentError> {
        let path = expand_path(path)?;

        if !path.exists() {
            return Err(DocumentError::NotFound(path));
        }

        // Symlinks are allowed, but worth mentioning
        if path.read_link().is_ok() {
            warn!(path = %path.display(), "Document is a symlink");
        }

        Ok(Self { path })
    }

    /// Path of the managed document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw document text.
    pub fn read(&self) -> Result<String, DocumentError> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Reads and parses the document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Parse` for malformed JSON; this is the only
    /// schema feedback given at load time.
    pub fn load(&self) -> Result<Configuration, DocumentError> {
        let text = self.read()?;
        let config = parse_document(&text).map_err(|source| DocumentError::Parse {
            path: self.path.clone(),
            source,
        })?;

        info!(
            path = %self.path.display(),
            profiles = config.profiles.len(),
            "Loaded document"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests;
