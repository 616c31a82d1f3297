use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, exporting or watching a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document file does not exist.
    #[error("Document not found: {0}")]
    NotFound(PathBuf),
    /// Path could not be expanded or is not valid UTF-8.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    /// File content is not valid JSON (or not a JSON object).
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Document could not be rendered as JSON.
    #[error("Failed to serialise document: {0}")]
    Serialise(#[source] serde_json::Error),
    /// Export refused because validation reported errors.
    #[error("Export blocked: {0} validation error(s)")]
    ExportBlocked(usize),
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// File watcher could not be set up.
    #[error("Failed to watch document: {0}")]
    Watch(#[from] notify::Error),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
