// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Gated export with automatic backups
//!
//! Export is the one place where validation results have teeth: a document
//! with any error-level issue is never written. Warnings are logged and the
//! write goes ahead.

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::config::{render_document, DocumentError};
use crate::core::types::Configuration;
use crate::core::validator::{validate, Severity, ValidationReport};

/// Name of the backup directory created next to the export target.
pub const BACKUP_DIR: &str = "backups";

/// Atomic export of a document to one target file.
///
/// # Lifecycle
///
/// 1. `begin()` - Backs up the existing target, if there is one
/// 2. `commit()` - Validates, then writes atomically, or
///    `rollback()` - Restores the backed-up content
///
/// # Example
///
/// ```no_run
/// use remap_doctor::config::{DocumentManager, ExportTransaction};
///
/// let config = DocumentManager::new("karabiner.json")?.load()?;
/// let tx = ExportTransaction::begin("exported.json".into())?;
///
/// match tx.commit(&config) {
///     Ok(report) => println!("Exported with {} warning(s)", report.issues.len()),
///     Err(e) => eprintln!("Export failed: {}", e),
/// }
/// # Ok::<(), remap_doctor::config::DocumentError>(())
/// ```
#[derive(Debug)]
pub struct ExportTransaction {
    target: PathBuf,
    backup_path: Option<PathBuf>,
}

impl ExportTransaction {
    /// Begins an export, backing up any existing file at `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup directory cannot be created or the
    /// existing target cannot be copied.
    pub fn begin(target: PathBuf) -> Result<Self, DocumentError> {
        let backup_path = if target.exists() {
            Some(create_timestamped_backup(&target)?)
        } else {
            None
        };

        Ok(Self {
            target,
            backup_path,
        })
    }

    /// Backup created by `begin()`, if the target already existed.
    pub fn backup_path(&self) -> Option<&Path> {
        self.backup_path.as_deref()
    }

    /// Validates the document and writes it if it has no errors.
    ///
    /// # Returns
    ///
    /// * `Ok(report)` - Document written; the report holds any warnings
    /// * `Err(DocumentError::ExportBlocked)` - Validation errors, nothing written
    ///   and the backup taken by `begin()` removed
    /// * `Err(DocumentError::WriteFailed)` - Write failed, target untouched
    pub fn commit(self, config: &Configuration) -> Result<ValidationReport, DocumentError> {
        let report = validate(config);

        if report.has_errors() {
            let errors = report.count(Severity::Error);
            warn!(
                output = %self.target.display(),
                errors,
                "Export blocked by validation errors"
            );
            self.discard_backup();
            return Err(DocumentError::ExportBlocked(errors));
        }

        for issue in &report.issues {
            warn!(path = %issue.path, "{}", issue.message);
        }

        let text = render_document(config)?;
        self.write(&text)?;

        info!(output = %self.target.display(), "Exported document");
        Ok(report)
    }

    /// Restores the target from the backup taken in `begin()`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::BackupFailed` when the target did not exist
    /// at `begin()` (there is nothing to restore).
    pub fn rollback(&self) -> Result<(), DocumentError> {
        let Some(backup_path) = &self.backup_path else {
            return Err(DocumentError::BackupFailed(
                "No backup available for rollback".to_string(),
            ));
        };

        let content = fs::read_to_string(backup_path)?;
        self.write(&content)
    }

    /// Removes the backup taken by `begin()`, and the backup directory
    /// when that leaves it empty.
    fn discard_backup(&self) {
        let Some(backup_path) = &self.backup_path else {
            return;
        };

        if let Err(e) = fs::remove_file(backup_path) {
            warn!(backup = %backup_path.display(), error = %e, "Failed to remove unused backup");
            return;
        }

        if let Some(backup_dir) = backup_path.parent() {
            // Fails while other backups remain
            let _ = fs::remove_dir(backup_dir);
        }
    }

    fn write(&self, content: &str) -> Result<(), DocumentError> {
        let mut file = AtomicWriteFile::options().open(&self.target).map_err(|e| {
            DocumentError::WriteFailed(format!("Failed to open for atomic write: {}", e))
        })?;

        file.write_all(content.as_bytes())
            .map_err(|e| DocumentError::WriteFailed(format!("Failed to write content: {}", e)))?;

        file.commit().map_err(|e| {
            DocumentError::WriteFailed(format!("Failed to commit atomic write: {}", e))
        })?;

        Ok(())
    }
}

/// Copies `target` to `backups/<name>.<YYYY-MM-DD_HHMMSS>` next to it.
fn create_timestamped_backup(target: &Path) -> Result<PathBuf, DocumentError> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let backup_dir = parent.join(BACKUP_DIR);

    if !backup_dir.exists() {
        fs::create_dir_all(&backup_dir)
            .map_err(|_| DocumentError::BackupDirNotWritable(backup_dir.clone()))?;
    }

    let original_name = target
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| DocumentError::BackupFailed(format!("No file name in {}", target.display())))?;

    let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
    let backup_path = backup_dir.join(format!("{}.{}", original_name, timestamp));

    fs::copy(target, &backup_path)
        .map_err(|e| DocumentError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;

    info!(backup = %backup_path.display(), "Backed up export target");
    Ok(backup_path)
}
