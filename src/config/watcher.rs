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

//! File system watcher for live document re-validation
//!
//! Uses OS-level file watching via the notify crate. The watch sits on the
//! document's directory, not the file: editors and `ExportTransaction` save
//! by renaming a new file over the old one, and a watch on the file would
//! stay attached to the replaced inode. Events are filtered down to the
//! document's own file name.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    ffi::OsString,
    path::Path,
    sync::mpsc::{channel, Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use crate::config::DocumentError;

/// Watches one document file for modifications
pub struct DocumentWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    file_name: OsString,
}

impl DocumentWatcher {
    /// Starts watching the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::InvalidPath` when `path` has no file name,
    /// or `DocumentError::Watch` when the directory cannot be watched.
    pub fn new(path: &Path) -> Result<Self, DocumentError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| DocumentError::InvalidPath(path.display().to_string()))?
            .to_os_string();

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        watcher.watch(directory, RecursiveMode::NonRecursive)?;
        debug!(directory = %directory.display(), "Watching document directory");

        Ok(DocumentWatcher {
            _watcher: watcher,
            rx,
            file_name,
        })
    }

    /// Checks for modification events without blocking
    pub fn check_for_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(event_result) = self.rx.try_recv() {
            changed |= self.is_change(event_result);
        }
        changed
    }

    /// Blocks until the document changes or `timeout` passes.
    ///
    /// Returns false on timeout or when the watcher has shut down. Events
    /// for other files in the directory do not end the wait. Events already
    /// queued behind a change (editors often write twice) are drained.
    pub fn wait_for_change(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());

            match self.rx.recv_timeout(remaining) {
                Ok(event_result) => {
                    if self.is_change(event_result) {
                        self.check_for_changes();
                        return true;
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false
                }
            }
        }
    }

    fn is_change(&self, event_result: notify::Result<Event>) -> bool {
        match event_result {
            Ok(event) => {
                let touches_document = event
                    .paths
                    .iter()
                    .any(|path| path.file_name() == Some(self.file_name.as_os_str()));

                if !touches_document {
                    return false;
                }

                debug!(kind = ?event.kind, "Document event");
                matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
            }
            Err(e) => {
                warn!(error = %e, "Watch error");
                false
            }
        }
    }
}
