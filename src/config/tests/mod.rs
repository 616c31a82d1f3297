//! Document layer tests
//!
//! - Loading and parsing documents from disk
//! - Gated export, backups and rollback
//! - Watching a document across rename-over saves

#[cfg(test)]
mod document_tests;
#[cfg(test)]
mod watcher_tests;

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A document with no validation issues
pub(super) const VALID_DOCUMENT: &str = r#"{
  "global": {
    "show_in_menu_bar": true
  },
  "profiles": [
    {
      "name": "Default",
      "selected": true,
      "simple_modifications": [
        {
          "from": {
            "key_code": "caps_lock"
          },
          "to": [
            {
              "key_code": "escape"
            }
          ]
        }
      ],
      "fn_function_keys": [],
      "virtual_hid_keyboard": {
        "keyboard_type_v2": "ansi"
      }
    }
  ]
}
"#;

/// Helper: Creates a temporary document file for testing.
pub(super) fn create_test_document(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("karabiner.json");
    fs::write(&path, content).unwrap();
    (temp_dir, path)
}
