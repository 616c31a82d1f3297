use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::{create_test_document, VALID_DOCUMENT};
use crate::config::{parse_document, DocumentError, DocumentWatcher, ExportTransaction};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn test_in_place_write_is_seen() {
    let (_temp_dir, path) = create_test_document(VALID_DOCUMENT);
    let watcher = DocumentWatcher::new(&path).unwrap();

    fs::write(&path, "{}").unwrap();
    assert!(watcher.wait_for_change(WAIT));
}

#[test]
fn test_edits_after_rename_over_save_are_seen() {
    let (temp_dir, path) = create_test_document(VALID_DOCUMENT);
    let watcher = DocumentWatcher::new(&path).unwrap();

    // Save the way editors do: write a sibling, rename it over the document
    let staged = temp_dir.path().join(".karabiner.json.swp");
    fs::write(&staged, VALID_DOCUMENT).unwrap();
    fs::rename(&staged, &path).unwrap();
    assert!(watcher.wait_for_change(WAIT));

    thread::sleep(Duration::from_millis(200));
    watcher.check_for_changes();

    fs::write(&path, "{}").unwrap();
    assert!(watcher.wait_for_change(WAIT), "Edit after the rename was missed");
}

#[test]
fn test_repeated_exports_are_seen() {
    let (_temp_dir, path) = create_test_document(VALID_DOCUMENT);
    let config = parse_document(VALID_DOCUMENT).unwrap();
    let watcher = DocumentWatcher::new(&path).unwrap();

    for _ in 0..2 {
        ExportTransaction::begin(path.clone())
            .unwrap()
            .commit(&config)
            .unwrap();
        assert!(watcher.wait_for_change(WAIT));

        thread::sleep(Duration::from_millis(200));
        watcher.check_for_changes();
    }
}

#[test]
fn test_sibling_files_are_ignored() {
    let (temp_dir, path) = create_test_document(VALID_DOCUMENT);
    let watcher = DocumentWatcher::new(&path).unwrap();

    fs::write(temp_dir.path().join("other.json"), "{}").unwrap();
    assert!(!watcher.wait_for_change(Duration::from_millis(500)));
}

#[test]
fn test_path_without_file_name() {
    let result = DocumentWatcher::new(Path::new("/"));
    assert!(matches!(result, Err(DocumentError::InvalidPath(_))));
}
