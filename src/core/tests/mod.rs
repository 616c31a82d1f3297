//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Structural validation tests
//! - Duplicate detection tests
//! - Conflict detection tests
//! - Normalisation and index tests


use crate::core::types::Configuration;

/// Parses a JSON literal into a document
pub(super) fn document(value: serde_json::Value) -> Configuration {
    serde_json::from_value(value).unwrap()
}
