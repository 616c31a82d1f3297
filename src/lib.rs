// Copyright 2025 bakri (tidynest@proton.me)
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

//! Remap Doctor
//!
//! Validation and conflict detection for keyboard remapping documents
//! (the Karabiner-Elements JSON format).
//!
//! # Features
//!
//! - **Structural Validation:** Ordered errors and warnings with document paths
//! - **Duplicate Detection:** Keys bound twice in the same mapping list
//! - **Conflict Detection:** Complex-modification triggers claimed by two rules
//! - **Key Inspection:** Every mapping touching a key, as source or target
//! - **Gated Export:** Documents with errors are never written
//!
//! # Architecture
//!
//! - **`core`:** Pure engine (document model, validator, detectors, index)
//! - **`config`:** File boundary (loading, export, backups, watching)
//!
//! # Examples
//!
//! ## Validating a document
//!
//! ```no_run
//! use remap_doctor::config::DocumentManager;
//! use remap_doctor::core::validate;
//!
//! let config = DocumentManager::new("~/.config/karabiner/karabiner.json")?.load()?;
//! let report = validate(&config);
//!
//! for issue in &report.issues {
//!     println!("{} {}: {}", issue.severity, issue.path, issue.message);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Detecting conflicts
//!
//! ```
//! use remap_doctor::config::parse_document;
//! use remap_doctor::core::find_conflicts;
//!
//! let config = parse_document(r#"{ "profiles": [{ "name": "Default" }] }"#)?;
//! let conflicts = find_conflicts(config.profiles[0].rules());
//! assert!(conflicts.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod core;

// Re-export commonly used types for convenience
pub use crate::core::{Configuration, KeyIdentity, Profile, Rule, ValidationReport};
