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

//! src/core/mod.rs
//!
//! Core validation engine
//!
//! This module contains the document model and the pure functions that
//! inspect it:
//! - Key identity resolution shared by every comparison
//! - Structural validation with ordered, severity-tagged issues
//! - Duplicate detection within flat mapping lists
//! - Cross-rule conflict detection for complex modifications
//! - Normalisation and reverse indices for key inspection
//!
//! Nothing in here performs I/O or keeps state between calls; every
//! function re-walks the document it is given.

pub mod conflict;
pub mod duplicates;
pub mod identity;
pub mod normalize;
pub mod types;
pub mod validator;

pub use conflict::{detect_rule_conflicts, find_conflicts, ComboKey, ConflictDetector, RuleConflict};
pub use duplicates::{find_duplicates, find_profile_duplicates, MappingScope, ScopedDuplicates};
pub use identity::{KeyIdentity, ResolveKey};
pub use normalize::{
    build_index, normalize, MappingId, MappingIndex, MappingRef, MappingType, NormalizedMapping,
    Scope, ToTarget,
};
pub use types::*;
pub use validator::{validate, Severity, ValidationIssue, ValidationReport};

#[cfg(test)]
mod tests;
