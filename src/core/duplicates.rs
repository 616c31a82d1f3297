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

//! Duplicate detection within a flat mapping list
//!
//! A key bound more than once in the same list is reported once per
//! repeat: three bindings of `x` yield `["x", "x"]`. Lists are checked
//! independently, so a device mapping never duplicates a profile-wide one.

use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::core::identity::ResolveKey;
use crate::core::types::{Profile, SimpleMapping};

/// Finds keys bound more than once in one mapping list.
///
/// Returns the repeated identities in the order the repeats occur.
/// Mappings without a from key are skipped.
pub fn find_duplicates(mappings: &[SimpleMapping]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for mapping in mappings {
        let Some(key) = mapping.from.resolve_key() else {
            continue;
        };

        if !seen.insert(key) {
            duplicates.push(key.to_string());
        }
    }

    duplicates
}

/// Which mapping list a duplicate was found in
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MappingScope {
    /// Profile-wide simple modifications
    ProfileSimple,
    /// Profile-wide function keys
    ProfileFn,
    /// Simple modifications of one device
    DeviceSimple { index: usize, label: String },
    /// Function keys of one device
    DeviceFn { index: usize, label: String },
}

impl fmt::Display for MappingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingScope::ProfileSimple => write!(f, "simple modifications"),
            MappingScope::ProfileFn => write!(f, "function keys"),
            MappingScope::DeviceSimple { label, .. } => {
                write!(f, "{} simple modifications", label)
            }
            MappingScope::DeviceFn { label, .. } => write!(f, "{} function keys", label),
        }
    }
}

/// Duplicates found in one labelled mapping list
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScopedDuplicates {
    pub scope: MappingScope,
    /// Repeated key identities, in encounter order
    pub keys: Vec<String>,
}

/// Runs [`find_duplicates`] over every mapping list of a profile.
///
/// Order: profile simple, profile fn, then each device's simple and fn
/// lists. Lists without duplicates are left out.
pub fn find_profile_duplicates(profile: &Profile) -> Vec<ScopedDuplicates> {
    let mut lists = vec![
        (MappingScope::ProfileSimple, profile.simple_modifications.as_slice()),
        (MappingScope::ProfileFn, profile.fn_function_keys.as_slice()),
    ];

    for (index, device) in profile.devices().iter().enumerate() {
        let label = device.label(index);
        lists.push((
            MappingScope::DeviceSimple {
                index,
                label: label.clone(),
            },
            device.simple_modifications.as_slice(),
        ));
        lists.push((
            MappingScope::DeviceFn { index, label },
            device.fn_function_keys.as_slice(),
        ));
    }

    let found: Vec<ScopedDuplicates> = lists
        .into_iter()
        .filter_map(|(scope, mappings)| {
            let keys = find_duplicates(mappings);
            (!keys.is_empty()).then_some(ScopedDuplicates { scope, keys })
        })
        .collect();

    debug!(
        profile = profile.display_name(),
        lists = found.len(),
        "Checked profile for duplicate mappings"
    );

    found
}
