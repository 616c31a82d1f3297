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

//! src/core/normalize.rs
//!
//! Flattened view of every mapping in a document
//!
//! Simple, function-key and complex mappings are turned into one uniform
//! record ([`NormalizedMapping`]) carrying resolved from/to keys and where
//! the mapping lives. [`build_index`] then groups the records by source and
//! target key so a single physical key can be inspected.
//!
//! Each record has a [`MappingId`] derived from its position in the
//! document. The same document always yields the same ids, and
//! [`Configuration::mapping`] resolves an id back to the original leaf.
//!
//! Mappings without a from key are left out entirely; the validator
//! already reports them.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::core::identity::ResolveKey;
use crate::core::types::{Configuration, Manipulator, Phase, Profile, SimpleMapping, ToEvent};

/// Which layer a mapping belongs to
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    Simple,
    Fn,
    Complex,
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingType::Simple => write!(f, "simple"),
            MappingType::Fn => write!(f, "fn"),
            MappingType::Complex => write!(f, "complex"),
        }
    }
}

/// Whether a mapping applies to all devices or one
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Scope {
    Profile,
    Device { index: usize, label: String },
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Profile => write!(f, "profile"),
            Scope::Device { label, .. } => write!(f, "{}", label),
        }
    }
}

/// Position of a mapping inside its profile
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MappingLocation {
    /// `simple_modifications[index]`, optionally of `devices[device]`
    Simple { device: Option<usize>, index: usize },
    /// `fn_function_keys[index]`, optionally of `devices[device]`
    Fn { device: Option<usize>, index: usize },
    /// `complex_modifications.rules[rule].manipulators[manipulator]`
    Complex { rule: usize, manipulator: usize },
}

/// Stable synthetic id of a mapping
///
/// Rendered as `p0:simple:3`, `p0:d1:fn:2` or `p0:r2:m0`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MappingId {
    pub profile: usize,
    pub location: MappingLocation,
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}:", self.profile)?;
        match self.location {
            MappingLocation::Simple { device: None, index } => write!(f, "simple:{}", index),
            MappingLocation::Simple {
                device: Some(device),
                index,
            } => write!(f, "d{}:simple:{}", device, index),
            MappingLocation::Fn { device: None, index } => write!(f, "fn:{}", index),
            MappingLocation::Fn {
                device: Some(device),
                index,
            } => write!(f, "d{}:fn:{}", device, index),
            MappingLocation::Complex { rule, manipulator } => {
                write!(f, "r{}:m{}", rule, manipulator)
            }
        }
    }
}

impl Serialize for MappingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors parsing a [`MappingId`]
#[derive(Debug, Error, PartialEq)]
pub enum MappingIdError {
    #[error("Invalid mapping id '{0}'")]
    Malformed(String),
}

fn parse_index(segment: &str, prefix: &str) -> Option<usize> {
    segment.strip_prefix(prefix)?.parse().ok()
}

impl FromStr for MappingId {
    type Err = MappingIdError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || MappingIdError::Malformed(text.to_string());
        let segments: Vec<&str> = text.split(':').collect();

        let profile = segments
            .first()
            .and_then(|segment| parse_index(segment, "p"))
            .ok_or_else(malformed)?;

        let location = match segments[1..] {
            ["simple", index] => MappingLocation::Simple {
                device: None,
                index: parse_index(index, "").ok_or_else(malformed)?,
            },
            ["fn", index] => MappingLocation::Fn {
                device: None,
                index: parse_index(index, "").ok_or_else(malformed)?,
            },
            [device, "simple", index] => MappingLocation::Simple {
                device: Some(parse_index(device, "d").ok_or_else(malformed)?),
                index: parse_index(index, "").ok_or_else(malformed)?,
            },
            [device, "fn", index] => MappingLocation::Fn {
                device: Some(parse_index(device, "d").ok_or_else(malformed)?),
                index: parse_index(index, "").ok_or_else(malformed)?,
            },
            [rule, manipulator] => MappingLocation::Complex {
                rule: parse_index(rule, "r").ok_or_else(malformed)?,
                manipulator: parse_index(manipulator, "m").ok_or_else(malformed)?,
            },
            _ => return Err(malformed()),
        };

        Ok(Self { profile, location })
    }
}

/// Borrowed document leaf a [`MappingId`] points at
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MappingRef<'a> {
    Simple(&'a SimpleMapping),
    Manipulator(&'a Manipulator),
}

impl Configuration {
    /// Resolves a mapping id back to its leaf in this document
    pub fn mapping(&self, id: &MappingId) -> Option<MappingRef<'_>> {
        let profile = self.profiles.get(id.profile)?;

        match id.location {
            MappingLocation::Simple { device, index } => {
                let list = match device {
                    None => &profile.simple_modifications,
                    Some(device) => &profile.devices().get(device)?.simple_modifications,
                };
                list.get(index).map(MappingRef::Simple)
            }
            MappingLocation::Fn { device, index } => {
                let list = match device {
                    None => &profile.fn_function_keys,
                    Some(device) => &profile.devices().get(device)?.fn_function_keys,
                };
                list.get(index).map(MappingRef::Simple)
            }
            MappingLocation::Complex { rule, manipulator } => profile
                .rules()
                .get(rule)?
                .manipulators
                .get(manipulator)
                .map(MappingRef::Manipulator),
        }
    }
}

/// One output of a mapping
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ToTarget {
    /// Resolved key, `None` for non-key actions (shell commands, variables)
    pub key: Option<String>,
    /// Phase the output came from; simple mappings are always `Immediate`
    pub phase: Phase,
    /// Modifiers posted with the key
    pub modifiers: Vec<String>,
}

/// Uniform record of one mapping
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NormalizedMapping {
    pub id: MappingId,
    pub mapping_type: MappingType,
    pub profile_index: usize,
    pub profile_name: String,
    #[serde(flatten)]
    pub scope: Scope,
    /// Rule position and description, complex mappings only
    pub rule: Option<(usize, String)>,
    pub from_key: String,
    /// Mandatory modifiers of the from-event
    pub from_modifiers: Vec<String>,
    /// Outputs of all phases, in phase order
    pub to: Vec<ToTarget>,
    pub condition_count: usize,
}

impl NormalizedMapping {
    /// Distinct target keys, in first-seen order
    pub fn to_keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.to
            .iter()
            .filter_map(|target| target.key.as_deref())
            .filter(|key| seen.insert(*key))
            .collect()
    }
}

impl fmt::Display for NormalizedMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = if self.from_modifiers.is_empty() {
            self.from_key.clone()
        } else {
            format!("{}+{}", self.from_modifiers.join("+"), self.from_key)
        };

        let targets = self
            .to
            .iter()
            .map(|target| {
                let key = target.key.as_deref().unwrap_or("(action)");
                let key = if target.modifiers.is_empty() {
                    key.to_string()
                } else {
                    format!("{}+{}", target.modifiers.join("+"), key)
                };
                match target.phase {
                    Phase::Immediate => key,
                    phase => format!("{} [{}]", key, phase),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "{} → {}", from, targets)
    }
}

fn to_targets<'a>(events: impl IntoIterator<Item = (Phase, &'a ToEvent)>) -> Vec<ToTarget> {
    events
        .into_iter()
        .map(|(phase, event)| ToTarget {
            key: event.resolve_key().map(str::to_string),
            phase,
            modifiers: event.modifiers.clone(),
        })
        .collect()
}

struct ProfileWalker<'a> {
    profile_index: usize,
    profile: &'a Profile,
    entries: &'a mut Vec<NormalizedMapping>,
}

impl ProfileWalker<'_> {
    fn push_simple_list(
        &mut self,
        mappings: &[SimpleMapping],
        mapping_type: MappingType,
        device: Option<(usize, String)>,
    ) {
        for (index, mapping) in mappings.iter().enumerate() {
            let Some(from_key) = mapping.from.resolve_key() else {
                continue;
            };

            let device_index = device.as_ref().map(|(device_index, _)| *device_index);
            let location = match mapping_type {
                MappingType::Fn => MappingLocation::Fn {
                    device: device_index,
                    index,
                },
                _ => MappingLocation::Simple {
                    device: device_index,
                    index,
                },
            };
            let scope = match &device {
                None => Scope::Profile,
                Some((index, label)) => Scope::Device {
                    index: *index,
                    label: label.clone(),
                },
            };

            self.entries.push(NormalizedMapping {
                id: MappingId {
                    profile: self.profile_index,
                    location,
                },
                mapping_type,
                profile_index: self.profile_index,
                profile_name: self.profile.display_name().to_string(),
                scope,
                rule: None,
                from_key: from_key.to_string(),
                from_modifiers: mapping.from.mandatory_modifiers().to_vec(),
                to: to_targets(mapping.to.iter().map(|event| (Phase::Immediate, event))),
                condition_count: 0,
            });
        }
    }

    fn push_rules(&mut self) {
        for (rule_index, rule) in self.profile.rules().iter().enumerate() {
            for (manipulator_index, manipulator) in rule.manipulators.iter().enumerate() {
                let Some(from) = &manipulator.from else {
                    continue;
                };
                let Some(from_key) = from.resolve_key() else {
                    continue;
                };

                let targets = Phase::ALL.into_iter().flat_map(|phase| {
                    manipulator
                        .phase(phase)
                        .iter()
                        .map(move |event| (phase, event))
                });

                self.entries.push(NormalizedMapping {
                    id: MappingId {
                        profile: self.profile_index,
                        location: MappingLocation::Complex {
                            rule: rule_index,
                            manipulator: manipulator_index,
                        },
                    },
                    mapping_type: MappingType::Complex,
                    profile_index: self.profile_index,
                    profile_name: self.profile.display_name().to_string(),
                    scope: Scope::Profile,
                    rule: Some((rule_index, rule.display_description().to_string())),
                    from_key: from_key.to_string(),
                    from_modifiers: from.mandatory_modifiers().to_vec(),
                    to: to_targets(targets),
                    condition_count: manipulator.conditions().len(),
                });
            }
        }
    }
}

/// Flattens every mapping of a document.
///
/// Order per profile: simple, fn, each device's simple and fn, then
/// complex manipulators rule by rule.
pub fn normalize(config: &Configuration) -> Vec<NormalizedMapping> {
    let mut entries = Vec::new();

    for (profile_index, profile) in config.profiles.iter().enumerate() {
        let mut walker = ProfileWalker {
            profile_index,
            profile,
            entries: &mut entries,
        };

        walker.push_simple_list(&profile.simple_modifications, MappingType::Simple, None);
        walker.push_simple_list(&profile.fn_function_keys, MappingType::Fn, None);

        for (device_index, device) in profile.devices().iter().enumerate() {
            let label = device.label(device_index);
            walker.push_simple_list(
                &device.simple_modifications,
                MappingType::Simple,
                Some((device_index, label.clone())),
            );
            walker.push_simple_list(
                &device.fn_function_keys,
                MappingType::Fn,
                Some((device_index, label)),
            );
        }

        walker.push_rules();
    }

    debug!(entries = entries.len(), "Normalized document mappings");
    entries
}

/// Reverse lookups over normalized mappings
#[derive(Debug, Default)]
pub struct MappingIndex<'a> {
    /// Entries grouped by resolved from key
    pub by_from_key: BTreeMap<String, Vec<&'a NormalizedMapping>>,
    /// Entries grouped by target key, each entry at most once per key
    pub by_to_key: BTreeMap<String, Vec<&'a NormalizedMapping>>,
    /// Every key used as a source or a target
    pub mapped_keys: BTreeSet<String>,
}

impl<'a> MappingIndex<'a> {
    /// Entries using `key` as a source, then as a target, each once
    pub fn touching(&self, key: &str) -> Vec<&'a NormalizedMapping> {
        let mut seen = HashSet::new();
        let sources = self.by_from_key.get(key).into_iter().flatten();
        let targets = self.by_to_key.get(key).into_iter().flatten();

        sources
            .chain(targets)
            .copied()
            .filter(|entry| seen.insert(entry.id))
            .collect()
    }

    /// True if `key` appears in any mapping
    pub fn is_mapped(&self, key: &str) -> bool {
        self.mapped_keys.contains(key)
    }
}

/// Builds reverse lookups for a list of normalized mappings
pub fn build_index(entries: &[NormalizedMapping]) -> MappingIndex<'_> {
    let mut index = MappingIndex::default();

    for entry in entries {
        index
            .by_from_key
            .entry(entry.from_key.clone())
            .or_default()
            .push(entry);
        index.mapped_keys.insert(entry.from_key.clone());

        // A key repeated across phases still lists the entry only once
        for key in entry.to_keys() {
            index
                .by_to_key
                .entry(key.to_string())
                .or_default()
                .push(entry);
            index.mapped_keys.insert(key.to_string());
        }
    }

    index
}
