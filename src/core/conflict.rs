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

//! Cross-rule conflict detection for complex modifications
//!
//! Two manipulators conflict when their from-events are equivalent and they
//! live in different rules. Equivalence is decided by [`ComboKey`]: the from
//! key plus the sorted mandatory and sorted optional modifiers, with the two
//! modifier lists kept as separate axes.
//!
//! Repeats inside one rule are never reported; rules commonly carry several
//! condition-gated variants of the same trigger.
//!
//! # Reporting
//! Only the first occurrence of each combo is remembered. Three rules
//! binding the same combo yield two conflicts (second vs first, third vs
//! first), not three. The second and third rule are not compared.
//!
//! # Performance
//! - Add rule: O(m) for m manipulators, HashMap lookup per manipulator
//! - Whole rule set: O(n) over all manipulators

use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

use crate::core::identity::ResolveKey;
use crate::core::types::{FromEvent, Rule};

/// Composite equivalence key of a from-event
///
/// Modifier order does not matter (`command+shift` == `shift+command`) but
/// `mandatory: [shift]` and `optional: [shift]` are different combos.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ComboKey {
    /// Resolved from key identity
    pub key: String,
    /// Mandatory modifiers, sorted
    pub mandatory: Vec<String>,
    /// Optional modifiers, sorted
    pub optional: Vec<String>,
}

impl ComboKey {
    /// Creates a combo with normalized (sorted) modifier lists
    pub fn new(key: &str, mut mandatory: Vec<String>, mut optional: Vec<String>) -> Self {
        mandatory.sort();
        optional.sort();

        Self {
            key: key.to_string(),
            mandatory,
            optional,
        }
    }

    /// Builds the combo of a from-event, or `None` when it has no key
    pub fn from_event(from: &FromEvent) -> Option<Self> {
        let key = from.resolve_key()?;
        Some(Self::new(
            key,
            from.mandatory_modifiers().to_vec(),
            from.optional_modifiers().to_vec(),
        ))
    }
}

impl fmt::Display for ComboKey {
    /// Mandatory modifiers and key, e.g. `caps_lock+h`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mandatory.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.mandatory.join("+"), self.key)
        }
    }
}

/// A from-combo mapped in two different rules
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleConflict {
    pub combo: ComboKey,
    /// 0-based index of the rule that used the combo first
    pub first_rule: usize,
    pub first_description: String,
    /// 0-based index of the rule that used it again
    pub rule: usize,
    pub description: String,
}

impl fmt::Display for RuleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conflict: \"{}\" is mapped in rule {} \"{}\" and rule {} \"{}\"",
            self.combo,
            self.first_rule + 1,
            self.first_description,
            self.rule + 1,
            self.description,
        )
    }
}

/// First rule that used a combo
#[derive(Clone, Debug)]
struct FirstUse {
    rule: usize,
    description: String,
}

/// Detects cross-rule conflicts while rules are fed in order.
///
/// Rules must be added in document order; the reported conflicts depend on
/// which rule claimed a combo first.
pub struct ConflictDetector {
    /// Maps each combo to the first rule that used it
    first_use: HashMap<ComboKey, FirstUse>,
    /// Conflicts in encounter order
    conflicts: Vec<RuleConflict>,
    /// Combos that have produced at least one conflict
    conflicting: HashSet<ComboKey>,
    manipulators: usize,
}

impl ConflictDetector {
    /// Creates a new empty conflict detector.
    pub fn new() -> Self {
        Self {
            first_use: HashMap::new(),
            conflicts: Vec::new(),
            conflicting: HashSet::new(),
            manipulators: 0,
        }
    }

    /// Adds every manipulator of a rule.
    ///
    /// `rule_index` is the rule's 0-based position in its rule set.
    pub fn add_rule(&mut self, rule_index: usize, rule: &Rule) {
        let description = rule.display_description();

        for manipulator in &rule.manipulators {
            self.manipulators += 1;

            let Some(combo) = manipulator.from.as_ref().and_then(ComboKey::from_event) else {
                continue;
            };

            match self.first_use.get(&combo) {
                Some(first) if first.rule != rule_index => {
                    self.conflicts.push(RuleConflict {
                        combo: combo.clone(),
                        first_rule: first.rule,
                        first_description: first.description.clone(),
                        rule: rule_index,
                        description: description.to_string(),
                    });
                    self.conflicting.insert(combo);
                }
                Some(_) => {}
                None => {
                    self.first_use.insert(
                        combo,
                        FirstUse {
                            rule: rule_index,
                            description: description.to_string(),
                        },
                    );
                }
            }
        }
    }

    /// All conflicts found so far, in encounter order.
    pub fn find_conflicts(&self) -> &[RuleConflict] {
        &self.conflicts
    }

    /// Checks if a specific combo has been reported as conflicting.
    pub fn has_conflict(&self, combo: &ComboKey) -> bool {
        self.conflicting.contains(combo)
    }

    /// Returns the total number of manipulators seen.
    pub fn total_manipulators(&self) -> usize {
        self.manipulators
    }

    /// Consumes the detector, returning its conflicts.
    pub fn into_conflicts(self) -> Vec<RuleConflict> {
        self.conflicts
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs conflict detection over a whole rule set
pub fn detect_rule_conflicts(rules: &[Rule]) -> Vec<RuleConflict> {
    let mut detector = ConflictDetector::new();
    for (rule_index, rule) in rules.iter().enumerate() {
        detector.add_rule(rule_index, rule);
    }

    debug!(
        rules = rules.len(),
        manipulators = detector.total_manipulators(),
        conflicts = detector.find_conflicts().len(),
        "Checked rules for conflicts"
    );

    detector.into_conflicts()
}

/// Human-readable conflict descriptions for a rule set
pub fn find_conflicts(rules: &[Rule]) -> Vec<String> {
    detect_rule_conflicts(rules)
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_sorts_modifiers() {
        let a = ComboKey::new(
            "k",
            vec!["shift".to_string(), "command".to_string()],
            vec![],
        );
        let b = ComboKey::new(
            "k",
            vec!["command".to_string(), "shift".to_string()],
            vec![],
        );
        assert_eq!(a, b);
        assert_eq!(a.mandatory, vec!["command".to_string(), "shift".to_string()]);
    }

    #[test]
    fn test_combo_keeps_modifier_axes_apart() {
        let mandatory = ComboKey::new("k", vec!["shift".to_string()], vec![]);
        let optional = ComboKey::new("k", vec![], vec!["shift".to_string()]);
        assert_ne!(mandatory, optional);
    }

    #[test]
    fn test_combo_display() {
        let bare = ComboKey::new("escape", vec![], vec!["any".to_string()]);
        assert_eq!(format!("{}", bare), "escape");

        let combo = ComboKey::new("h", vec!["caps_lock".to_string()], vec![]);
        assert_eq!(format!("{}", combo), "caps_lock+h");
    }

    #[test]
    fn test_combo_requires_key() {
        assert!(ComboKey::from_event(&FromEvent::default()).is_none());
        assert!(ComboKey::from_event(&FromEvent::key_code("a")).is_some());
    }

    #[test]
    fn test_empty_detector() {
        let detector = ConflictDetector::new();
        assert!(detector.find_conflicts().is_empty());
        assert_eq!(detector.total_manipulators(), 0);
    }
}
