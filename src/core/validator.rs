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

//! Structural validation of a configuration document
//!
//! Walks the whole document and reports every structural defect as data.
//! Nothing here returns an error or panics: a fully valid document simply
//! produces an empty report.
//!
//! # Traversal order
//! Profiles in array order, then within each profile:
//! 1. name
//! 2. simple mappings
//! 3. complex-modification rules: description, then each manipulator's
//!    `from`, output presence and conditions
//!
//! The report lists issues in exactly this order.
//!
//! # Severity
//! - **Error**: the document must not be exported
//! - **Warning**: probably a mistake, export is still allowed

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::core::identity::ResolveKey;
use crate::core::types::{Configuration, Manipulator, Profile, Rule};

/// How serious a validation issue is
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks export
    Error,
    /// Advisory only
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single structural defect
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Location in the document, e.g. `profiles[0].simple_modifications[2].from`
    pub path: String,
    /// Human-readable description
    pub message: String,
    pub severity: Severity,
}

/// Ordered result of validating a document
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ValidationReport {
    /// All issues in traversal order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the report contains any Error-level issues
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    /// Export is allowed unless there is at least one error
    pub fn is_exportable(&self) -> bool {
        !self.has_errors()
    }

    /// Number of issues with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Adds an Error-level issue to the report
    pub fn add_error(&mut self, path: String, message: impl Into<String>) {
        self.push(path, message.into(), Severity::Error);
    }

    /// Adds a Warning-level issue to the report
    pub fn add_warning(&mut self, path: String, message: impl Into<String>) {
        self.push(path, message.into(), Severity::Warning);
    }

    fn push(&mut self, path: String, message: String, severity: Severity) {
        self.issues.push(ValidationIssue {
            path,
            message,
            severity,
        });
    }
}

fn is_blank(text: Option<&str>) -> bool {
    text.map_or(true, |text| text.trim().is_empty())
}

/// Validates a complete document
///
/// # Example
/// ```
/// use remap_doctor::core::{validate, Configuration};
///
/// let report = validate(&Configuration::default());
/// assert!(report.has_errors()); // no profiles
/// assert_eq!(report.issues.len(), 1);
/// ```
pub fn validate(config: &Configuration) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.profiles.is_empty() {
        report.add_error("profiles".to_string(), "At least one profile is required");
        return report;
    }

    for (profile_index, profile) in config.profiles.iter().enumerate() {
        validate_profile(&mut report, profile_index, profile);
    }

    debug!(
        errors = report.count(Severity::Error),
        warnings = report.count(Severity::Warning),
        "Validated document"
    );

    report
}

fn validate_profile(report: &mut ValidationReport, profile_index: usize, profile: &Profile) {
    let base = format!("profiles[{}]", profile_index);

    if is_blank(profile.name.as_deref()) {
        report.add_error(format!("{}.name", base), "Profile name is required");
    }

    for (mapping_index, mapping) in profile.simple_modifications.iter().enumerate() {
        if mapping.from.resolve_key().is_none() {
            report.add_error(
                format!("{}.simple_modifications[{}].from", base, mapping_index),
                "Simple modification is missing a from key",
            );
        }
    }

    for (rule_index, rule) in profile.rules().iter().enumerate() {
        let rule_path = format!("{}.complex_modifications.rules[{}]", base, rule_index);
        validate_rule(report, &rule_path, rule);
    }
}

fn validate_rule(report: &mut ValidationReport, rule_path: &str, rule: &Rule) {
    if is_blank(rule.description.as_deref()) {
        report.add_warning(
            format!("{}.description", rule_path),
            "Rule description is empty",
        );
    }

    if rule.manipulators.is_empty() {
        report.add_error(
            format!("{}.manipulators", rule_path),
            "Rule has no manipulators",
        );
    }

    for (manipulator_index, manipulator) in rule.manipulators.iter().enumerate() {
        let path = format!("{}.manipulators[{}]", rule_path, manipulator_index);
        validate_manipulator(report, &path, manipulator);
    }
}

fn validate_manipulator(report: &mut ValidationReport, path: &str, manipulator: &Manipulator) {
    match &manipulator.from {
        None => report.add_error(
            format!("{}.from", path),
            "Manipulator is missing a from event",
        ),
        Some(from) if from.resolve_key().is_none() => report.add_error(
            format!("{}.from", path),
            "Manipulator from event is missing a key_code, consumer_key_code or pointing_button",
        ),
        Some(_) => {}
    }

    if !manipulator.has_output() {
        report.add_warning(
            format!("{}.to", path),
            "Manipulator has no to, to_if_alone, to_if_held_down or to_after_key_up events",
        );
    }

    for (condition_index, condition) in manipulator.conditions().iter().enumerate() {
        if condition.condition_type.is_empty() {
            report.add_error(
                format!("{}.conditions[{}].type", path, condition_index),
                "Condition is missing a type",
            );
        }
    }
}
