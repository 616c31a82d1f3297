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

//! src/core/types.rs
//!
//! Document model for a keyboard remapping configuration
//!
//! The types mirror the JSON document one-to-one:
//! - `Configuration` → `profiles[]`
//! - `Profile` → `simple_modifications[]`, `fn_function_keys[]`,
//!   `devices[]`, `complex_modifications.rules[]`
//! - `Rule` → `manipulators[]` → `from`, `to*[]`, `conditions[]`
//!
//! Parsing is lenient: every field has a default and `null` reads as
//! absent, so a document with missing pieces still loads and the validator
//! reports what is wrong. Fields the model does not know about are kept in
//! `extra` maps.
//!
//! A `Configuration` built with [`Configuration::from_value`] also keeps
//! the JSON it was read from; export writes that back unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::core::identity::{KeyIdentity, ResolveKey};

/// Root of the document
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Configuration {
    /// Global settings; opaque to the engine
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub global: Value,

    /// Configuration variants, at least one required
    #[serde(default, deserialize_with = "null_as_default")]
    pub profiles: Vec<Profile>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// The JSON this document was read from
    #[serde(skip)]
    source: Option<Value>,
}

impl Configuration {
    /// Reads the typed view of `value` and keeps `value` itself for export.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut config: Configuration = serde_json::from_value(value.clone())?;
        config.source = Some(value);
        Ok(config)
    }

    /// The JSON this document was read from, if it was kept
    pub fn source(&self) -> Option<&Value> {
        self.source.as_ref()
    }
}

/// A named configuration variant
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,

    /// Profile-wide base remappings
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub simple_modifications: Vec<SimpleMapping>,

    /// Profile-wide Fn-row behaviour
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub fn_function_keys: Vec<SimpleMapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_modifications: Option<ComplexModifications>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Rules of the complex-modification set, or an empty slice
    pub fn rules(&self) -> &[Rule] {
        self.complex_modifications
            .as_ref()
            .map(|complex| complex.rules.as_slice())
            .unwrap_or(&[])
    }

    /// Devices of this profile, or an empty slice
    pub fn devices(&self) -> &[Device] {
        self.devices.as_deref().unwrap_or(&[])
    }

    /// Display name, with blank names shown as "Unnamed profile"
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => "Unnamed profile",
        }
    }
}

/// The complex-modification rule set of a profile
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ComplexModifications {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<Rule>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A physical keyboard (or mouse) with its own mappings
///
/// Device mappings are additive to the profile-wide ones.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Device {
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifiers: DeviceIdentifiers,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub simple_modifications: Vec<SimpleMapping>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub fn_function_keys: Vec<SimpleMapping>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    /// Human-readable device label, e.g. `Keyboard 1452:835`
    ///
    /// `position` is the 0-based index in the profile's device list and is
    /// used when the device carries no vendor/product IDs.
    pub fn label(&self, position: usize) -> String {
        let ids = &self.identifiers;
        let kind = match (ids.is_keyboard, ids.is_pointing_device) {
            (Some(true), Some(true)) => "Keyboard/Pointing device",
            (_, Some(true)) => "Pointing device",
            (Some(true), _) => "Keyboard",
            _ => "Device",
        };

        match (ids.vendor_id, ids.product_id) {
            (Some(vendor), Some(product)) => format!("{} {}:{}", kind, vendor, product),
            (Some(vendor), None) => format!("{} {}", kind, vendor),
            _ => format!("{} #{}", kind, position + 1),
        }
    }
}

/// Identification of a physical device
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DeviceIdentifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_keyboard: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pointing_device: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A simple or function-key mapping: one source, one or more targets
///
/// Both layers share this shape; which list a mapping lives in decides
/// whether it is a base remapping or Fn-row behaviour.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SimpleMapping {
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: FromEvent,

    #[serde(default, deserialize_with = "one_or_many")]
    pub to: Vec<ToEvent>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named group of manipulators; the unit of conflict comparison
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub manipulators: Vec<Manipulator>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    /// Description, with blank descriptions shown as "Unnamed rule"
    pub fn display_description(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => description,
            _ => "Unnamed rule",
        }
    }
}

/// Timing phase of a manipulator output
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// `to`: on key down
    Immediate,
    /// `to_if_alone`: pressed and released without another key
    IfAlone,
    /// `to_if_held_down`: held past the threshold
    IfHeldDown,
    /// `to_after_key_up`: on key release
    AfterKeyUp,
}

impl Phase {
    /// All phases in document order
    pub const ALL: [Phase; 4] = [
        Phase::Immediate,
        Phase::IfAlone,
        Phase::IfHeldDown,
        Phase::AfterKeyUp,
    ];

    /// JSON field holding this phase's events
    pub fn field_name(self) -> &'static str {
        match self {
            Phase::Immediate => "to",
            Phase::IfAlone => "to_if_alone",
            Phase::IfHeldDown => "to_if_held_down",
            Phase::AfterKeyUp => "to_after_key_up",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// The unit of complex remapping
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Manipulator {
    /// Operation type; `basic` in practice but kept open
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub manipulator_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<FromEvent>,

    #[serde(default, deserialize_with = "optional_one_or_many", skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<ToEvent>>,

    #[serde(default, deserialize_with = "optional_one_or_many", skip_serializing_if = "Option::is_none")]
    pub to_if_alone: Option<Vec<ToEvent>>,

    #[serde(default, deserialize_with = "optional_one_or_many", skip_serializing_if = "Option::is_none")]
    pub to_if_held_down: Option<Vec<ToEvent>>,

    #[serde(default, deserialize_with = "optional_one_or_many", skip_serializing_if = "Option::is_none")]
    pub to_after_key_up: Option<Vec<ToEvent>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manipulator {
    /// Events of one phase, or an empty slice
    pub fn phase(&self, phase: Phase) -> &[ToEvent] {
        let events = match phase {
            Phase::Immediate => &self.to,
            Phase::IfAlone => &self.to_if_alone,
            Phase::IfHeldDown => &self.to_if_held_down,
            Phase::AfterKeyUp => &self.to_after_key_up,
        };
        events.as_deref().unwrap_or(&[])
    }

    /// True when at least one phase produces an event
    pub fn has_output(&self) -> bool {
        Phase::ALL.into_iter().any(|phase| !self.phase(phase).is_empty())
    }

    /// Conditions, or an empty slice
    pub fn conditions(&self) -> &[Condition] {
        self.conditions.as_deref().unwrap_or(&[])
    }
}

/// Modifier requirements of a from-event
///
/// `mandatory` must be held; `optional` may be held and is passed through.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct FromModifiers {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub mandatory: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Source event of a mapping or manipulator
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct FromEvent {
    pub key: Option<KeyIdentity>,
    pub modifiers: Option<FromModifiers>,
    pub extra: Map<String, Value>,
}

impl FromEvent {
    /// Event for a bare key code
    pub fn key_code(name: &str) -> Self {
        Self {
            key: Some(KeyIdentity::KeyCode(name.to_string())),
            ..Self::default()
        }
    }

    /// Mandatory modifiers, or an empty slice
    pub fn mandatory_modifiers(&self) -> &[String] {
        self.modifiers
            .as_ref()
            .map(|modifiers| modifiers.mandatory.as_slice())
            .unwrap_or(&[])
    }

    /// Optional modifiers, or an empty slice
    pub fn optional_modifiers(&self) -> &[String] {
        self.modifiers
            .as_ref()
            .map(|modifiers| modifiers.optional.as_slice())
            .unwrap_or(&[])
    }
}

impl ResolveKey for FromEvent {
    fn key_identity(&self) -> Option<&KeyIdentity> {
        self.key.as_ref()
    }
}

impl From<Map<String, Value>> for FromEvent {
    fn from(mut fields: Map<String, Value>) -> Self {
        let key = KeyIdentity::take_from(&mut fields);

        // Unparseable modifier blocks are left in `extra` untouched
        let modifiers = match fields.remove("modifiers") {
            Some(raw) => match serde_json::from_value::<FromModifiers>(raw.clone()) {
                Ok(modifiers) => Some(modifiers),
                Err(_) => {
                    fields.insert("modifiers".to_string(), raw);
                    None
                }
            },
            None => None,
        };

        Self {
            key,
            modifiers,
            extra: fields,
        }
    }
}

impl From<FromEvent> for Map<String, Value> {
    fn from(event: FromEvent) -> Self {
        let mut fields = Map::new();
        if let Some(key) = &event.key {
            key.put_into(&mut fields);
        }
        if let Some(modifiers) = event.modifiers {
            if let Ok(value) = serde_json::to_value(modifiers) {
                fields.insert("modifiers".to_string(), value);
            }
        }
        fields.extend(event.extra);
        fields
    }
}

/// What a to-event does
#[derive(Clone, Debug, PartialEq)]
pub enum ToAction {
    /// Post a key
    Key(KeyIdentity),
    /// Run a shell command
    ShellCommand(String),
    /// Set a manipulator variable
    SetVariable { name: String, value: Value },
    /// Switch input source
    SelectInputSource(Value),
    /// Move the pointer or scroll
    MouseKey(Value),
}

impl ToAction {
    fn take_from(fields: &mut Map<String, Value>) -> Option<ToAction> {
        if let Some(key) = KeyIdentity::take_from(fields) {
            return Some(ToAction::Key(key));
        }

        if let Some(Value::String(command)) = fields.get("shell_command") {
            let command = command.clone();
            fields.remove("shell_command");
            return Some(ToAction::ShellCommand(command));
        }

        if let Some(Value::Object(variable)) = fields.get("set_variable") {
            if let Some(Value::String(name)) = variable.get("name") {
                let action = ToAction::SetVariable {
                    name: name.clone(),
                    value: variable.get("value").cloned().unwrap_or(Value::Null),
                };
                fields.remove("set_variable");
                return Some(action);
            }
        }

        if let Some(source) = fields.remove("select_input_source") {
            return Some(ToAction::SelectInputSource(source));
        }

        fields.remove("mouse_key").map(ToAction::MouseKey)
    }

    fn put_into(&self, fields: &mut Map<String, Value>) {
        match self {
            ToAction::Key(key) => key.put_into(fields),
            ToAction::ShellCommand(command) => {
                fields.insert("shell_command".to_string(), Value::String(command.clone()));
            }
            ToAction::SetVariable { name, value } => {
                let mut variable = Map::new();
                variable.insert("name".to_string(), Value::String(name.clone()));
                variable.insert("value".to_string(), value.clone());
                fields.insert("set_variable".to_string(), Value::Object(variable));
            }
            ToAction::SelectInputSource(source) => {
                fields.insert("select_input_source".to_string(), source.clone());
            }
            ToAction::MouseKey(movement) => {
                fields.insert("mouse_key".to_string(), movement.clone());
            }
        }
    }
}

/// Target event of a mapping or manipulator phase
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ToEvent {
    pub action: Option<ToAction>,
    /// Modifiers posted together with the key
    pub modifiers: Vec<String>,
    pub extra: Map<String, Value>,
}

impl ToEvent {
    /// Event posting a bare key code
    pub fn key_code(name: &str) -> Self {
        Self {
            action: Some(ToAction::Key(KeyIdentity::KeyCode(name.to_string()))),
            ..Self::default()
        }
    }
}

impl ResolveKey for ToEvent {
    fn key_identity(&self) -> Option<&KeyIdentity> {
        match &self.action {
            Some(ToAction::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for ToEvent {
    fn from(mut fields: Map<String, Value>) -> Self {
        let action = ToAction::take_from(&mut fields);

        let modifiers = match fields.remove("modifiers") {
            Some(Value::String(modifier)) => vec![modifier],
            Some(raw) => match serde_json::from_value::<Vec<String>>(raw.clone()) {
                Ok(modifiers) => modifiers,
                Err(_) => {
                    fields.insert("modifiers".to_string(), raw);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Self {
            action,
            modifiers,
            extra: fields,
        }
    }
}

impl From<ToEvent> for Map<String, Value> {
    fn from(event: ToEvent) -> Self {
        let mut fields = Map::new();
        if let Some(action) = &event.action {
            action.put_into(&mut fields);
        }
        if !event.modifiers.is_empty() {
            let modifiers = event.modifiers.into_iter().map(Value::String).collect();
            fields.insert("modifiers".to_string(), Value::Array(modifiers));
        }
        fields.extend(event.extra);
        fields
    }
}

/// Predicate family of a condition
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConditionKind {
    FrontmostApplication,
    InputSource,
    Device,
    KeyboardType,
    Variable,
}

/// A typed predicate restricting when a manipulator applies
///
/// Each kind reads a different subset of `fields`; the engine itself only
/// requires `type` to be present.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Condition {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub condition_type: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Condition {
    /// Predicate family, or `None` for blank or unknown types
    pub fn kind(&self) -> Option<ConditionKind> {
        let base = self
            .condition_type
            .strip_suffix("_if")
            .or_else(|| self.condition_type.strip_suffix("_unless"))?;

        match base {
            "frontmost_application" => Some(ConditionKind::FrontmostApplication),
            "input_source" => Some(ConditionKind::InputSource),
            "device" => Some(ConditionKind::Device),
            "keyboard_type" => Some(ConditionKind::KeyboardType),
            "variable" => Some(ConditionKind::Variable),
            _ => None,
        }
    }

    /// True for `*_unless` conditions
    pub fn is_negated(&self) -> bool {
        self.condition_type.ends_with("_unless")
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.condition_type)?;

        if self.kind() == Some(ConditionKind::Variable) {
            if let (Some(Value::String(name)), Some(value)) =
                (self.fields.get("name"), self.fields.get("value"))
            {
                write!(f, " {} = {}", name, value)?;
            }
        }

        Ok(())
    }
}

/// Shapes accepted where a list of to-events is expected
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ToEvent>),
    One(ToEvent),
    Nothing(()),
}

impl From<OneOrMany> for Vec<ToEvent> {
    fn from(shape: OneOrMany) -> Self {
        match shape {
            OneOrMany::Many(events) => events,
            OneOrMany::One(event) => vec![event],
            OneOrMany::Nothing(()) => Vec::new(),
        }
    }
}

/// Reads `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<ToEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    OneOrMany::deserialize(deserializer).map(Vec::from)
}

fn optional_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<ToEvent>>, D::Error>
where
    D: Deserializer<'de>,
{
    one_or_many(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_event_folds_identity() {
        let event: FromEvent = serde_json::from_value(json!({
            "key_code": "h",
            "modifiers": { "mandatory": ["caps_lock"] }
        }))
        .unwrap();

        assert_eq!(event.resolve_key(), Some("h"));
        assert_eq!(event.mandatory_modifiers(), ["caps_lock".to_string()]);
        assert!(event.optional_modifiers().is_empty());
        assert!(event.extra.is_empty());
    }

    #[test]
    fn test_from_event_round_trip_keeps_unknown_fields() {
        let original = json!({
            "pointing_button": "button4",
            "simultaneous": [{ "key_code": "j" }]
        });
        let event: FromEvent = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(event.resolve_key(), Some("button4"));

        let exported = serde_json::to_value(&event).unwrap();
        assert_eq!(exported, original);
    }

    #[test]
    fn test_to_event_shell_command() {
        let event: ToEvent =
            serde_json::from_value(json!({ "shell_command": "open -a Terminal" })).unwrap();

        assert_eq!(event.resolve_key(), None);
        assert_eq!(
            event.action,
            Some(ToAction::ShellCommand("open -a Terminal".to_string()))
        );
    }

    #[test]
    fn test_to_event_set_variable() {
        let event: ToEvent = serde_json::from_value(json!({
            "set_variable": { "name": "hyper", "value": 1 }
        }))
        .unwrap();

        assert_eq!(
            event.action,
            Some(ToAction::SetVariable {
                name: "hyper".to_string(),
                value: json!(1),
            })
        );
    }

    #[test]
    fn test_to_event_single_modifier_string() {
        let event: ToEvent =
            serde_json::from_value(json!({ "key_code": "tab", "modifiers": "command" })).unwrap();
        assert_eq!(event.modifiers, vec!["command".to_string()]);
    }

    #[test]
    fn test_simple_mapping_accepts_single_to_object() {
        let mapping: SimpleMapping = serde_json::from_value(json!({
            "from": { "key_code": "caps_lock" },
            "to": { "key_code": "escape" }
        }))
        .unwrap();

        assert_eq!(mapping.to.len(), 1);
        assert_eq!(mapping.to[0].resolve_key(), Some("escape"));
    }

    #[test]
    fn test_lenient_parse_of_empty_document() {
        let config: Configuration = serde_json::from_value(json!({})).unwrap();
        assert!(config.profiles.is_empty());

        let config: Configuration =
            serde_json::from_value(json!({ "global": "garbage", "profiles": [] })).unwrap();
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Default",
            "simple_modifications": [{ "from": null, "to": null }],
            "fn_function_keys": null,
            "complex_modifications": {
                "parameters": null,
                "rules": [{
                    "manipulators": [{
                        "from": { "key_code": "a", "modifiers": { "mandatory": null } },
                        "conditions": [{ "type": null }]
                    }]
                }]
            },
            "devices": [{ "identifiers": null, "simple_modifications": null }]
        }))
        .unwrap();

        assert_eq!(profile.simple_modifications[0].from, FromEvent::default());
        assert!(profile.simple_modifications[0].to.is_empty());
        assert!(profile.fn_function_keys.is_empty());
        assert!(profile.devices()[0].simple_modifications.is_empty());

        let manipulator = &profile.rules()[0].manipulators[0];
        assert!(manipulator.from.as_ref().unwrap().mandatory_modifiers().is_empty());
        assert_eq!(manipulator.conditions()[0].condition_type, "");
    }

    #[test]
    fn test_from_modifiers_keep_unknown_fields() {
        let original = json!({
            "key_code": "a",
            "modifiers": { "optional": ["any"], "strict": true }
        });
        let event: FromEvent = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(event.optional_modifiers(), ["any".to_string()]);

        assert_eq!(serde_json::to_value(&event).unwrap(), original);
    }

    #[test]
    fn test_from_value_keeps_source() {
        let source = json!({ "profiles": [{ "name": "Default" }], "title": "mine" });
        let config = Configuration::from_value(source.clone()).unwrap();

        assert_eq!(config.source(), Some(&source));
        assert_eq!(config.extra.get("title"), Some(&json!("mine")));
        assert_eq!(Configuration::default().source(), None);
    }

    #[test]
    fn test_manipulator_phase_access() {
        let manipulator: Manipulator = serde_json::from_value(json!({
            "type": "basic",
            "from": { "key_code": "caps_lock" },
            "to_if_alone": [{ "key_code": "escape" }]
        }))
        .unwrap();

        assert!(manipulator.phase(Phase::Immediate).is_empty());
        assert_eq!(manipulator.phase(Phase::IfAlone).len(), 1);
        assert!(manipulator.has_output());
        assert!(manipulator.conditions().is_empty());
    }

    #[test]
    fn test_condition_kind() {
        let condition: Condition = serde_json::from_value(json!({
            "type": "frontmost_application_unless",
            "bundle_identifiers": ["^com\\.apple\\.Terminal$"]
        }))
        .unwrap();

        assert_eq!(condition.kind(), Some(ConditionKind::FrontmostApplication));
        assert!(condition.is_negated());

        let blank = Condition::default();
        assert_eq!(blank.kind(), None);
    }

    #[test]
    fn test_condition_display_variable() {
        let condition: Condition = serde_json::from_value(json!({
            "type": "variable_if",
            "name": "caps_mode",
            "value": 1
        }))
        .unwrap();

        assert_eq!(format!("{}", condition), "variable_if caps_mode = 1");
    }

    #[test]
    fn test_device_label() {
        let mut device = Device::default();
        assert_eq!(device.label(0), "Device #1");

        device.identifiers.is_keyboard = Some(true);
        device.identifiers.vendor_id = Some(1452);
        device.identifiers.product_id = Some(835);
        assert_eq!(device.label(3), "Keyboard 1452:835");
    }

    #[test]
    fn test_display_fallbacks() {
        let rule = Rule {
            description: Some("   ".to_string()),
            ..Rule::default()
        };
        assert_eq!(rule.display_description(), "Unnamed rule");
        assert_eq!(Profile::default().display_name(), "Unnamed profile");
    }
}
