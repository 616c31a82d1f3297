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

//! src/core/identity.rs
//!
//! Key identity resolution
//!
//! A key event names its key with exactly one of three JSON fields:
//! - `key_code` (regular keyboard keys, e.g. `caps_lock`)
//! - `consumer_key_code` (media keys, e.g. `volume_increment`)
//! - `pointing_button` (mouse buttons, e.g. `button1`)
//!
//! The fields are folded into a single [`KeyIdentity`] when a document is
//! parsed. When malformed input sets more than one of them, the first in the
//! order above wins. Every comparison in the engine (duplicates, conflicts,
//! normalisation) goes through [`ResolveKey`], so that order is applied in
//! exactly one place.

use serde_json::{Map, Value};
use std::fmt;

/// JSON field names in resolution priority order
pub const KEY_CODE: &str = "key_code";
pub const CONSUMER_KEY_CODE: &str = "consumer_key_code";
pub const POINTING_BUTTON: &str = "pointing_button";

/// The canonical identity of a key event
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum KeyIdentity {
    /// Regular keyboard key
    KeyCode(String),
    /// Media/consumer key
    ConsumerKeyCode(String),
    /// Mouse button
    PointingButton(String),
}

impl KeyIdentity {
    /// The bare key name, without the field it came from
    pub fn as_str(&self) -> &str {
        match self {
            KeyIdentity::KeyCode(name)
            | KeyIdentity::ConsumerKeyCode(name)
            | KeyIdentity::PointingButton(name) => name,
        }
    }

    /// JSON field this identity is stored under
    pub fn field_name(&self) -> &'static str {
        match self {
            KeyIdentity::KeyCode(_) => KEY_CODE,
            KeyIdentity::ConsumerKeyCode(_) => CONSUMER_KEY_CODE,
            KeyIdentity::PointingButton(_) => POINTING_BUTTON,
        }
    }

    /// Extracts the identity fields from a JSON object.
    ///
    /// All three fields are removed from `fields`. The winning one becomes
    /// the identity; any shadowed ones are put back so they survive export.
    /// Empty strings and non-string values count as unset and are also put
    /// back untouched.
    pub(crate) fn take_from(fields: &mut Map<String, Value>) -> Option<KeyIdentity> {
        let mut identity = None;
        let mut leftovers = Vec::new();

        for field in [KEY_CODE, CONSUMER_KEY_CODE, POINTING_BUTTON] {
            let Some(value) = fields.remove(field) else {
                continue;
            };

            let usable = identity.is_none() && value.as_str().is_some_and(|name| !name.is_empty());
            match value {
                Value::String(name) if usable => identity = Some(Self::from_field(field, name)),
                value => leftovers.push((field, value)),
            }
        }

        for (field, value) in leftovers {
            fields.insert(field.to_string(), value);
        }

        identity
    }

    /// Writes the identity back under its own field name
    pub(crate) fn put_into(&self, fields: &mut Map<String, Value>) {
        fields.insert(
            self.field_name().to_string(),
            Value::String(self.as_str().to_string()),
        );
    }

    fn from_field(field: &str, name: String) -> KeyIdentity {
        match field {
            CONSUMER_KEY_CODE => KeyIdentity::ConsumerKeyCode(name),
            POINTING_BUTTON => KeyIdentity::PointingButton(name),
            _ => KeyIdentity::KeyCode(name),
        }
    }
}

impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Anything that may carry a key identity (from-events, to-events).
pub trait ResolveKey {
    /// The folded identity, if any was set
    fn key_identity(&self) -> Option<&KeyIdentity>;

    /// Canonical string identity used for every comparison in the engine
    fn resolve_key(&self) -> Option<&str> {
        self.key_identity().map(KeyIdentity::as_str)
    }
}

impl<T: ResolveKey> ResolveKey for Option<T> {
    fn key_identity(&self) -> Option<&KeyIdentity> {
        self.as_ref().and_then(ResolveKey::key_identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_key_code_takes_priority() {
        let mut fields = object(json!({
            "pointing_button": "button1",
            "consumer_key_code": "mute",
            "key_code": "a",
        }));

        let identity = KeyIdentity::take_from(&mut fields);
        assert_eq!(identity, Some(KeyIdentity::KeyCode("a".to_string())));

        // Shadowed fields are kept for export
        assert_eq!(fields.get("consumer_key_code"), Some(&json!("mute")));
        assert_eq!(fields.get("pointing_button"), Some(&json!("button1")));
        assert!(fields.get("key_code").is_none());
    }

    #[test]
    fn test_consumer_key_before_pointing_button() {
        let mut fields = object(json!({
            "pointing_button": "button2",
            "consumer_key_code": "play_or_pause",
        }));

        let identity = KeyIdentity::take_from(&mut fields);
        assert_eq!(
            identity,
            Some(KeyIdentity::ConsumerKeyCode("play_or_pause".to_string()))
        );
    }

    #[test]
    fn test_empty_key_code_falls_through() {
        let mut fields = object(json!({ "key_code": "", "pointing_button": "button3" }));

        let identity = KeyIdentity::take_from(&mut fields);
        assert_eq!(identity, Some(KeyIdentity::PointingButton("button3".to_string())));
        assert_eq!(fields.get("key_code"), Some(&json!("")));
    }

    #[test]
    fn test_no_identity() {
        let mut fields = object(json!({ "modifiers": ["shift"] }));
        assert_eq!(KeyIdentity::take_from(&mut fields), None);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_display_is_bare_name() {
        let identity = KeyIdentity::ConsumerKeyCode("mute".to_string());
        assert_eq!(format!("{}", identity), "mute");
        assert_eq!(identity.field_name(), "consumer_key_code");
    }
}
