use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::{create_test_document, VALID_DOCUMENT};
use crate::config::{parse_document, render_document, DocumentError, DocumentManager};
use crate::core::validate;

#[test]
fn test_new_with_missing_document() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nonexistent.json");

    let result = DocumentManager::new(path.to_str().unwrap());

    match result.unwrap_err() {
        DocumentError::NotFound(missing) => assert_eq!(missing, path),
        other => panic!("Expected NotFound error, got: {:?}", other),
    }
}

#[test]
fn test_load_valid_document() {
    let (_temp_dir, path) = create_test_document(VALID_DOCUMENT);
    let manager = DocumentManager::new(path.to_str().unwrap()).unwrap();

    assert_eq!(manager.path(), path.as_path());

    let config = manager.load().unwrap();
    assert_eq!(config.profiles.len(), 1);
    assert_eq!(config.profiles[0].name.as_deref(), Some("Default"));
    assert!(validate(&config).is_empty());
}

#[test]
fn test_load_malformed_json() {
    let (_temp_dir, path) = create_test_document("{ \"profiles\": [ ");
    let manager = DocumentManager::new(path.to_str().unwrap()).unwrap();

    assert!(matches!(manager.load(), Err(DocumentError::Parse { .. })));
}

#[test]
fn test_load_tolerates_schema_problems() {
    // Wrong shapes are the validator's business, not the loader's
    let (_temp_dir, path) =
        create_test_document(r#"{ "profiles": [ { "simple_modifications": [ { "to": [] } ] } ] }"#);
    let manager = DocumentManager::new(path.to_str().unwrap()).unwrap();

    let config = manager.load().unwrap();
    let report = validate(&config);
    assert_eq!(report.issues.len(), 2);
    assert!(!report.is_exportable());
}

#[test]
fn test_render_round_trip_is_verbatim() {
    let config = parse_document(VALID_DOCUMENT).unwrap();
    let rendered = render_document(&config).unwrap();

    assert_eq!(rendered, VALID_DOCUMENT);
}

#[test]
fn test_render_keeps_unknown_fields() {
    let text = r#"{
  "profiles": [
    {
      "name": "Default",
      "complex_modifications": {
        "parameters": {
          "basic.to_if_alone_timeout_milliseconds": 200
        },
        "rules": [
          {
            "description": "Hyper",
            "enabled": false,
            "manipulators": [
              {
                "type": "basic",
                "from": {
                  "key_code": "right_command",
                  "modifiers": {
                    "optional": [
                      "any"
                    ]
                  }
                },
                "to": [
                  {
                    "key_code": "left_shift",
                    "modifiers": [
                      "left_command"
                    ],
                    "lazy": true
                  }
                ],
                "parameters": {
                  "basic.to_if_held_down_threshold_milliseconds": 100
                }
              }
            ]
          }
        ]
      }
    }
  ]
}
"#;

    let config = parse_document(text).unwrap();
    let rendered = render_document(&config).unwrap();

    let before: serde_json::Value = serde_json::from_str(text).unwrap();
    let after: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_render_keeps_alphabetical_key_order() {
    let text = r#"{
  "global": {
    "check_for_updates_on_startup": true
  },
  "profiles": [
    {
      "complex_modifications": {
        "parameters": {
          "basic.simultaneous_threshold_milliseconds": 50
        },
        "rules": [
          {
            "description": "Caps to escape",
            "manipulators": [
              {
                "from": {
                  "key_code": "caps_lock",
                  "modifiers": {
                    "mandatory": [],
                    "optional": [
                      "any"
                    ]
                  }
                },
                "to": [
                  {
                    "key_code": "escape"
                  }
                ],
                "type": "basic"
              }
            ]
          }
        ]
      },
      "name": "Default",
      "selected": true,
      "virtual_hid_keyboard": {
        "country_code": 0
      }
    }
  ]
}
"#;

    let config = parse_document(text).unwrap();
    assert!(validate(&config).is_empty());

    let rendered = render_document(&config).unwrap();
    assert_eq!(rendered, text);
}

#[test]
fn test_load_tolerates_null_fields() {
    let text = r#"{
  "profiles": [
    {
      "name": "Default",
      "simple_modifications": [
        {
          "from": null,
          "to": []
        }
      ],
      "fn_function_keys": null,
      "complex_modifications": {
        "rules": [
          {
            "description": "Gated",
            "manipulators": [
              {
                "from": {
                  "key_code": "a"
                },
                "to": [
                  {
                    "key_code": "b"
                  }
                ],
                "conditions": [
                  {
                    "type": null
                  }
                ]
              }
            ]
          }
        ]
      }
    }
  ]
}
"#;

    let (_temp_dir, path) = create_test_document(text);
    let config = DocumentManager::new(path.to_str().unwrap())
        .unwrap()
        .load()
        .unwrap();

    let paths: Vec<String> = validate(&config)
        .issues
        .into_iter()
        .map(|issue| issue.path)
        .collect();
    assert_eq!(
        paths,
        vec![
            "profiles[0].simple_modifications[0].from".to_string(),
            "profiles[0].complex_modifications.rules[0].manipulators[0].conditions[0].type"
                .to_string(),
        ]
    );

    assert_eq!(render_document(&config).unwrap(), text);
}

#[test]
fn test_render_without_source_uses_typed_model() {
    let config: crate::core::Configuration =
        serde_json::from_str(r#"{ "profiles": [ { "name": "Built" } ] }"#).unwrap();
    assert!(config.source().is_none());

    let rendered = render_document(&config).unwrap();
    assert_eq!(rendered, "{\n  \"profiles\": [\n    {\n      \"name\": \"Built\"\n    }\n  ]\n}\n");
}
