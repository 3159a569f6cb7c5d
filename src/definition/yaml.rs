//! Bridge from `serde_yaml` values to the JSON object graph used downstream.
//!
//! YAML allows non-string mapping keys (`200:` under `responses`), which a
//! direct `serde_yaml::from_str::<serde_json::Value>` rejects. Keys are
//! stringified here instead; null and composite keys are dropped.

use serde_json::{Map, Number, Value as JsonValue};
use serde_yaml::Value as YamlValue;

pub(crate) fn yaml_to_json(value: YamlValue) -> JsonValue {
    match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null)
            }
        }
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(items) => {
            JsonValue::Array(items.into_iter().map(yaml_to_json).collect())
        }
        YamlValue::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                if let Some(key) = scalar_key(&key) {
                    object.insert(key, yaml_to_json(value));
                }
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn scalar_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// True when the value is a non-empty mapping whose keys, at every depth, are
/// non-null scalars. Bare scalars and mappings with null keys do not count as
/// a structured document.
pub(crate) fn is_structured(value: &YamlValue) -> bool {
    match value {
        YamlValue::Mapping(mapping) => !mapping.is_empty() && keys_are_scalar(value),
        _ => false,
    }
}

fn keys_are_scalar(value: &YamlValue) -> bool {
    match value {
        YamlValue::Mapping(mapping) => mapping
            .iter()
            .all(|(key, value)| scalar_key(key).is_some() && keys_are_scalar(value)),
        YamlValue::Sequence(items) => items.iter().all(keys_are_scalar),
        YamlValue::Tagged(tagged) => keys_are_scalar(&tagged.value),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_keys_become_strings() {
        let yaml: YamlValue = serde_yaml::from_str("responses:\n  200:\n    description: ok\n").unwrap();
        assert_eq!(
            yaml_to_json(yaml),
            json!({"responses": {"200": {"description": "ok"}}})
        );
    }

    #[test]
    fn test_document_order_is_kept() {
        let yaml: YamlValue = serde_yaml::from_str("b: 1\na: 2\nc: 3\n").unwrap();
        let json = yaml_to_json(yaml);
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_structured_document() {
        let mapping: YamlValue = serde_yaml::from_str("title: x\nitems: [1, 2]\n").unwrap();
        assert!(is_structured(&mapping));

        let scalar: YamlValue = serde_yaml::from_str("just some words").unwrap();
        assert!(!is_structured(&scalar));

        let null_key: YamlValue = serde_yaml::from_str("a:\n  ~: b\n").unwrap();
        assert!(!is_structured(&null_key));
    }
}
