//! Conversions between settings trees and `serde_json` values.
//!
//! Descriptions have no JSON representation and are dropped on the way out.

use crate::value::{Node, Value};

/// Convert a node tree to `serde_json::Value`.
///
/// Non-finite floats become `null`, as JSON cannot carry them.
pub fn node_to_json(node: &Node) -> serde_json::Value {
    value_to_json(&node.value)
}

/// Convert a value tree to `serde_json::Value`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(node_to_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), node_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert `serde_json::Value` to an undescribed node tree.
pub fn json_to_node(json: serde_json::Value) -> Node {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for numbers outside f64
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(json_to_node).collect())
        }
        serde_json::Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, json_to_node(v)))
                .collect(),
        ),
    };
    Node::new(value)
}

/// Pretty-printed JSON text for a node tree.
pub fn to_json_string_pretty(node: &Node) -> String {
    // Serializing a serde_json::Value to a String cannot fail
    serde_json::to_string_pretty(&node_to_json(node)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, path};

    #[test]
    fn parsed_document_matches_serde_json() {
        let commented = r#"{
            // name
            "name": "sphere",
            /* radius */ "radius": 2.25,
            "count": 32,
            "flags": [true, false, null],
            "nested": { "deep": { "list": [1, 2.5, "x", {"k": -1}] } }
        }"#;
        let plain = r#"{
            "name": "sphere",
            "radius": 2.25,
            "count": 32,
            "flags": [true, false, null],
            "nested": { "deep": { "list": [1, 2.5, "x", {"k": -1}] } }
        }"#;

        let ours = node_to_json(&parse(commented).unwrap());
        let theirs: serde_json::Value = serde_json::from_str(plain).unwrap();
        assert_eq!(ours, theirs);
    }

    #[test]
    fn json_to_node_numbers() {
        let node = json_to_node(serde_json::json!({"i": 42, "f": 2.75, "neg": -100}));
        assert_eq!(node.get(&path!(".i")).unwrap().value, Value::Integer(42));
        assert_eq!(node.get(&path!(".f")).unwrap().value, Value::Float(2.75));
        assert_eq!(node.get(&path!(".neg")).unwrap().value, Value::Integer(-100));
    }

    #[test]
    fn json_roundtrip_through_node() {
        let json = serde_json::json!({"a": [1, "two", 3.5], "b": {"c": null}});
        assert_eq!(node_to_json(&json_to_node(json.clone())), json);
    }

    #[test]
    fn nan_becomes_null() {
        assert_eq!(
            value_to_json(&Value::Float(f64::NAN)),
            serde_json::Value::Null
        );
    }

    #[test]
    fn pretty_string_is_valid_json() {
        let node = parse(r#"{"a": {"b": [1, 2]}}"#).unwrap();
        let text = to_json_string_pretty(&node);
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, serde_json::json!({"a": {"b": [1, 2]}}));
    }
}
