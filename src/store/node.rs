//! Decoded document nodes.
//!
//! Decoders disagree on map key types: JSON and TOML hand back string-keyed
//! tables, YAML hands back mappings keyed by arbitrary scalars. [`Node`] keeps
//! both shapes so ingestion can normalize keys at one boundary.

use serde_json::{Map, Number, Value};

/// One node of a decoded configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Null, boolean, number or string.
    Scalar(Value),
    List(Vec<Node>),
    /// Map whose keys are already strings.
    Table(Vec<(String, Node)>),
    /// Map whose keys are arbitrary scalars.
    AnyTable(Vec<(Value, Node)>),
}

impl Node {
    pub fn is_map(&self) -> bool {
        matches!(self, Node::Table(_) | Node::AnyTable(_))
    }

    /// Children of a map node with their keys stringified, or `None` for
    /// scalars and lists.
    pub fn into_entries(self) -> Option<Vec<(String, Node)>> {
        match self {
            Node::Table(entries) => Some(entries),
            Node::AnyTable(entries) => Some(
                entries
                    .into_iter()
                    .map(|(key, node)| (key_string(&key), node))
                    .collect(),
            ),
            Node::Scalar(_) | Node::List(_) => None,
        }
    }

    /// Collapse the node into a plain value with string keys throughout.
    pub fn into_value(self) -> Value {
        match self {
            Node::Scalar(value) => value,
            Node::List(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
            node @ (Node::Table(_) | Node::AnyTable(_)) => {
                let map: Map<String, Value> = node
                    .into_entries()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(key, child)| (key, child.into_value()))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

/// Canonical string form of a map key.
///
/// Strings are taken verbatim, numbers and booleans use their display form,
/// null becomes `null` and composite keys become compact JSON.
pub fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        composite => composite.to_string(),
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(f.to_string()))
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Table(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
            scalar => Node::Scalar(scalar),
        }
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Node::Scalar(Value::Null),
            Yaml::Bool(b) => Node::Scalar(Value::Bool(b)),
            Yaml::Number(n) => Node::Scalar(yaml_number(&n)),
            Yaml::String(s) => Node::Scalar(Value::String(s)),
            Yaml::Sequence(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Yaml::Mapping(mapping) => Node::AnyTable(
                mapping
                    .into_iter()
                    .map(|(k, v)| (Node::from(k).into_value(), Node::from(v)))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        float_value(n.as_f64().unwrap_or(f64::NAN))
    }
}

impl From<toml::Value> for Node {
    fn from(value: toml::Value) -> Self {
        use toml::Value as Toml;

        match value {
            Toml::String(s) => Node::Scalar(Value::String(s)),
            Toml::Integer(i) => Node::Scalar(Value::from(i)),
            Toml::Float(f) => Node::Scalar(float_value(f)),
            Toml::Boolean(b) => Node::Scalar(Value::Bool(b)),
            Toml::Datetime(dt) => Node::Scalar(Value::String(dt.to_string())),
            Toml::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Toml::Table(table) => {
                Node::Table(table.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_objects_become_tables() {
        let node = Node::from(json!({"a": {"b": 1}, "c": [1, 2]}));
        match node {
            Node::Table(entries) => {
                assert_eq!(entries.len(), 2);
                assert!(entries.iter().any(|(k, v)| k == "a" && v.is_map()));
                assert!(entries.iter().any(|(k, v)| k == "c" && matches!(v, Node::List(_))));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_yaml_mappings_keep_scalar_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("{1: one, true: yes, name: x}").unwrap();
        let node = Node::from(yaml);
        let Node::AnyTable(entries) = node.clone() else {
            panic!("expected arbitrary-keyed table");
        };
        assert!(entries.iter().any(|(k, _)| k == &json!(1)));
        assert!(entries.iter().any(|(k, _)| k == &json!(true)));

        let keys: Vec<String> = node
            .into_entries()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["1", "true", "name"]);
    }

    #[test]
    fn test_yaml_tags_are_unwrapped() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("!port 8080").unwrap();
        assert_eq!(Node::from(yaml), Node::Scalar(json!(8080)));
    }

    #[test]
    fn test_toml_datetime_becomes_string() {
        let table: toml::Value = toml::from_str("dob = 1979-05-27T07:32:00Z").unwrap();
        let value = Node::from(table).into_value();
        assert_eq!(value, json!({"dob": "1979-05-27T07:32:00Z"}));
    }

    #[test]
    fn test_into_value_stringifies_nested_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("list:\n  - {1: a}\n").unwrap();
        assert_eq!(Node::from(yaml).into_value(), json!({"list": [{"1": "a"}]}));
    }

    #[test]
    fn test_key_string() {
        assert_eq!(key_string(&json!("a")), "a");
        assert_eq!(key_string(&json!(7)), "7");
        assert_eq!(key_string(&json!(1.5)), "1.5");
        assert_eq!(key_string(&json!(false)), "false");
        assert_eq!(key_string(&Value::Null), "null");
        assert_eq!(key_string(&json!([1, 2])), "[1,2]");
    }
}
