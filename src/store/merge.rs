//! Tree merging for the hierarchy mirror.
//!
//! A dotted key is turned into a chain of single-entry maps and merged into
//! the tree one level at a time. Branches meeting branches are unioned with
//! incoming children winning; any other pairing replaces the node outright.

use serde_json::{Map, Value};

/// Merge `incoming` into `map` under `key`.
///
/// - Branch into branch: children merged recursively, incoming wins on conflicts
/// - Leaf into anything, or branch into leaf: incoming replaces the node
/// - Null is an ordinary leaf here; callers guard against null clobbering
pub fn merge_entry(map: &mut Map<String, Value>, key: String, incoming: Value) {
    if let Value::Object(children) = incoming {
        if let Some(Value::Object(existing)) = map.get_mut(&key) {
            for (child_key, child) in children {
                merge_entry(existing, child_key, child);
            }
            return;
        }
        map.insert(key, Value::Object(children));
    } else {
        map.insert(key, incoming);
    }
}

/// Wrap `value` in one single-entry map per segment.
///
/// `nest(&["b", "c"], 1)` yields `{"b": {"c": 1}}`; no segments yields the value.
pub fn nest(segments: &[&str], value: Value) -> Value {
    segments.iter().rev().fold(value, |inner, segment| {
        let mut map = Map::new();
        map.insert((*segment).to_string(), inner);
        Value::Object(map)
    })
}

/// Merge `value` into `tree` at the dotted path `key`.
pub fn insert_path(tree: &mut Map<String, Value>, key: &str, value: Value) {
    let segments: Vec<&str> = key.split('.').collect();
    let (first, rest) = segments
        .split_first()
        .map(|(first, rest)| (*first, rest))
        .unwrap_or(("", &[]));
    merge_entry(tree, first.to_string(), nest(rest, value));
}

/// Walk `tree` along the dotted path `key`, returning the node found.
pub fn descend<'a>(
    tree: &'a Map<String, Value>,
    key: &str,
) -> Option<(&'a Map<String, Value>, &'a Value)> {
    let mut parent = tree;
    let mut segments = key.split('.').peekable();
    while let Some(segment) = segments.next() {
        let node = parent.get(segment)?;
        if segments.peek().is_none() {
            return Some((parent, node));
        }
        parent = node.as_object()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_nest() {
        assert_eq!(nest(&["b", "c"], json!(1)), json!({"b": {"c": 1}}));
        assert_eq!(nest(&[], json!("x")), json!("x"));
    }

    #[test]
    fn test_insert_path_builds_branches() {
        let mut t = Map::new();
        insert_path(&mut t, "a.b.c", json!(1));
        assert_eq!(Value::Object(t), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_insert_path_preserves_siblings() {
        let mut t = Map::new();
        insert_path(&mut t, "a.b", json!(1));
        insert_path(&mut t, "a.c", json!(2));
        assert_eq!(Value::Object(t), json!({"a": {"b": 1, "c": 2}}));
    }

    #[test]
    fn test_incoming_wins_on_conflict() {
        let mut t = tree(json!({"a": {"b": 1, "c": 2}}));
        merge_entry(&mut t, "a".into(), json!({"b": 3}));
        assert_eq!(Value::Object(t), json!({"a": {"b": 3, "c": 2}}));
    }

    #[test]
    fn test_leaf_replaces_branch() {
        let mut t = tree(json!({"a": {"b": 1}}));
        insert_path(&mut t, "a", json!(42));
        assert_eq!(Value::Object(t), json!({"a": 42}));
    }

    #[test]
    fn test_branch_replaces_leaf() {
        let mut t = tree(json!({"a": 42}));
        insert_path(&mut t, "a.b", json!(true));
        assert_eq!(Value::Object(t), json!({"a": {"b": true}}));
    }

    #[test]
    fn test_empty_segments_are_kept() {
        let mut t = Map::new();
        insert_path(&mut t, "a..b", json!(1));
        insert_path(&mut t, "", json!(2));
        assert_eq!(Value::Object(t), json!({"a": {"": {"b": 1}}, "": 2}));
    }

    #[test]
    fn test_descend() {
        let t = tree(json!({"a": {"b": {"c": 1}}}));
        let (parent, node) = descend(&t, "a.b").unwrap();
        assert_eq!(node, &json!({"c": 1}));
        assert!(parent.contains_key("b"));

        let (parent, node) = descend(&t, "a.b.c").unwrap();
        assert_eq!(node, &json!(1));
        assert_eq!(Value::Object(parent.clone()), json!({"c": 1}));

        assert!(descend(&t, "a.x").is_none());
        assert!(descend(&t, "a.b.c.d").is_none());
    }
}
