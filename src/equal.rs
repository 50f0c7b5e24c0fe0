//! Structural deep equality, shared by `enum`, `const` and `uniqueItems`.
//!
//! The document side of a comparison is always an AST node whose number
//! payload is an `f64`; the schema side is whatever representation
//! `serde_json` parsed (`u64`, `i64` or `f64`). Numbers compare by numeric
//! value across that divide, so a document `1` matches an enum listing
//! `1.0`, and comparisons stay exact for integers `f64` cannot represent.
//! Object comparison collapses duplicate keys to the last occurrence,
//! mirroring [`Document::node_value`](crate::Document::node_value).
use crate::ast::{Document, NodeId, NodeKind};
use ahash::AHashMap;
use num_cmp::NumCmp;
use serde_json::{Number, Value};

/// Equality between a document node and a schema-side value.
pub(crate) fn node_equals_value(document: &Document, node: NodeId, value: &Value) -> bool {
    match (&document.node(node).kind, value) {
        (NodeKind::Null, Value::Null) => true,
        (NodeKind::Boolean(left), Value::Bool(right)) => left == right,
        (NodeKind::Number { value: left, .. }, Value::Number(right)) => {
            number_matches(*left, right)
        }
        (NodeKind::String(left), Value::String(right)) => left == right,
        (NodeKind::Array { items }, Value::Array(right)) => {
            items.len() == right.len()
                && items
                    .iter()
                    .zip(right.iter())
                    .all(|(&item, value)| node_equals_value(document, item, value))
        }
        (NodeKind::Object { properties }, Value::Object(right)) => {
            let entries = property_map(document, properties);
            entries.len() == right.len()
                && right.iter().all(|(key, value)| {
                    entries
                        .get(key.as_str())
                        .map_or(false, |&child| node_equals_value(document, child, value))
                })
        }
        (_, _) => false,
    }
}

/// Equality between two document nodes. Lexical form does not matter, only
/// the value: `1` and `1.0` in the source are equal.
pub(crate) fn node_equal(document: &Document, left: NodeId, right: NodeId) -> bool {
    match (&document.node(left).kind, &document.node(right).kind) {
        (NodeKind::Null, NodeKind::Null) => true,
        (NodeKind::Boolean(a), NodeKind::Boolean(b)) => a == b,
        (NodeKind::Number { value: a, .. }, NodeKind::Number { value: b, .. }) => a == b,
        (NodeKind::String(a), NodeKind::String(b)) => a == b,
        (NodeKind::Array { items: a }, NodeKind::Array { items: b }) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(&x, &y)| node_equal(document, x, y))
        }
        (NodeKind::Object { properties: a }, NodeKind::Object { properties: b }) => {
            let left_entries = property_map(document, a);
            let right_entries = property_map(document, b);
            left_entries.len() == right_entries.len()
                && left_entries.iter().all(|(key, &x)| {
                    right_entries
                        .get(key)
                        .map_or(false, |&y| node_equal(document, x, y))
                })
        }
        (_, _) => false,
    }
}

/// Compare the node's `f64` against whichever representation the schema
/// number carries, without a lossy cast on the schema side.
fn number_matches(value: f64, number: &Number) -> bool {
    if let Some(right) = number.as_u64() {
        NumCmp::num_eq(value, right)
    } else if let Some(right) = number.as_i64() {
        NumCmp::num_eq(value, right)
    } else {
        number
            .as_f64()
            .map_or(false, |right| NumCmp::num_eq(value, right))
    }
}

fn property_map<'d>(document: &'d Document, properties: &[NodeId]) -> AHashMap<&'d str, NodeId> {
    let mut entries = AHashMap::with_capacity(properties.len());
    for &property in properties {
        if let NodeKind::Property {
            key,
            value: Some(value),
            ..
        } = &document.node(property).kind
        {
            if let NodeKind::String(name) = &document.node(*key).kind {
                entries.insert(name.as_str(), *value);
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::{node_equal, node_equals_value};
    use crate::ast::TreeBuilder;
    use crate::parser::parse;
    use serde_json::{json, Value};
    use test_case::test_case;

    fn root_equals(source: &str, value: &Value) -> bool {
        let document = parse(source).expect("Valid JSON");
        node_equals_value(&document, document.root().expect("Has a root"), value)
    }

    #[test_case("1", &json!(1.0), true; "integer document vs float schema")]
    #[test_case("2.5", &json!(2.5), true)]
    #[test_case("-3", &json!(-3), true)]
    #[test_case("1", &json!(2), false)]
    #[test_case("null", &json!(null), true)]
    #[test_case("0", &json!(null), false; "zero is not null")]
    #[test_case("true", &json!(true), true)]
    #[test_case("\"on\"", &json!("on"), true)]
    #[test_case("\"on\"", &json!("off"), false)]
    #[test_case("\"1\"", &json!(1), false; "string never equals number")]
    fn scalars(source: &str, value: &Value, expected: bool) {
        assert_eq!(root_equals(source, value), expected);
    }

    #[test]
    fn huge_integers_compare_exactly() {
        // 2^64 - 1 has no f64 representation; the parsed document number
        // rounds to 2^64 and must not collide with the schema's u64
        assert!(!root_equals("18446744073709551615", &json!(u64::MAX)));
    }

    #[test_case("[1, \"x\"]", &json!([1.0, "x"]), true)]
    #[test_case("[1, \"x\"]", &json!([1, "y"]), false)]
    #[test_case("[1]", &json!([1, 1]), false; "length differs")]
    #[test_case("[]", &json!([]), true)]
    fn arrays(source: &str, value: &Value, expected: bool) {
        assert_eq!(root_equals(source, value), expected);
    }

    #[test_case(r#"{"a": {"b": null}}"#, &json!({"a": {"b": null}}), true)]
    #[test_case(r#"{"a": 1}"#, &json!({"a": 1, "b": 2}), false)]
    #[test_case(r#"{"a": 1, "b": 2}"#, &json!({"b": 2, "a": 1}), true; "key order is irrelevant")]
    fn objects(source: &str, value: &Value, expected: bool) {
        assert_eq!(root_equals(source, value), expected);
    }

    #[test]
    fn duplicate_keys_collapse_to_the_last() {
        assert!(root_equals(r#"{"a": 1, "a": 2}"#, &json!({"a": 2})));
        assert!(!root_equals(r#"{"a": 1, "a": 2}"#, &json!({"a": 1})));
    }

    #[test]
    fn properties_without_values_are_dropped() {
        // hand-built partial input: {"a": }
        let mut builder = TreeBuilder::new();
        let key = builder.string(1, 3, "a");
        let property = builder.property(1, 3, key, None, 4);
        let object = builder.object(0, 7, vec![property]);
        let document = builder.build(object);
        let root = document.root().expect("Has a root");
        assert!(node_equals_value(&document, root, &json!({})));
        assert!(!node_equals_value(&document, root, &json!({"a": null})));
    }

    #[test]
    fn node_equality_ignores_lexical_form() {
        // `1` and `1.0` are distinct tokens but the same value
        let document = parse("[1, 1.0, 2]").expect("Valid JSON");
        let root = document.root().expect("Has a root");
        let items: Vec<_> = document.children(root).collect();
        assert!(node_equal(&document, items[0], items[1]));
        assert!(!node_equal(&document, items[0], items[2]));
    }

    #[test]
    fn nested_nodes_compare_structurally() {
        let document = parse(r#"[{"a": [1]}, {"a": [1]}, {"a": [2]}]"#).expect("Valid JSON");
        let root = document.root().expect("Has a root");
        let items: Vec<_> = document.children(root).collect();
        assert!(node_equal(&document, items[0], items[1]));
        assert!(!node_equal(&document, items[0], items[2]));
    }
}
