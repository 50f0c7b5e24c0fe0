//! A thin read-only view over JSON-Schema values.
//!
//! Schemas arrive as plain `serde_json` values with `$ref` already expanded
//! by the schema layer. A schema is either a boolean (`true` matches
//! anything, `false` matches nothing) or an object; anything else is not a
//! schema and its checks are skipped, matching the rule that malformed
//! schemas never fail validation.
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub(crate) enum SchemaRef<'s> {
    Bool(bool),
    Object(&'s Map<String, Value>),
}

impl<'s> SchemaRef<'s> {
    pub(crate) fn of(value: &'s Value) -> Option<SchemaRef<'s>> {
        match value {
            Value::Bool(value) => Some(SchemaRef::Bool(*value)),
            Value::Object(map) => Some(SchemaRef::Object(map)),
            _ => None,
        }
    }
}

/// The message override carried by `errorMessage`, if any.
pub(crate) fn error_message(schema: &Map<String, Value>) -> Option<&str> {
    schema.get("errorMessage").and_then(Value::as_str)
}

/// `patternErrorMessage` falling back to `errorMessage`; used by `pattern`
/// and `format` checks.
pub(crate) fn pattern_error_message(schema: &Map<String, Value>) -> Option<&str> {
    schema
        .get("patternErrorMessage")
        .and_then(Value::as_str)
        .or_else(|| error_message(schema))
}

#[cfg(test)]
mod tests {
    use super::SchemaRef;
    use serde_json::json;

    #[test]
    fn only_booleans_and_objects_are_schemas() {
        assert!(matches!(
            SchemaRef::of(&json!(true)),
            Some(SchemaRef::Bool(true))
        ));
        assert!(matches!(
            SchemaRef::of(&json!({"type": "string"})),
            Some(SchemaRef::Object(_))
        ));
        assert!(SchemaRef::of(&json!(42)).is_none());
        assert!(SchemaRef::of(&json!("not a schema")).is_none());
        assert!(SchemaRef::of(&json!(["not", "a", "schema"])).is_none());
    }
}
