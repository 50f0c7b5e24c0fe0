//! Object checks: `required`, `properties`, `patternProperties`,
//! `additionalProperties`, the property count bounds, `dependencies` and
//! `propertyNames`.
//!
//! Property collection honors the YAML merge key: a property named `<<`
//! splices the properties of its value (an object, or an array of objects)
//! into the enclosing object, and is itself never treated as a key.
use crate::ast::{NodeId, NodeKind};
use crate::schema::{error_message, SchemaRef};
use crate::validation::collector::SchemaCollector;
use crate::validation::result::ValidationResult;
use crate::validation::Validator;
use ahash::AHashMap;
use serde_json::{Map, Value};

const MERGE_KEY: &str = "<<";

impl Validator<'_> {
    pub(super) fn validate_object<'s>(
        &self,
        node_id: NodeId,
        properties: &[NodeId],
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        // last duplicate wins in `seen_keys`; `unprocessed` keeps one entry
        // per occurrence, in source order
        let mut seen_keys: AHashMap<String, Option<NodeId>> = AHashMap::new();
        let mut unprocessed: Vec<String> = Vec::new();
        for &property in properties {
            let (key, value) = match &self.document.node(property).kind {
                NodeKind::Property { key, value, .. } => (*key, *value),
                _ => continue,
            };
            let name = match &self.document.node(key).kind {
                NodeKind::String(name) => name.as_str(),
                _ => continue,
            };
            if name == MERGE_KEY {
                self.adopt_merged_properties(value, &mut seen_keys, &mut unprocessed);
            } else {
                seen_keys.insert(name.to_string(), value);
                unprocessed.push(name.to_string());
            }
        }

        if let Some(Value::Array(required)) = schema.get("required") {
            for name in required.iter().filter_map(Value::as_str) {
                if !matches!(seen_keys.get(name), Some(Some(_))) {
                    let (offset, length) = self.missing_property_span(node_id);
                    result.problems.push(self.problem_at(
                        offset,
                        length,
                        format!("Missing property \"{}\".", name),
                    ));
                }
            }
        }

        if let Some(Value::Object(schema_properties)) = schema.get("properties") {
            for (name, property_schema) in schema_properties {
                unprocessed.retain(|key| key != name);
                if let Some(&Some(child)) = seen_keys.get(name) {
                    self.validate_property_value(
                        child,
                        name,
                        property_schema,
                        schema,
                        result,
                        collector,
                        depth,
                    );
                }
            }
        }

        if let Some(Value::Object(pattern_properties)) = schema.get("patternProperties") {
            for (pattern, property_schema) in pattern_properties {
                // an invalid pattern disables its entry
                let regex = match fancy_regex::Regex::new(pattern) {
                    Ok(regex) => regex,
                    Err(_) => continue,
                };
                for name in unprocessed.clone() {
                    if matches!(regex.is_match(&name), Ok(true)) {
                        unprocessed.retain(|key| key != &name);
                        if let Some(&Some(child)) = seen_keys.get(&name) {
                            self.validate_property_value(
                                child,
                                &name,
                                property_schema,
                                schema,
                                result,
                                collector,
                                depth,
                            );
                        }
                    }
                }
            }
        }

        match schema.get("additionalProperties") {
            Some(additional) if additional.is_object() => {
                for name in &unprocessed {
                    if let Some(&Some(child)) = seen_keys.get(name) {
                        let mut property_result = ValidationResult::new();
                        self.validate(child, additional, &mut property_result, collector, depth);
                        result.merge_property_match(property_result);
                    }
                }
            }
            Some(Value::Bool(false)) => {
                for name in &unprocessed {
                    if let Some(&Some(child)) = seen_keys.get(name) {
                        let (offset, length) = self.key_span_of_value(child);
                        let message = match error_message(schema) {
                            Some(message) => message.to_string(),
                            None => format!("Property {} is not allowed.", name),
                        };
                        result
                            .problems
                            .push(self.problem_at(offset, length, message));
                    }
                }
            }
            _ => {}
        }

        // the bounds count source properties, before merge-key expansion
        let node = self.document.node(node_id);
        if let Some(limit) = schema.get("maxProperties").and_then(Value::as_u64) {
            if properties.len() as u64 > limit {
                result.problems.push(self.problem(
                    node,
                    format!("Object has more properties than limit of {}.", limit),
                ));
            }
        }
        if let Some(limit) = schema.get("minProperties").and_then(Value::as_u64) {
            if (properties.len() as u64) < limit {
                result.problems.push(self.problem(
                    node,
                    format!(
                        "Object has fewer properties than the required number of {}.",
                        limit
                    ),
                ));
            }
        }

        if let Some(Value::Object(dependencies)) = schema.get("dependencies") {
            for (key, dependency) in dependencies {
                if !matches!(seen_keys.get(key.as_str()), Some(Some(_))) {
                    continue;
                }
                match dependency {
                    Value::Array(required) => {
                        for name in required.iter().filter_map(Value::as_str) {
                            if !matches!(seen_keys.get(name), Some(Some(_))) {
                                result.problems.push(self.problem(
                                    node,
                                    format!(
                                        "Object is missing property {} required by property {}.",
                                        name, key
                                    ),
                                ));
                            } else {
                                result.properties_value_matches =
                                    result.properties_value_matches.saturating_add(1);
                            }
                        }
                    }
                    dependency if SchemaRef::of(dependency).is_some() => {
                        let mut dependency_result = ValidationResult::new();
                        self.validate(
                            node_id,
                            dependency,
                            &mut dependency_result,
                            collector,
                            depth,
                        );
                        result.merge_property_match(dependency_result);
                    }
                    _ => {}
                }
            }
        }

        if let Some(property_names) = schema.get("propertyNames") {
            if SchemaRef::of(property_names).is_some() {
                for &property in properties {
                    if let NodeKind::Property { key, .. } = &self.document.node(property).kind {
                        // name matches are diagnostics only, never recorded
                        self.validate(
                            *key,
                            property_names,
                            result,
                            &mut SchemaCollector::NoOp,
                            depth,
                        );
                    }
                }
            }
        }
    }

    /// Validate one property value against its schema, handling the boolean
    /// shorthands: `false` forbids the property, `true` counts as a match.
    #[allow(clippy::too_many_arguments)]
    fn validate_property_value<'s>(
        &self,
        child: NodeId,
        name: &str,
        property_schema: &'s Value,
        parent_schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        match property_schema {
            Value::Bool(false) => {
                let (offset, length) = self.key_span_of_value(child);
                let message = match error_message(parent_schema) {
                    Some(message) => message.to_string(),
                    None => format!("Property {} is not allowed.", name),
                };
                result
                    .problems
                    .push(self.problem_at(offset, length, message));
            }
            Value::Bool(true) => {
                result.properties_matches = result.properties_matches.saturating_add(1);
                result.properties_value_matches =
                    result.properties_value_matches.saturating_add(1);
            }
            _ => {
                let mut property_result = ValidationResult::new();
                self.validate(child, property_schema, &mut property_result, collector, depth);
                result.merge_property_match(property_result);
            }
        }
    }

    fn adopt_merged_properties(
        &self,
        value: Option<NodeId>,
        seen_keys: &mut AHashMap<String, Option<NodeId>>,
        unprocessed: &mut Vec<String>,
    ) {
        let value = match value {
            Some(value) => value,
            None => return,
        };
        match &self.document.node(value).kind {
            NodeKind::Object { properties } => {
                for &property in properties {
                    self.adopt_property(property, seen_keys, unprocessed);
                }
            }
            NodeKind::Array { items } => {
                for &item in items {
                    if let NodeKind::Object { properties } = &self.document.node(item).kind {
                        for &property in properties {
                            self.adopt_property(property, seen_keys, unprocessed);
                        }
                    }
                }
            }
            // merge values of any other type contribute nothing
            _ => {}
        }
    }

    fn adopt_property(
        &self,
        property: NodeId,
        seen_keys: &mut AHashMap<String, Option<NodeId>>,
        unprocessed: &mut Vec<String>,
    ) {
        if let NodeKind::Property { key, value, .. } = &self.document.node(property).kind {
            if let NodeKind::String(name) = &self.document.node(*key).kind {
                seen_keys.insert(name.clone(), *value);
                unprocessed.push(name.clone());
            }
        }
    }

    /// Where to report a missing required property: the key of the enclosing
    /// property when this object is a property value, else the object's
    /// first character.
    fn missing_property_span(&self, node_id: NodeId) -> (u32, u32) {
        if let Some(parent) = self.document.node(node_id).parent {
            if let NodeKind::Property { key, .. } = &self.document.node(parent).kind {
                let key_node = self.document.node(*key);
                return (key_node.offset, key_node.length);
            }
        }
        (self.document.node(node_id).offset, 1)
    }

    /// The key span of the property owning `value`, for "not allowed"
    /// reports.
    fn key_span_of_value(&self, value: NodeId) -> (u32, u32) {
        if let Some(parent) = self.document.node(value).parent {
            if let NodeKind::Property { key, .. } = &self.document.node(parent).kind {
                let key_node = self.document.node(*key);
                return (key_node.offset, key_node.length);
            }
        }
        let node = self.document.node(value);
        (node.offset, node.length)
    }
}
