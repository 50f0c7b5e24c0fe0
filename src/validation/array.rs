//! Array checks: `items`, `additionalItems`, `contains`, the item count
//! bounds and `uniqueItems`.
use crate::ast::NodeId;
use crate::equal::node_equal;
use crate::schema::{error_message, SchemaRef};
use crate::validation::collector::SchemaCollector;
use crate::validation::result::ValidationResult;
use crate::validation::Validator;
use serde_json::{Map, Value};

impl Validator<'_> {
    pub(super) fn validate_array<'s>(
        &self,
        node_id: NodeId,
        items: &[NodeId],
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        let node = self.document.node(node_id);
        match schema.get("items") {
            // tuple validation: one schema per position
            Some(Value::Array(tuple)) => {
                for (index, sub_schema) in tuple.iter().enumerate() {
                    if let Some(&item) = items.get(index) {
                        let mut item_result = ValidationResult::new();
                        self.validate(item, sub_schema, &mut item_result, collector, depth);
                        result.merge_property_match(item_result);
                    } else if items.len() >= tuple.len() {
                        result.properties_value_matches =
                            result.properties_value_matches.saturating_add(1);
                    }
                }
                if items.len() > tuple.len() {
                    match schema.get("additionalItems") {
                        Some(additional) if additional.is_object() => {
                            for &item in &items[tuple.len()..] {
                                let mut item_result = ValidationResult::new();
                                self.validate(item, additional, &mut item_result, collector, depth);
                                result.merge_property_match(item_result);
                            }
                        }
                        Some(Value::Bool(false)) => {
                            result.problems.push(self.problem(
                                node,
                                format!(
                                    "Array has too many items according to schema. Expected {} or fewer.",
                                    tuple.len()
                                ),
                            ));
                        }
                        _ => {}
                    }
                }
            }
            Some(single) => {
                if SchemaRef::of(single).is_some() {
                    for &item in items {
                        let mut item_result = ValidationResult::new();
                        self.validate(item, single, &mut item_result, collector, depth);
                        result.merge_property_match(item_result);
                    }
                }
            }
            None => {}
        }

        if let Some(contains) = schema.get("contains") {
            if SchemaRef::of(contains).is_some() {
                let does_contain = items.iter().any(|&item| {
                    let mut item_result = ValidationResult::new();
                    self.validate(
                        item,
                        contains,
                        &mut item_result,
                        &mut SchemaCollector::NoOp,
                        depth,
                    );
                    !item_result.has_problems()
                });
                if !does_contain {
                    let message = match error_message(schema) {
                        Some(message) => message.to_string(),
                        None => "Array does not contain required item.".to_string(),
                    };
                    result.problems.push(self.problem(node, message));
                }
            }
        }

        if let Some(limit) = schema.get("minItems").and_then(Value::as_u64) {
            if (items.len() as u64) < limit {
                result.problems.push(self.problem(
                    node,
                    format!("Array has too few items. Expected {} or more.", limit),
                ));
            }
        }
        if let Some(limit) = schema.get("maxItems").and_then(Value::as_u64) {
            if (items.len() as u64) > limit {
                result.problems.push(self.problem(
                    node,
                    format!("Array has too many items. Expected {} or fewer.", limit),
                ));
            }
        }

        if schema.get("uniqueItems") == Some(&Value::Bool(true)) {
            let has_duplicates = items.iter().enumerate().any(|(index, &item)| {
                items[index + 1..]
                    .iter()
                    .any(|&other| node_equal(self.document, item, other))
            });
            if has_duplicates {
                result
                    .problems
                    .push(self.problem(node, "Array has duplicate items."));
            }
        }
    }
}
