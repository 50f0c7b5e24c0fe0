//! The validation engine.
//!
//! [`Validator::validate`] walks the document recursively: a type-specific
//! pass (object, array, string, number) followed by a shared pass over the
//! combinators in a fixed order (`type`, `allOf`, `not`, `anyOf`, `oneOf`,
//! `if`/`then`/`else`, `enum`, `const`, `deprecationMessage`), so that two
//! runs over the same input produce identical diagnostics in identical
//! order. Every visited `(node, schema)` pair is reported to the
//! [`SchemaCollector`](collector::SchemaCollector).
//!
//! Malformed schemas never fail a run: unknown keywords, ill-typed fields
//! and invalid regexes simply disable their checks.
pub(crate) mod array;
pub(crate) mod collector;
pub(crate) mod format;
pub(crate) mod number;
pub(crate) mod object;
pub(crate) mod result;
pub(crate) mod string;

use crate::ast::{Document, Node, NodeId, NodeKind};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Severity};
use crate::equal::node_equals_value;
use crate::schema::{error_message, SchemaRef};
use collector::{ApplicableSchema, SchemaCollector};
use result::{enum_value_mismatch_message, ValidationResult};
use serde_json::{Map, Value};
use std::cell::Cell;
use std::cmp::Ordering;

/// Combined AST plus combinator nesting the engine will follow before it
/// gives up and reports truncation.
pub(crate) const MAX_DEPTH: u32 = 512;

pub(crate) struct Validator<'t> {
    pub(crate) document: &'t Document,
    severity: Severity,
    depth_exceeded: Cell<bool>,
}

impl<'t> Validator<'t> {
    pub(crate) fn new(document: &'t Document, severity: Severity) -> Self {
        Validator {
            document,
            severity,
            depth_exceeded: Cell::new(false),
        }
    }

    /// Validate the whole document. Appends a single truncation diagnostic
    /// at the root if the depth ceiling was hit anywhere.
    pub(crate) fn run<'s>(
        &self,
        schema: &'s Value,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
    ) {
        let root = match self.document.root() {
            Some(root) => root,
            None => return,
        };
        self.validate(root, schema, result, collector, 0);
        if self.depth_exceeded.get() {
            let node = self.document.node(root);
            result.problems.push(self.problem(
                node,
                "Maximum nesting depth exceeded. Validation results are incomplete.",
            ));
        }
    }

    pub(crate) fn validate<'s>(
        &self,
        node_id: NodeId,
        schema_value: &'s Value,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        if depth >= MAX_DEPTH {
            self.depth_exceeded.set(true);
            return;
        }
        if !collector.include(self.document, node_id) {
            return;
        }
        let schema = match SchemaRef::of(schema_value) {
            Some(schema) => schema,
            None => return,
        };
        // property nodes delegate to their value and carry no matches of
        // their own
        if let NodeKind::Property { value, .. } = &self.document.node(node_id).kind {
            if let Some(value) = *value {
                self.validate(value, schema_value, result, collector, depth + 1);
            }
            return;
        }
        match schema {
            SchemaRef::Bool(true) => {
                collector.add(ApplicableSchema {
                    node: node_id,
                    schema: schema_value,
                    inverted: false,
                });
            }
            SchemaRef::Bool(false) => {
                let node = self.document.node(node_id);
                result
                    .problems
                    .push(self.problem(node, "Matches a schema that is not allowed."));
                collector.add(ApplicableSchema {
                    node: node_id,
                    schema: schema_value,
                    inverted: false,
                });
            }
            SchemaRef::Object(map) => {
                self.validate_against(node_id, schema_value, map, result, collector, depth + 1);
            }
        }
    }

    fn validate_against<'s>(
        &self,
        node_id: NodeId,
        schema_value: &'s Value,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        match &self.document.node(node_id).kind {
            NodeKind::Object { properties } => {
                self.validate_object(node_id, properties, schema, result, collector, depth);
            }
            NodeKind::Array { items } => {
                self.validate_array(node_id, items, schema, result, collector, depth);
            }
            NodeKind::String(value) => {
                self.validate_string(self.document.node(node_id), value, schema, result);
            }
            NodeKind::Number { value, .. } => {
                self.validate_number(self.document.node(node_id), *value, schema, result);
            }
            _ => {}
        }

        self.check_type(node_id, schema, result);
        self.check_all_of(node_id, schema, result, collector, depth);
        self.check_not(node_id, schema, result, collector, depth);
        self.check_alternatives(node_id, schema, "anyOf", false, result, collector, depth);
        self.check_alternatives(node_id, schema, "oneOf", true, result, collector, depth);
        self.check_condition(node_id, schema, result, collector, depth);
        self.check_enum(node_id, schema, result);
        self.check_const(node_id, schema, result);
        self.check_deprecated(node_id, schema, result);

        collector.add(ApplicableSchema {
            node: node_id,
            schema: schema_value,
            inverted: false,
        });
    }

    fn check_type<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
    ) {
        let node = self.document.node(node_id);
        match schema.get("type") {
            Some(Value::Array(types)) => {
                if !types
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|type_name| matches_type(node, type_name))
                {
                    let expected = types
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<&str>>()
                        .join(", ");
                    let message = match error_message(schema) {
                        Some(message) => message.to_string(),
                        None => format!("Incorrect type. Expected one of {}.", expected),
                    };
                    result.problems.push(self.problem(node, message));
                    result.type_mismatch_problems =
                        result.type_mismatch_problems.saturating_add(1);
                }
            }
            Some(Value::String(type_name)) => {
                if !matches_type(node, type_name) {
                    let message = match error_message(schema) {
                        Some(message) => message.to_string(),
                        None => format!("Incorrect type. Expected {:?}.", type_name),
                    };
                    result.problems.push(self.problem(node, message));
                    result.type_mismatch_problems =
                        result.type_mismatch_problems.saturating_add(1);
                }
            }
            _ => {}
        }
    }

    fn check_all_of<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        if let Some(Value::Array(all_of)) = schema.get("allOf") {
            for sub_schema in all_of {
                self.validate(node_id, sub_schema, result, collector, depth);
            }
        }
    }

    fn check_not<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        let not_schema = match schema.get("not") {
            Some(not_schema) if SchemaRef::of(not_schema).is_some() => not_schema,
            _ => return,
        };
        let mut sub_result = ValidationResult::new();
        let mut sub_collector = collector.new_sub();
        self.validate(node_id, not_schema, &mut sub_result, &mut sub_collector, depth);
        if !sub_result.has_problems() {
            let node = self.document.node(node_id);
            result
                .problems
                .push(self.problem(node, "Matches a schema that is not allowed."));
        }
        // the branch applies either way, with flipped polarity
        for mut record in sub_collector.into_schemas() {
            record.inverted = !record.inverted;
            collector.add(record);
        }
    }

    /// `anyOf` (`max_one_match == false`) and `oneOf` (`true`): evaluate
    /// every alternative against a fresh sub-result and sub-collector, keep
    /// the best one for error reporting, and only let the winning branch
    /// contribute applicable-schema records.
    #[allow(clippy::too_many_arguments)]
    fn check_alternatives<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        keyword: &str,
        max_one_match: bool,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        let alternatives = match schema.get(keyword) {
            Some(Value::Array(alternatives)) => alternatives,
            _ => return,
        };
        let mut clean_matches = 0usize;
        let mut best_match: Option<(ValidationResult<'s>, SchemaCollector<'s>)> = None;
        for sub_schema in alternatives {
            let mut sub_result = ValidationResult::new();
            let mut sub_collector = collector.new_sub();
            self.validate(node_id, sub_schema, &mut sub_result, &mut sub_collector, depth);
            if !sub_result.has_problems() {
                clean_matches += 1;
            }
            best_match = match best_match.take() {
                None => Some((sub_result, sub_collector)),
                Some((mut best_result, mut best_collector)) => {
                    if !max_one_match
                        && !sub_result.has_problems()
                        && !best_result.has_problems()
                    {
                        // equally clean matches under anyOf combine
                        best_collector.merge(sub_collector);
                        best_result.properties_matches = best_result
                            .properties_matches
                            .saturating_add(sub_result.properties_matches);
                        best_result.properties_value_matches = best_result
                            .properties_value_matches
                            .saturating_add(sub_result.properties_value_matches);
                        Some((best_result, best_collector))
                    } else {
                        match sub_result.compare(&best_result) {
                            Ordering::Greater => Some((sub_result, sub_collector)),
                            Ordering::Equal => {
                                best_collector.merge(sub_collector);
                                best_result.merge_enum_values(&sub_result);
                                Some((best_result, best_collector))
                            }
                            Ordering::Less => Some((best_result, best_collector)),
                        }
                    }
                }
            };
        }
        if clean_matches > 1 && max_one_match {
            let offset = self.document.node(node_id).offset;
            result.problems.push(self.problem_at(
                offset,
                1,
                "Matches multiple schemas when only one must validate.",
            ));
        }
        if let Some((best_result, best_collector)) = best_match {
            let properties_matches = best_result.properties_matches;
            let properties_value_matches = best_result.properties_value_matches;
            result.merge(best_result);
            result.properties_matches =
                result.properties_matches.saturating_add(properties_matches);
            result.properties_value_matches = result
                .properties_value_matches
                .saturating_add(properties_value_matches);
            collector.merge(best_collector);
        }
    }

    fn check_condition<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
        collector: &mut SchemaCollector<'s>,
        depth: u32,
    ) {
        let if_schema = match schema.get("if") {
            Some(if_schema) if SchemaRef::of(if_schema).is_some() => if_schema,
            _ => return,
        };
        let mut condition_result = ValidationResult::new();
        let mut condition_collector = collector.new_sub();
        self.validate(
            node_id,
            if_schema,
            &mut condition_result,
            &mut condition_collector,
            depth,
        );
        // the condition's matches apply regardless of the outcome
        collector.merge(condition_collector);

        let branch = if !condition_result.has_problems() {
            schema.get("then")
        } else {
            schema.get("else")
        };
        if let Some(branch_schema) = branch {
            let mut branch_result = ValidationResult::new();
            let mut branch_collector = collector.new_sub();
            self.validate(
                node_id,
                branch_schema,
                &mut branch_result,
                &mut branch_collector,
                depth,
            );
            let properties_matches = branch_result.properties_matches;
            let properties_value_matches = branch_result.properties_value_matches;
            result.merge(branch_result);
            result.properties_matches =
                result.properties_matches.saturating_add(properties_matches);
            result.properties_value_matches = result
                .properties_value_matches
                .saturating_add(properties_value_matches);
            collector.merge(branch_collector);
        }
    }

    fn check_enum<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
    ) {
        let enum_values = match schema.get("enum") {
            Some(Value::Array(enum_values)) => enum_values,
            _ => return,
        };
        let matched = enum_values
            .iter()
            .any(|candidate| node_equals_value(self.document, node_id, candidate));
        result.enum_values = Some(enum_values.iter().collect());
        result.enum_value_match = matched;
        if !matched {
            let node = self.document.node(node_id);
            let message = match error_message(schema) {
                Some(message) => message.to_string(),
                None => enum_value_mismatch_message(&enum_values.iter().collect::<Vec<&Value>>()),
            };
            result.problems.push(
                self.problem(node, message)
                    .with_code(DiagnosticCode::EnumValueMismatch),
            );
        }
    }

    fn check_const<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
    ) {
        let expected = match schema.get("const") {
            Some(expected) => expected,
            None => return,
        };
        if node_equals_value(self.document, node_id, expected) {
            result.enum_value_match = true;
        } else {
            let node = self.document.node(node_id);
            let message = match error_message(schema) {
                Some(message) => message.to_string(),
                None => format!("Value must be {}.", expected),
            };
            result.problems.push(
                self.problem(node, message)
                    .with_code(DiagnosticCode::EnumValueMismatch),
            );
            result.enum_value_match = false;
        }
        result.enum_values = Some(vec![expected]);
    }

    fn check_deprecated<'s>(
        &self,
        node_id: NodeId,
        schema: &'s Map<String, Value>,
        result: &mut ValidationResult<'s>,
    ) {
        let message = match schema.get("deprecationMessage").and_then(Value::as_str) {
            Some(message) => message,
            None => return,
        };
        // deprecation is reported on the enclosing property
        if let Some(parent) = self.document.node(node_id).parent {
            let parent_node = self.document.node(parent);
            result.problems.push(self.problem(parent_node, message));
        }
    }

    pub(crate) fn problem(&self, node: &Node, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(node.offset, node.length, self.severity, message)
    }

    pub(crate) fn problem_at(
        &self,
        offset: u32,
        length: u32,
        message: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::new(offset, length, self.severity, message)
    }
}

fn matches_type(node: &Node, type_name: &str) -> bool {
    match &node.kind {
        NodeKind::Null => type_name == "null",
        NodeKind::Boolean(_) => type_name == "boolean",
        NodeKind::Number { is_integer, .. } => {
            type_name == "number" || (type_name == "integer" && *is_integer)
        }
        NodeKind::String(_) => type_name == "string",
        NodeKind::Array { .. } => type_name == "array",
        NodeKind::Object { .. } => type_name == "object",
        NodeKind::Property { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use serde_json::{json, Value};
    use test_case::test_case;

    fn messages(source: &str, schema: &Value) -> Vec<String> {
        parse(source)
            .expect("Valid JSON")
            .validate(schema)
            .into_iter()
            .map(|problem| problem.message)
            .collect()
    }

    #[test_case("1", &json!({"type": "number"}), &[])]
    #[test_case("1", &json!({"type": "integer"}), &[])]
    #[test_case("1.5", &json!({"type": "integer"}), &["Incorrect type. Expected \"integer\"."])]
    #[test_case("1e2", &json!({"type": "integer"}), &["Incorrect type. Expected \"integer\"."]; "exponent form is not an integer")]
    #[test_case("null", &json!({"type": "null"}), &[])]
    #[test_case("true", &json!({"type": "boolean"}), &[])]
    #[test_case("[]", &json!({"type": "array"}), &[])]
    #[test_case("{}", &json!({"type": "object"}), &[])]
    #[test_case("\"x\"", &json!({"type": "object"}), &["Incorrect type. Expected \"object\"."])]
    fn single_types(source: &str, schema: &Value, expected: &[&str]) {
        assert_eq!(messages(source, schema), expected);
    }

    #[test_case("1", &[])]
    #[test_case("\"x\"", &[])]
    #[test_case("true", &["Incorrect type. Expected one of string, integer."])]
    fn type_lists(source: &str, expected: &[&str]) {
        let schema = json!({"type": ["string", "integer"]});
        assert_eq!(messages(source, &schema), expected);
    }

    #[test]
    fn all_of_accumulates_every_branch() {
        let schema = json!({"allOf": [{"minimum": 10}, {"multipleOf": 2}]});
        assert!(messages("12", &schema).is_empty());
        assert_eq!(
            messages("7", &schema),
            &["Value is below the minimum of 10.", "Value is not divisible by 2."]
        );
    }

    #[test]
    fn not_rejects_matching_values() {
        let schema = json!({"not": {"type": "string"}});
        assert_eq!(
            messages("\"x\"", &schema),
            &["Matches a schema that is not allowed."]
        );
        assert!(messages("1", &schema).is_empty());
    }

    #[test]
    fn false_schema_rejects_everything() {
        assert_eq!(
            messages("1", &json!(false)),
            &["Matches a schema that is not allowed."]
        );
        assert!(messages("1", &json!(true)).is_empty());
    }

    #[test]
    fn any_of_is_quiet_when_one_branch_fits() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "number"}]});
        assert!(messages("1", &schema).is_empty());
        assert!(messages("\"x\"", &schema).is_empty());
    }

    #[test]
    fn any_of_reports_the_most_specific_branch() {
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "number", "minimum": 10}]});
        assert_eq!(messages("5", &schema), &["Value is below the minimum of 10."]);
    }

    #[test]
    fn one_of_requires_exactly_one_match() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]});
        assert!(messages("1", &schema).is_empty());
        assert_eq!(
            messages("3", &schema),
            &["Matches multiple schemas when only one must validate."]
        );
    }

    #[test]
    fn one_of_multiple_match_flags_a_single_character() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]});
        let problems = parse("3").expect("Valid JSON").validate(&schema);
        assert_eq!((problems[0].offset, problems[0].length), (0, 1));
    }

    #[test]
    fn condition_selects_then_branch() {
        let schema = json!({
            "if": {"minimum": 0},
            "then": {"multipleOf": 2},
            "else": {"multipleOf": 3},
        });
        assert!(messages("4", &schema).is_empty());
        assert_eq!(messages("3", &schema), &["Value is not divisible by 2."]);
        assert_eq!(messages("-4", &schema), &["Value is not divisible by 3."]);
        assert!(messages("-3", &schema).is_empty());
    }

    #[test]
    fn condition_without_branches_is_silent() {
        assert!(messages("3", &json!({"if": {"minimum": 0}})).is_empty());
        assert!(messages("-3", &json!({"if": {"minimum": 0}})).is_empty());
    }

    #[test]
    fn enum_mismatch_lists_the_candidates() {
        let problems = parse("\"abc\"")
            .expect("Valid JSON")
            .validate(&json!({"enum": ["x", "y"]}));
        assert_eq!(problems.len(), 1);
        assert_eq!(
            problems[0].message,
            "Value is not accepted. Valid values: \"x\", \"y\"."
        );
        assert_eq!(
            problems[0].code,
            Some(crate::diagnostics::DiagnosticCode::EnumValueMismatch)
        );
    }

    #[test_case("\"x\"", &json!({"enum": ["x", "y"]}), &[])]
    #[test_case("2", &json!({"enum": [1, 2, 3]}), &[])]
    #[test_case("[1, 2]", &json!({"enum": [[1, 2]]}), &[])]
    #[test_case("{\"a\": 1}", &json!({"enum": [{"a": 1.0}]}), &[])]
    fn enum_matches_structurally(source: &str, schema: &Value, expected: &[&str]) {
        assert_eq!(messages(source, schema), expected);
    }

    #[test]
    fn const_mismatch_names_the_value() {
        assert_eq!(
            messages("2", &json!({"const": 1})),
            &["Value must be 1."]
        );
        assert!(messages("1", &json!({"const": 1})).is_empty());
    }

    #[test]
    fn error_message_overrides_the_default() {
        assert_eq!(
            messages("2", &json!({"const": 1, "errorMessage": "Only 1 will do."})),
            &["Only 1 will do."]
        );
        assert_eq!(
            messages("\"x\"", &json!({"type": "number", "errorMessage": "Numbers only."})),
            &["Numbers only."]
        );
    }

    #[test]
    fn deprecation_is_reported_on_the_enclosing_property() {
        let schema = json!({
            "properties": {"legacy": {"deprecationMessage": "Use `modern` instead."}}
        });
        let problems = parse(r#"{"legacy": 1}"#)
            .expect("Valid JSON")
            .validate(&schema);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message, "Use `modern` instead.");
        // the whole `"legacy": 1` property span
        assert_eq!((problems[0].offset, problems[0].length), (1, 11));
    }

    #[test]
    fn deprecation_on_the_root_is_silent() {
        assert!(messages("1", &json!({"deprecationMessage": "gone"})).is_empty());
    }

    #[test]
    fn deep_nesting_truncates_with_a_root_diagnostic() {
        let mut schema = json!({"type": "number"});
        for _ in 0..600 {
            schema = json!({"allOf": [schema]});
        }
        let problems = parse("1").expect("Valid JSON").validate(&schema);
        assert_eq!(
            problems.last().expect("Truncation is reported").message,
            "Maximum nesting depth exceeded. Validation results are incomplete."
        );
    }
}
