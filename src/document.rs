//! The validation entry points on [`Document`].
use crate::ast::{Document, NodeId};
use crate::diagnostics::{Diagnostic, Severity};
use crate::validation::collector::{ApplicableSchema, SchemaCollector};
use crate::validation::result::ValidationResult;
use crate::validation::Validator;
use serde_json::Value;

impl Document {
    /// Validate the document against `schema` and return the diagnostics,
    /// in document order.
    ///
    /// Two runs over the same `(document, schema)` pair produce identical
    /// lists; the engine performs no I/O and holds no state between runs.
    pub fn validate(&self, schema: &Value) -> Vec<Diagnostic> {
        self.validate_with_severity(schema, Severity::Warning)
    }

    /// Like [`validate`](Document::validate), reporting diagnostics with the
    /// given severity instead of the default `Warning`.
    pub fn validate_with_severity(&self, schema: &Value, severity: Severity) -> Vec<Diagnostic> {
        let validator = Validator::new(self, severity);
        let mut result = ValidationResult::new();
        let mut collector = SchemaCollector::NoOp;
        validator.run(schema, &mut result, &mut collector);
        tracing::debug!(problems = result.problems.len(), "validated document");
        result.problems
    }

    /// Every schema the engine attempted to match against a node, for editor
    /// features such as hover and completion. Diagnostics are discarded.
    ///
    /// With a `focus_offset`, only nodes whose span contains the offset are
    /// reported; `exclude` suppresses one node entirely (an editor excludes
    /// the node being rewritten). Within `anyOf`/`oneOf` only the winning
    /// branch contributes records, so losing alternatives cannot mislead the
    /// caller.
    pub fn matching_schemas<'s>(
        &self,
        schema: &'s Value,
        focus_offset: Option<u32>,
        exclude: Option<NodeId>,
    ) -> Vec<ApplicableSchema<'s>> {
        let validator = Validator::new(self, Severity::Warning);
        let mut result = ValidationResult::new();
        let mut collector = SchemaCollector::recording(focus_offset, exclude);
        validator.run(schema, &mut result, &mut collector);
        let schemas = collector.into_schemas();
        tracing::debug!(matches = schemas.len(), "collected matching schemas");
        schemas
    }
}
