//! Number checks: `multipleOf` and the four bounds.
//!
//! `exclusiveMinimum`/`exclusiveMaximum` come in two dialects: the draft-4
//! boolean flag that repurposes the adjacent `minimum`/`maximum`, and the
//! draft-7 standalone number. Both are accepted.
use crate::ast::Node;
use crate::validation::result::ValidationResult;
use crate::validation::Validator;
use serde_json::{Map, Value};

impl Validator<'_> {
    pub(super) fn validate_number(
        &self,
        node: &Node,
        value: f64,
        schema: &Map<String, Value>,
        result: &mut ValidationResult<'_>,
    ) {
        if let Some(multiple) = schema.get("multipleOf").and_then(Value::as_f64) {
            // IEEE-754 remainder; exact for the integer and decimal cases
            // that schemas use in practice
            if value % multiple != 0.0 {
                result
                    .problems
                    .push(self.problem(node, format!("Value is not divisible by {}.", multiple)));
            }
        }

        let minimum = schema.get("minimum").and_then(Value::as_f64);
        let maximum = schema.get("maximum").and_then(Value::as_f64);
        let exclusive_minimum = schema.get("exclusiveMinimum");
        let exclusive_maximum = schema.get("exclusiveMaximum");

        if let Some(bound) = exclusive_limit(minimum, exclusive_minimum) {
            if value <= bound {
                result.problems.push(self.problem(
                    node,
                    format!("Value is below the exclusive minimum of {}.", bound),
                ));
            }
        }
        if let Some(bound) = exclusive_limit(maximum, exclusive_maximum) {
            if value >= bound {
                result.problems.push(self.problem(
                    node,
                    format!("Value is above the exclusive maximum of {}.", bound),
                ));
            }
        }
        if let Some(bound) = inclusive_limit(minimum, exclusive_minimum) {
            if value < bound {
                result
                    .problems
                    .push(self.problem(node, format!("Value is below the minimum of {}.", bound)));
            }
        }
        if let Some(bound) = inclusive_limit(maximum, exclusive_maximum) {
            if value > bound {
                result
                    .problems
                    .push(self.problem(node, format!("Value is above the maximum of {}.", bound)));
            }
        }
    }
}

fn exclusive_limit(limit: Option<f64>, exclusive: Option<&Value>) -> Option<f64> {
    match exclusive {
        Some(Value::Number(bound)) => bound.as_f64(),
        Some(Value::Bool(true)) => limit,
        _ => None,
    }
}

fn inclusive_limit(limit: Option<f64>, exclusive: Option<&Value>) -> Option<f64> {
    match exclusive {
        Some(Value::Bool(true)) => None,
        _ => limit,
    }
}
