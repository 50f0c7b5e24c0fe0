//! The accumulator threaded through a validation run.
//!
//! Besides the diagnostics themselves it tracks a small score: how many
//! object properties (or tuple items) matched a schema, how many of those
//! matched by value, and whether an `enum`/`const` matched. The total order
//! defined by [`ValidationResult::compare`] picks the best branch of
//! `anyOf`/`oneOf` for error reporting.
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Default)]
pub(crate) struct ValidationResult<'s> {
    pub(crate) problems: Vec<Diagnostic>,
    pub(crate) properties_matches: u32,
    pub(crate) properties_value_matches: u32,
    pub(crate) primary_value_matches: u32,
    pub(crate) enum_value_match: bool,
    pub(crate) enum_values: Option<Vec<&'s Value>>,
    /// How many of `problems` came from a failed `type` check. Branches
    /// whose only complaint is a wrong type rank below branches that got far
    /// enough to find something specific.
    pub(crate) type_mismatch_problems: u32,
}

impl<'s> ValidationResult<'s> {
    pub(crate) fn new() -> Self {
        ValidationResult::default()
    }

    #[inline]
    pub(crate) fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Append the other result's problems. Scores are not transferred.
    pub(crate) fn merge(&mut self, other: ValidationResult<'s>) {
        self.problems.extend(other.problems);
        self.type_mismatch_problems = self
            .type_mismatch_problems
            .saturating_add(other.type_mismatch_problems);
    }

    /// Coalesce the enum candidates of two failed branches and rewrite the
    /// enum-mismatch messages to list the union.
    pub(crate) fn merge_enum_values(&mut self, other: &ValidationResult<'s>) {
        if self.enum_value_match || other.enum_value_match {
            return;
        }
        if let (Some(values), Some(other_values)) =
            (self.enum_values.as_mut(), other.enum_values.as_ref())
        {
            values.extend(other_values.iter().copied());
            let message = enum_value_mismatch_message(values);
            for problem in &mut self.problems {
                if problem.code == Some(DiagnosticCode::EnumValueMismatch) {
                    problem.message = message.clone();
                }
            }
        }
    }

    /// Fold the result of validating one property (or tuple item) into this
    /// one, bumping the match scores.
    pub(crate) fn merge_property_match(&mut self, property: ValidationResult<'s>) {
        let enum_match = property.enum_value_match;
        let single_enum_value = enum_match
            && property
                .enum_values
                .as_ref()
                .map_or(false, |values| values.len() == 1);
        let clean_with_matches = !property.has_problems() && property.properties_matches > 0;
        self.merge(property);
        self.properties_matches = self.properties_matches.saturating_add(1);
        if enum_match || clean_with_matches {
            self.properties_value_matches = self.properties_value_matches.saturating_add(1);
        }
        if single_enum_value {
            self.primary_value_matches = self.primary_value_matches.saturating_add(1);
        }
    }

    /// Total order used to pick the best `anyOf`/`oneOf` branch. Greater is
    /// better.
    pub(crate) fn compare(&self, other: &ValidationResult<'s>) -> Ordering {
        let self_clean = !self.has_problems();
        let other_clean = !other.has_problems();
        if self_clean != other_clean {
            return if self_clean {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        if self.enum_value_match != other.enum_value_match {
            return if self.enum_value_match {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        self.primary_value_matches
            .cmp(&other.primary_value_matches)
            .then_with(|| {
                self.properties_value_matches
                    .cmp(&other.properties_value_matches)
            })
            .then_with(|| self.properties_matches.cmp(&other.properties_matches))
            .then_with(|| self.has_specific_problems().cmp(&other.has_specific_problems()))
    }

    /// Whether any problem is more specific than a plain type mismatch.
    fn has_specific_problems(&self) -> bool {
        self.problems.len() as u32 > self.type_mismatch_problems
    }
}

pub(crate) fn enum_value_mismatch_message(values: &[&Value]) -> String {
    let rendered = values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<String>>()
        .join(", ");
    format!("Value is not accepted. Valid values: {}.", rendered)
}

#[cfg(test)]
mod tests {
    use super::{enum_value_mismatch_message, ValidationResult};
    use crate::diagnostics::{Diagnostic, DiagnosticCode, Severity};
    use serde_json::json;
    use std::cmp::Ordering;

    fn with_problem() -> ValidationResult<'static> {
        let mut result = ValidationResult::new();
        result
            .problems
            .push(Diagnostic::new(0, 1, Severity::Warning, "problem"));
        result
    }

    #[test]
    fn clean_beats_problems() {
        let clean = ValidationResult::new();
        let broken = with_problem();
        assert_eq!(clean.compare(&broken), Ordering::Greater);
        assert_eq!(broken.compare(&clean), Ordering::Less);
        assert_eq!(clean.compare(&ValidationResult::new()), Ordering::Equal);
    }

    #[test]
    fn enum_match_breaks_ties() {
        let mut matched = ValidationResult::new();
        matched.enum_value_match = true;
        let unmatched = ValidationResult::new();
        assert_eq!(matched.compare(&unmatched), Ordering::Greater);
    }

    #[test]
    fn scores_compare_lexicographically() {
        let mut primary = ValidationResult::new();
        primary.primary_value_matches = 1;
        let mut many_values = ValidationResult::new();
        many_values.properties_value_matches = 5;
        assert_eq!(primary.compare(&many_values), Ordering::Greater);

        let mut values = ValidationResult::new();
        values.properties_value_matches = 1;
        let mut names_only = ValidationResult::new();
        names_only.properties_matches = 3;
        assert_eq!(values.compare(&names_only), Ordering::Greater);
    }

    #[test]
    fn specific_problems_beat_type_mismatches() {
        let specific = with_problem();
        let mut type_only = with_problem();
        type_only.type_mismatch_problems = 1;
        assert_eq!(specific.compare(&type_only), Ordering::Greater);
        assert_eq!(type_only.compare(&specific), Ordering::Less);
    }

    #[test]
    fn compare_is_antisymmetric() {
        let results = [
            ValidationResult::new(),
            with_problem(),
            {
                let mut r = ValidationResult::new();
                r.enum_value_match = true;
                r
            },
            {
                let mut r = ValidationResult::new();
                r.properties_matches = 2;
                r.properties_value_matches = 1;
                r
            },
        ];
        for a in &results {
            for b in &results {
                assert_eq!(a.compare(b), b.compare(a).reverse());
            }
        }
    }

    #[test]
    fn merge_property_match_never_decreases_scores() {
        let mut outer = ValidationResult::new();
        outer.properties_matches = 2;
        outer.properties_value_matches = 1;

        let clean_child = ValidationResult::new();
        outer.merge_property_match(clean_child);
        assert_eq!(outer.properties_matches, 3);
        // a clean child with no matches of its own does not count by value
        assert_eq!(outer.properties_value_matches, 1);

        let mut nested = ValidationResult::new();
        nested.properties_matches = 1;
        outer.merge_property_match(nested);
        assert_eq!(outer.properties_matches, 4);
        assert_eq!(outer.properties_value_matches, 2);
    }

    #[test]
    fn single_enum_child_counts_as_primary() {
        let enum_value = json!("on");
        let mut child = ValidationResult::new();
        child.enum_value_match = true;
        child.enum_values = Some(vec![&enum_value]);
        let mut outer = ValidationResult::new();
        outer.merge_property_match(child);
        assert_eq!(outer.primary_value_matches, 1);
        assert_eq!(outer.properties_value_matches, 1);
    }

    #[test]
    fn merge_enum_values_rewrites_messages() {
        let first = [json!("a"), json!("b")];
        let second = [json!("c")];
        let mut left = ValidationResult::new();
        left.enum_values = Some(first.iter().collect());
        left.problems.push(
            Diagnostic::new(0, 1, Severity::Warning, "old message")
                .with_code(DiagnosticCode::EnumValueMismatch),
        );
        let mut right = ValidationResult::new();
        right.enum_values = Some(second.iter().collect());

        left.merge_enum_values(&right);
        assert_eq!(
            left.problems[0].message,
            "Value is not accepted. Valid values: \"a\", \"b\", \"c\"."
        );
    }

    #[test]
    fn enum_message_renders_json() {
        let values = [json!(1), json!("x"), json!(null)];
        assert_eq!(
            enum_value_mismatch_message(&values.iter().collect::<Vec<_>>()),
            "Value is not accepted. Valid values: 1, \"x\", null."
        );
    }
}
