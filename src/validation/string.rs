//! String checks: `minLength`, `maxLength`, `pattern`, `format`.
use crate::ast::Node;
use crate::schema::pattern_error_message;
use crate::validation::format::check_format;
use crate::validation::result::ValidationResult;
use crate::validation::Validator;
use serde_json::{Map, Value};

impl Validator<'_> {
    pub(super) fn validate_string(
        &self,
        node: &Node,
        value: &str,
        schema: &Map<String, Value>,
        result: &mut ValidationResult<'_>,
    ) {
        // lengths count Unicode code points
        if let Some(limit) = schema.get("minLength").and_then(Value::as_u64) {
            if (bytecount::num_chars(value.as_bytes()) as u64) < limit {
                result.problems.push(self.problem(
                    node,
                    format!("String is shorter than the minimum length of {}.", limit),
                ));
            }
        }
        if let Some(limit) = schema.get("maxLength").and_then(Value::as_u64) {
            if (bytecount::num_chars(value.as_bytes()) as u64) > limit {
                result.problems.push(self.problem(
                    node,
                    format!("String is longer than the maximum length of {}.", limit),
                ));
            }
        }
        if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
            // an invalid pattern disables the check
            if let Ok(regex) = fancy_regex::Regex::new(pattern) {
                if let Ok(false) = regex.is_match(value) {
                    let message = match pattern_error_message(schema) {
                        Some(message) => message.to_string(),
                        None => format!("String does not match the pattern of \"{}\".", pattern),
                    };
                    result.problems.push(self.problem(node, message));
                }
            }
        }
        if let Some(format) = schema.get("format").and_then(Value::as_str) {
            if let Some(default_message) = check_format(format, value) {
                let message = match pattern_error_message(schema) {
                    Some(message) => message.to_string(),
                    None => default_message,
                };
                result.problems.push(self.problem(node, message));
            }
        }
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

    #[test_case(&json!({"minLength": 4}), &["String is shorter than the minimum length of 4."])]
    #[test_case(&json!({"maxLength": 2}), &["String is longer than the maximum length of 2."])]
    #[test_case(&json!({"minLength": 3, "maxLength": 3}), &[])]
    #[test_case(&json!({"pattern": "^a"}), &[])]
    #[test_case(&json!({"pattern": "^b"}), &["String does not match the pattern of \"^b\"."])]
    fn lengths_and_patterns(schema: &Value, expected: &[&str]) {
        assert_eq!(messages(r#""abc""#, schema), expected);
    }

    #[test]
    fn length_counts_code_points() {
        // four code points, ten UTF-8 bytes
        assert!(messages(r#""déjà""#, &json!({"maxLength": 4})).is_empty());
        assert!(!messages(r#""déjà""#, &json!({"minLength": 5})).is_empty());
    }

    #[test]
    fn invalid_patterns_are_ignored() {
        assert!(messages(r#""abc""#, &json!({"pattern": "("})).is_empty());
    }

    #[test]
    fn backreference_patterns_are_supported() {
        assert!(messages(r#""abab""#, &json!({"pattern": r"^(ab)\1$"})).is_empty());
        assert_eq!(
            messages(r#""abba""#, &json!({"pattern": r"^(ab)\1$"})).len(),
            1
        );
    }

    #[test]
    fn pattern_error_message_overrides() {
        assert_eq!(
            messages(
                r#""abc""#,
                &json!({"pattern": "^b", "patternErrorMessage": "Must start with b."})
            ),
            &["Must start with b."]
        );
        assert_eq!(
            messages(r#""abc""#, &json!({"pattern": "^b", "errorMessage": "Nope."})),
            &["Nope."]
        );
    }

    #[test]
    fn format_failures_report() {
        assert_eq!(
            messages(r#""not a color""#, &json!({"format": "color-hex"})),
            &["Invalid color format. Use #RGB, #RGBA, #RRGGBB or #RRGGBBAA."]
        );
        assert!(messages(r##""#aabbcc""##, &json!({"format": "color-hex"})).is_empty());
        assert_eq!(
            messages(r#""nobody""#, &json!({"format": "email"})),
            &["String is not an e-mail address."]
        );
    }
}
