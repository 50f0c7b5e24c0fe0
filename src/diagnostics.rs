//! Diagnostics reported by validation.
use serde::Serialize;
use std::fmt;

/// Severity of a [`Diagnostic`].
///
/// Validation reports `Warning` by default so that schema problems do not
/// drown out hard syntax errors in editors; see
/// [`Document::validate_with_severity`](crate::Document::validate_with_severity)
/// to promote them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A hard violation.
    Error,
    /// The default for schema findings.
    Warning,
    /// Informational only.
    Info,
    /// A subtle hint, usually rendered unobtrusively.
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
            Severity::Hint => f.write_str("hint"),
        }
    }
}

/// Stable machine-readable codes attached to certain diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticCode {
    /// The value matched none of the values listed in `enum` (or `const`).
    EnumValueMismatch,
}

/// A single validation finding, positioned within the source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Byte offset of the first character the finding covers.
    pub offset: u32,
    /// Length of the covered span.
    pub length: u32,
    /// Severity the finding is reported with.
    pub severity: Severity,
    /// Stable code, for findings that editors dispatch on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<DiagnosticCode>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn new(
        offset: u32,
        length: u32,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            offset,
            length,
            severity,
            code: None,
            message: message.into(),
        }
    }

    pub(crate) fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, DiagnosticCode, Severity};

    #[test]
    fn serialization() {
        let diagnostic = Diagnostic::new(4, 2, Severity::Warning, "Value must be 1.")
            .with_code(DiagnosticCode::EnumValueMismatch);
        let serialized = serde_json::to_value(&diagnostic).expect("Serializable");
        assert_eq!(
            serialized,
            serde_json::json!({
                "offset": 4,
                "length": 2,
                "severity": "warning",
                "code": "EnumValueMismatch",
                "message": "Value must be 1.",
            })
        );
    }

    #[test]
    fn code_is_omitted_when_absent() {
        let diagnostic = Diagnostic::new(0, 1, Severity::Warning, "Missing property \"a\".");
        let serialized = serde_json::to_string(&diagnostic).expect("Serializable");
        assert!(!serialized.contains("code"));
    }
}
