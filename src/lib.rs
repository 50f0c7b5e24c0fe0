//! # docschema
//!
//! Structural validation of parsed JSON and YAML documents against
//! JSON-Schema-style schemas, built for editor tooling: diagnostics carry
//! source offsets, `anyOf`/`oneOf` report the most plausible branch rather
//! than every failure, and a side channel records which schemas apply to
//! which nodes for hover, completion and go-to-definition.
//!
//! The engine is pure and deterministic: it performs no I/O, treats the
//! document tree and the schema value as read-only, and produces identical
//! diagnostics in identical order for the same `(document, schema)` pair.
//! Schemas arrive as plain [`serde_json::Value`]s with `$ref` already
//! expanded by the schema layer; malformed schema fields disable their
//! checks instead of failing the run.
//!
//! ## Usage example
//!
//! ```rust
//! use docschema::parse;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), docschema::ParseError> {
//! let document = parse(r#"{"name": 1}"#)?;
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//! });
//! let diagnostics = document.validate(&schema);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].message, "Incorrect type. Expected \"string\".");
//! # Ok(())
//! # }
//! ```
//!
//! Production parsers (the YAML front end in particular) construct documents
//! through [`TreeBuilder`] instead of [`parse`], attaching the offsets of
//! their own tokenizer.
#![warn(
    clippy::doc_markdown,
    clippy::explicit_iter_loop,
    clippy::map_unwrap_or,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::print_stdout,
    clippy::redundant_closure,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    variant_size_differences
)]
mod ast;
mod diagnostics;
mod document;
mod equal;
mod parser;
mod paths;
mod schema;
mod validation;

pub use ast::{Document, Node, NodeId, NodeKind, TreeBuilder};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};
pub use parser::{parse, ParseError};
pub use paths::{NodePath, PathChunk};
pub use validation::collector::ApplicableSchema;

use serde_json::Value;

/// A shortcut for checking `document` against `schema`.
///
/// ```rust
/// use docschema::{is_valid, parse};
/// use serde_json::json;
///
/// let document = parse("\"foo\"").unwrap();
/// assert!(is_valid(&json!({"maxLength": 5}), &document));
/// assert!(!is_valid(&json!({"maxLength": 2}), &document));
/// ```
#[must_use]
pub fn is_valid(schema: &Value, document: &Document) -> bool {
    document.validate(schema).is_empty()
}
