//! Collection of the schemas that apply to each document node.
//!
//! Editors drive hover and completion from these records: for a given cursor
//! position they ask which schemas were matched against the node under it.
//! Pure validation uses the no-op variant, which keeps the engine on a
//! single code path while collecting nothing.
use crate::ast::{Document, NodeId};
use serde_json::Value;

/// A schema the engine attempted to match against a node.
///
/// `inverted` flips every time the record crosses a `not` boundary, so a
/// record with `inverted == true` describes what the node must *not* look
/// like.
#[derive(Debug, Clone, Copy)]
pub struct ApplicableSchema<'s> {
    /// The document node the schema was matched against.
    pub node: NodeId,
    /// The schema, pointing into the caller's schema value.
    pub schema: &'s Value,
    /// Polarity: `true` under an odd number of `not` ancestors.
    pub inverted: bool,
}

#[derive(Debug)]
pub(crate) enum SchemaCollector<'s> {
    Recording {
        /// Only nodes whose span contains this offset are recorded;
        /// `None` records everything.
        focus_offset: Option<u32>,
        exclude: Option<NodeId>,
        schemas: Vec<ApplicableSchema<'s>>,
    },
    /// Includes everything, collects nothing. Stateless, so it can be
    /// instantiated freely wherever only diagnostics are wanted.
    NoOp,
}

impl<'s> SchemaCollector<'s> {
    pub(crate) fn recording(focus_offset: Option<u32>, exclude: Option<NodeId>) -> Self {
        SchemaCollector::Recording {
            focus_offset,
            exclude,
            schemas: Vec::new(),
        }
    }

    /// Whether validation should descend into `node` at all.
    pub(crate) fn include(&self, document: &Document, node: NodeId) -> bool {
        match self {
            SchemaCollector::Recording {
                focus_offset,
                exclude,
                ..
            } => {
                Some(node) != *exclude
                    && focus_offset
                        .map_or(true, |offset| document.contains_offset(node, offset, false))
            }
            SchemaCollector::NoOp => true,
        }
    }

    pub(crate) fn add(&mut self, record: ApplicableSchema<'s>) {
        if let SchemaCollector::Recording { schemas, .. } = self {
            schemas.push(record);
        }
    }

    pub(crate) fn merge(&mut self, other: SchemaCollector<'s>) {
        if let SchemaCollector::Recording { schemas, .. } = self {
            schemas.extend(other.into_schemas());
        }
    }

    /// An independent collector for evaluating an alternative. Sub-collectors
    /// drop the focus restriction so that a branch can be recorded wholesale
    /// once it wins; the exclusion carries over.
    pub(crate) fn new_sub(&self) -> SchemaCollector<'s> {
        match self {
            SchemaCollector::Recording { exclude, .. } => SchemaCollector::Recording {
                focus_offset: None,
                exclude: *exclude,
                schemas: Vec::new(),
            },
            SchemaCollector::NoOp => SchemaCollector::NoOp,
        }
    }

    pub(crate) fn into_schemas(self) -> Vec<ApplicableSchema<'s>> {
        match self {
            SchemaCollector::Recording { schemas, .. } => schemas,
            SchemaCollector::NoOp => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApplicableSchema, SchemaCollector};
    use crate::parser::parse;
    use serde_json::json;

    #[test]
    fn focus_restricts_inclusion() {
        // offsets: {"a": 1}
        let document = parse(r#"{"a": 1}"#).expect("Valid JSON");
        let root = document.root().expect("Has a root");
        let value = document.node_at_offset(6, false).expect("The number");

        let collector = SchemaCollector::recording(Some(6), None);
        assert!(collector.include(&document, root));
        assert!(collector.include(&document, value));

        let outside = SchemaCollector::recording(Some(7), None);
        assert!(!outside.include(&document, value));
    }

    #[test]
    fn exclusion_carries_into_subcollectors() {
        let document = parse(r#"{"a": 1}"#).expect("Valid JSON");
        let root = document.root().expect("Has a root");
        let collector = SchemaCollector::recording(Some(0), Some(root));
        let sub = collector.new_sub();
        assert!(!sub.include(&document, root));
        // the focus restriction is dropped in subs
        let value = document.node_at_offset(6, false).expect("The number");
        assert!(sub.include(&document, value));
    }

    #[test]
    fn noop_includes_and_discards() {
        let document = parse("1").expect("Valid JSON");
        let root = document.root().expect("Has a root");
        let schema = json!({});
        let mut collector = SchemaCollector::NoOp;
        assert!(collector.include(&document, root));
        collector.add(ApplicableSchema {
            node: root,
            schema: &schema,
            inverted: false,
        });
        assert!(collector.into_schemas().is_empty());
    }
}
