//! The document AST: typed nodes carrying source offsets.
//!
//! Trees are produced by a parser (see [`crate::parser`] for the built-in
//! JSON one) through [`TreeBuilder`] and are immutable afterwards; validation
//! and schema matching are read-only walks. Nodes live in an arena owned by
//! the [`Document`] and refer to each other by [`NodeId`], so the parent
//! back-reference is a plain lookup aid rather than shared ownership.
use crate::paths::{NodePath, PathChunk};
use serde_json::{Map, Number, Value};

/// Index of a node within its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single syntactic construct of the source document.
#[derive(Debug)]
pub struct Node {
    /// Byte offset of the first character of the node.
    pub offset: u32,
    /// Length of the source span, including delimiters such as quotes.
    pub length: u32,
    /// The owning node, `None` at the root.
    pub parent: Option<NodeId>,
    /// Type-specific payload.
    pub kind: NodeKind,
}

impl Node {
    /// Offset one past the last character of the node.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.length
    }
}

/// Payload of a [`Node`].
#[derive(Debug)]
pub enum NodeKind {
    /// The `null` literal.
    Null,
    /// A boolean literal.
    Boolean(bool),
    /// A numeric literal.
    Number {
        /// The numeric value.
        value: f64,
        /// Whether the source lexical form had no fraction and no exponent.
        is_integer: bool,
    },
    /// The decoded (unescaped) string value.
    String(String),
    /// An ordered sequence of values.
    Array {
        /// The element nodes, in source order.
        items: Vec<NodeId>,
    },
    /// An ordered sequence of properties.
    Object {
        /// The property nodes, in source order, duplicates included.
        properties: Vec<NodeId>,
    },
    /// A `key: value` entry; the value may be absent for partial input.
    Property {
        /// The key, always a string node.
        key: NodeId,
        /// The value, absent when the input breaks off after the key.
        value: Option<NodeId>,
        /// Absolute offset of the separator, `-1` when it is missing.
        colon_offset: i32,
    },
}

/// A parsed document: the node arena plus the root.
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    /// The root node, or `None` for an empty document.
    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node by id.
    ///
    /// Ids are only meaningful within the document that produced them;
    /// passing an id from another document panics or returns an arbitrary
    /// node.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// The deepest node whose span contains `offset`.
    ///
    /// With `include_right_bound`, a node whose span *ends* exactly at
    /// `offset` also counts as containing it; editors use this for cursors
    /// sitting right behind a token. Offsets outside the root yield `None`.
    pub fn node_at_offset(&self, offset: u32, include_right_bound: bool) -> Option<NodeId> {
        let root = self.root?;
        if !self.contains_offset(root, offset, include_right_bound) {
            return None;
        }
        let mut current = root;
        'descend: loop {
            for child in self.children(current) {
                if self.node(child).offset > offset {
                    break;
                }
                if self.contains_offset(child, offset, include_right_bound) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Pre-order traversal. Returning `false` from `visitor` skips the
    /// children of the current node; siblings are still visited.
    pub fn visit<F: FnMut(NodeId) -> bool>(&self, mut visitor: F) {
        if let Some(root) = self.root {
            self.visit_from(root, &mut visitor);
        }
    }

    fn visit_from(&self, id: NodeId, visitor: &mut impl FnMut(NodeId) -> bool) {
        if !visitor(id) {
            return;
        }
        for child in self.children(id) {
            self.visit_from(child, visitor);
        }
    }

    /// Convert the subtree rooted at `id` back into a plain value.
    ///
    /// Duplicate object keys collapse to the last occurrence; properties
    /// without a value are dropped. YAML merge keys (`<<`) are kept as
    /// ordinary properties.
    pub fn node_value(&self, id: NodeId) -> Value {
        match &self.node(id).kind {
            NodeKind::Null => Value::Null,
            NodeKind::Boolean(value) => Value::Bool(*value),
            NodeKind::Number { value, is_integer } => number_value(*value, *is_integer),
            NodeKind::String(value) => Value::String(value.clone()),
            NodeKind::Array { items } => {
                Value::Array(items.iter().map(|&item| self.node_value(item)).collect())
            }
            NodeKind::Object { properties } => {
                let mut map = Map::new();
                for &property in properties {
                    if let NodeKind::Property {
                        key,
                        value: Some(value),
                        ..
                    } = &self.node(property).kind
                    {
                        if let NodeKind::String(name) = &self.node(*key).kind {
                            map.insert(name.clone(), self.node_value(*value));
                        }
                    }
                }
                Value::Object(map)
            }
            NodeKind::Property { value, .. } => value
                .map(|value| self.node_value(value))
                .unwrap_or(Value::Null),
        }
    }

    /// The path of property names and array indices leading to `id`.
    pub fn node_path(&self, id: NodeId) -> NodePath {
        let mut chunks = Vec::new();
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            match &self.node(parent).kind {
                NodeKind::Property { key, .. } => {
                    if let NodeKind::String(name) = &self.node(*key).kind {
                        chunks.push(PathChunk::Name(name.clone()));
                    }
                }
                NodeKind::Array { items } => {
                    if let Some(index) = items.iter().position(|&item| item == current) {
                        chunks.push(PathChunk::Index(index));
                    }
                }
                _ => {}
            }
            current = parent;
        }
        chunks.reverse();
        NodePath::new(chunks)
    }

    pub(crate) fn contains_offset(
        &self,
        id: NodeId,
        offset: u32,
        include_right_bound: bool,
    ) -> bool {
        let node = self.node(id);
        (offset >= node.offset && offset < node.end())
            || (include_right_bound && offset == node.end())
    }

    pub(crate) fn children(&self, id: NodeId) -> Children<'_> {
        match &self.node(id).kind {
            NodeKind::Array { items } => Children::Slice(items.iter()),
            NodeKind::Object { properties } => Children::Slice(properties.iter()),
            NodeKind::Property { key, value, .. } => Children::Pair(Some(*key), *value),
            _ => Children::Empty,
        }
    }
}

fn number_value(value: f64, is_integer: bool) -> Value {
    if is_integer && value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        return Value::Number(Number::from(value as i64));
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Ordered child iterator over the different node shapes.
pub(crate) enum Children<'a> {
    Slice(std::slice::Iter<'a, NodeId>),
    Pair(Option<NodeId>, Option<NodeId>),
    Empty,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match self {
            Children::Slice(items) => items.next().copied(),
            Children::Pair(key, value) => key.take().or_else(|| value.take()),
            Children::Empty => None,
        }
    }
}

/// Assembles a [`Document`] bottom-up: children first, then the container
/// that owns them. Parent links are patched when a container is pushed.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// A `null` node.
    pub fn null(&mut self, offset: u32, length: u32) -> NodeId {
        self.push(offset, length, NodeKind::Null)
    }

    /// A boolean node.
    pub fn boolean(&mut self, offset: u32, length: u32, value: bool) -> NodeId {
        self.push(offset, length, NodeKind::Boolean(value))
    }

    /// A number node; `is_integer` reflects the source lexical form.
    pub fn number(&mut self, offset: u32, length: u32, value: f64, is_integer: bool) -> NodeId {
        self.push(offset, length, NodeKind::Number { value, is_integer })
    }

    /// A string node holding the decoded value; the span includes quotes.
    pub fn string(&mut self, offset: u32, length: u32, value: impl Into<String>) -> NodeId {
        self.push(offset, length, NodeKind::String(value.into()))
    }

    /// An array node owning `items`.
    pub fn array(&mut self, offset: u32, length: u32, items: Vec<NodeId>) -> NodeId {
        let id = self.push(offset, length, NodeKind::Array { items: Vec::new() });
        for &item in &items {
            self.adopt(item, id);
        }
        if let NodeKind::Array { items: slot } = &mut self.nodes[id.index()].kind {
            *slot = items;
        }
        id
    }

    /// A `key: value` entry. `colon_offset` is the absolute offset of the
    /// separator, or `-1` when the input breaks off before it.
    pub fn property(
        &mut self,
        offset: u32,
        length: u32,
        key: NodeId,
        value: Option<NodeId>,
        colon_offset: i32,
    ) -> NodeId {
        debug_assert!(
            matches!(self.nodes[key.index()].kind, NodeKind::String(_)),
            "property keys are string nodes"
        );
        let id = self.push(
            offset,
            length,
            NodeKind::Property {
                key,
                value,
                colon_offset,
            },
        );
        self.adopt(key, id);
        if let Some(value) = value {
            self.adopt(value, id);
        }
        id
    }

    /// An object node owning `properties` (property nodes only).
    pub fn object(&mut self, offset: u32, length: u32, properties: Vec<NodeId>) -> NodeId {
        debug_assert!(
            properties
                .iter()
                .all(|&p| matches!(self.nodes[p.index()].kind, NodeKind::Property { .. })),
            "object children are property nodes"
        );
        let id = self.push(
            offset,
            length,
            NodeKind::Object {
                properties: Vec::new(),
            },
        );
        for &property in &properties {
            self.adopt(property, id);
        }
        if let NodeKind::Object { properties: slot } = &mut self.nodes[id.index()].kind {
            *slot = properties;
        }
        id
    }

    /// Seal the tree with `root` as the document root.
    pub fn build(self, root: NodeId) -> Document {
        debug_assert!(self.nodes[root.index()].parent.is_none(), "root is unowned");
        Document {
            nodes: self.nodes,
            root: Some(root),
        }
    }

    pub(crate) fn end_of(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].end()
    }

    fn push(&mut self, offset: u32, length: u32, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            offset,
            length,
            parent: None,
            kind,
        });
        id
    }

    fn adopt(&mut self, child: NodeId, parent: NodeId) {
        let node = &mut self.nodes[child.index()];
        debug_assert!(node.parent.is_none(), "nodes have a single owner");
        node.parent = Some(parent);
    }
}
