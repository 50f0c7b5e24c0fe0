//! Paths from the document root to individual nodes.
use std::fmt::{self, Write};

/// Path to a node, as a sequence of property names and array indices.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodePath(Vec<PathChunk>);

impl NodePath {
    pub(crate) fn new(chunks: Vec<PathChunk>) -> Self {
        NodePath(chunks)
    }

    /// The individual path components, outermost first.
    pub fn chunks(&self) -> &[PathChunk] {
        &self.0
    }

    /// The path as a vector of strings. Each component is casted to `String`.
    pub fn into_vec(self) -> Vec<String> {
        self.0
            .iter()
            .map(|chunk| match chunk {
                PathChunk::Name(value) => value.to_string(),
                PathChunk::Index(idx) => idx.to_string(),
            })
            .collect()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.0 {
            f.write_char('/')?;
            match chunk {
                PathChunk::Name(value) => f.write_str(value)?,
                PathChunk::Index(idx) => write!(f, "{}", idx)?,
            }
        }
        Ok(())
    }
}

/// A single component of a [`NodePath`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathChunk {
    /// A property name within an object.
    Name(String),
    /// An index within an array.
    Index(usize),
}

impl From<String> for PathChunk {
    #[inline]
    fn from(value: String) -> Self {
        PathChunk::Name(value)
    }
}

impl From<usize> for PathChunk {
    #[inline]
    fn from(value: usize) -> Self {
        PathChunk::Index(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{NodePath, PathChunk};

    #[test]
    fn display() {
        let path = NodePath::new(vec![
            PathChunk::Name("servers".to_string()),
            PathChunk::Index(2),
            PathChunk::Name("host".to_string()),
        ]);
        assert_eq!(path.to_string(), "/servers/2/host");
        assert_eq!(NodePath::default().to_string(), "");
    }

    #[test]
    fn into_vec() {
        let path = NodePath::new(vec![PathChunk::Name("a".to_string()), PathChunk::Index(0)]);
        assert_eq!(path.into_vec(), vec!["a".to_string(), "0".to_string()]);
    }
}
