//! The settings tree: `Value` variants wrapped in described `Node`s.
//!
//! A parsed settings document is a tree of `Node`s. Every node holds a
//! `Value` plus the comment text that preceded its key in the source, if any.

use std::collections::BTreeMap;

use crate::{Error, Path};

/// The data carried by a node.
///
/// # Design Notes
///
/// - Uses `BTreeMap` so object iteration is deterministic
/// - Integers and floats are kept apart; the parser decides by the literal
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// JSON `null`.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Signed 64-bit integer scalar.
    Integer(i64),
    /// 64-bit floating point scalar.
    Float(f64),
    /// UTF-8 string scalar.
    String(String),
    /// Ordered sequence of nodes.
    Array(Vec<Node>),
    /// Keyed children.
    Object(BTreeMap<String, Node>),
}

impl Value {
    /// Create an empty object.
    pub fn object() -> Self {
        Value::Object(BTreeMap::new())
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// True for `Bool`, `Integer`, `Float` and `String`.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Short name of the variant, for log messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// A value together with the comment that described it in the source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub value: Value,
    /// Raw comment text, markers included. Multiple comments are joined
    /// with `\n`.
    pub description: Option<String>,
}

impl Node {
    /// A node with no description.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            description: None,
        }
    }

    /// A node carrying a description.
    pub fn described(value: Value, description: impl Into<String>) -> Self {
        Self {
            value,
            description: Some(description.into()),
        }
    }

    /// An empty object node.
    pub fn object() -> Self {
        Self::new(Value::object())
    }

    /// Walk object children segment by segment.
    ///
    /// Returns `None` when a segment is missing or when a non-object node is
    /// reached before the last segment.
    pub fn get(&self, path: &Path) -> Option<&Node> {
        let mut current = self;
        for component in path.iter() {
            current = match &current.value {
                Value::Object(map) => map.get(component)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable counterpart of [`Node::get`].
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let mut current = self;
        for component in path.iter() {
            current = match &mut current.value {
                Value::Object(map) => map.get_mut(component)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Get the node at `path`, creating missing objects along the way.
    ///
    /// The final node is created as `Null` when absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::PathConflict` if an existing ancestor is not an
    /// object.
    pub fn entry_mut(&mut self, path: &Path) -> Result<&mut Node, Error> {
        let mut current = self;
        for (i, component) in path.iter().enumerate() {
            let is_last = i + 1 == path.len();
            current = match &mut current.value {
                Value::Object(map) => map.entry(component.clone()).or_insert_with(|| {
                    if is_last {
                        Node::default()
                    } else {
                        Node::object()
                    }
                }),
                _ => {
                    return Err(Error::PathConflict { path: path.clone() });
                }
            };
        }
        Ok(current)
    }

    /// Remove the node at `path`, returning it if it existed.
    pub fn remove(&mut self, path: &Path) -> Option<Node> {
        let (parent, leaf) = path.split_leaf()?;
        match &mut self.get_mut(&parent)?.value {
            Value::Object(map) => map.remove(leaf),
            _ => None,
        }
    }

    /// Drop descriptions from this node and all its descendants.
    pub fn strip_descriptions(&mut self) {
        self.description = None;
        match &mut self.value {
            Value::Array(items) => items.iter_mut().for_each(Node::strip_descriptions),
            Value::Object(map) => map.values_mut().for_each(Node::strip_descriptions),
            _ => {}
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::new(value)
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(|item| Node::new(item.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn sample() -> Node {
        let mut root = Node::object();
        root.entry_mut(&path!(".sources.Sphere.Radius")).unwrap().value = Value::Float(2.5);
        root.entry_mut(&path!(".sources.Sphere.Center")).unwrap().value =
            Value::from(vec![1.0, 2.0, 4.0]);
        root
    }

    #[test]
    fn get_nested_node() {
        let root = sample();
        assert_eq!(
            root.get(&path!(".sources.Sphere.Radius")).map(|n| &n.value),
            Some(&Value::Float(2.5))
        );
        assert!(root.get(&path!(".sources.Sphere")).unwrap().value.is_object());
        assert!(root.get(&path!(".sources.Cone")).is_none());
    }

    #[test]
    fn get_through_scalar_fails() {
        let root = sample();
        assert!(root.get(&path!(".sources.Sphere.Radius.x")).is_none());
        // Arrays are leaves for path walking
        assert!(root.get(&path!(".sources.Sphere.Center.0")).is_none());
    }

    #[test]
    fn root_path_returns_self() {
        let root = sample();
        assert_eq!(root.get(&Path::root()), Some(&root));
    }

    #[test]
    fn entry_mut_creates_intermediate_objects() {
        let mut root = Node::object();
        let leaf = root.entry_mut(&path!(".a.b.c")).unwrap();
        assert!(leaf.value.is_null());
        assert!(root.get(&path!(".a")).unwrap().value.is_object());
        assert!(root.get(&path!(".a.b")).unwrap().value.is_object());
    }

    #[test]
    fn entry_mut_conflicts_on_scalar_ancestor() {
        let mut root = sample();
        let err = root
            .entry_mut(&path!(".sources.Sphere.Radius.inner"))
            .unwrap_err();
        assert!(matches!(err, Error::PathConflict { .. }));
    }

    #[test]
    fn remove_works() {
        let mut root = sample();
        let removed = root.remove(&path!(".sources.Sphere.Radius")).unwrap();
        assert_eq!(removed.value, Value::Float(2.5));
        assert!(root.get(&path!(".sources.Sphere.Radius")).is_none());
        assert!(root.get(&path!(".sources.Sphere.Center")).is_some());
        assert!(root.remove(&path!(".missing.key")).is_none());
        assert!(root.remove(&Path::root()).is_none());
    }

    #[test]
    fn strip_descriptions_is_recursive() {
        let mut inner = std::collections::BTreeMap::new();
        inner.insert(
            "k".to_string(),
            Node::described(Value::Integer(1), "// k"),
        );
        let mut root = Node::described(Value::Object(inner), "// root");
        root.strip_descriptions();
        assert!(root.description.is_none());
        assert!(root.get(&path!(".k")).unwrap().description.is_none());
    }

    #[test]
    fn scalar_classification() {
        assert!(Value::from(1i64).is_scalar());
        assert!(Value::from("s").is_scalar());
        assert!(!Value::Null.is_scalar());
        assert!(!Value::array().is_scalar());
        assert_eq!(Value::object().kind_name(), "object");
    }
}
