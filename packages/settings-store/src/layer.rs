//! Settings layers and resolution results.

use std::fmt;

use strata_core_store::{Node, Path, Value};

/// Identifies a loaded layer for the lifetime of its store.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// An immutable parsed document ranked by priority.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    priority: f64,
    root: Node,
}

impl Layer {
    pub(crate) fn new(id: LayerId, priority: f64, root: Node) -> Self {
        Self { id, priority, root }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The node at `path` if this layer defines it.
    pub fn lookup(&self, path: &Path) -> Option<&Node> {
        self.root.get(path)
    }
}

/// Which layer a resolved node came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerSource {
    /// The in-place writable layer above every loaded layer.
    Live,
    /// A document added with `add_layer`.
    Loaded { id: LayerId, priority: f64 },
}

impl LayerSource {
    pub fn is_live(&self) -> bool {
        matches!(self, LayerSource::Live)
    }
}

/// The winning node for a path, borrowed from its layer.
#[derive(Clone, Copy, Debug)]
pub struct Resolved<'a> {
    pub node: &'a Node,
    pub source: LayerSource,
}

impl<'a> Resolved<'a> {
    pub fn value(&self) -> &'a Value {
        &self.node.value
    }

    pub fn description(&self) -> Option<&'a str> {
        self.node.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core_store::{parse, path};

    #[test]
    fn lookup_walks_objects() {
        let layer = Layer::new(LayerId(3), 1.0, parse(r#"{"a": {"b": 1}}"#).unwrap());
        assert_eq!(layer.id(), LayerId(3));
        assert_eq!(layer.priority(), 1.0);
        assert_eq!(
            layer.lookup(&path!(".a.b")).map(|n| &n.value),
            Some(&Value::Integer(1))
        );
        assert!(layer.lookup(&path!(".a.c")).is_none());
        assert!(layer.lookup(&path!(".a.b.c")).is_none());
    }

    #[test]
    fn resolved_accessors() {
        let node = Node::described(Value::Integer(4), "// four");
        let resolved = Resolved {
            node: &node,
            source: LayerSource::Live,
        };
        assert_eq!(resolved.value(), &Value::Integer(4));
        assert_eq!(resolved.description(), Some("// four"));
        assert!(resolved.source.is_live());
    }

    #[test]
    fn layer_id_display() {
        assert_eq!(LayerId(7).to_string(), "layer#7");
    }
}
