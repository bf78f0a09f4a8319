//! SettingsStore: prioritized layers plus a live override layer.
//!
//! Resolution is done independently for every queried path. The live layer
//! is consulted first, then loaded layers from highest to lowest priority.
//! The first layer whose tree contains the path wins and its node is
//! returned whole; subtrees are never merged across layers.

use serde::Deserialize;
use strata_core_store::{Error, Node, Parser, ParserOptions, Path, Value};

use crate::layer::{Layer, LayerId, LayerSource, Resolved};

/// Store configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub parser: ParserOptions,
}

impl StoreOptions {
    /// Load options from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// A layered settings store.
///
/// # Example
///
/// ```rust
/// use strata_settings_store::SettingsStore;
///
/// let mut store = SettingsStore::new();
/// store.add_layer(r#"{ "sources": { "Sphere": { "Radius": 0.5 } } }"#, 10.0).unwrap();
/// store.add_layer(r#"{ "sources": { "Sphere": { "Radius": 2.0 } } }"#, 20.0).unwrap();
///
/// assert_eq!(store.get_as_double(".sources.Sphere.Radius", 0, 0.0), 2.0);
///
/// // Live writes outrank every loaded layer
/// store.set_setting(".sources.Sphere.Radius", 3.0).unwrap();
/// assert_eq!(store.get_as_double(".sources.Sphere.Radius", 0, 0.0), 3.0);
/// ```
#[derive(Clone, Debug)]
pub struct SettingsStore {
    /// Loaded layers in precedence order: priority descending, newest first
    /// among equal priorities.
    layers: Vec<Layer>,
    pub(crate) live: Node,
    next_id: u64,
    parser: Parser,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            layers: Vec::new(),
            live: Node::object(),
            next_id: 0,
            parser: Parser::new(options.parser),
        }
    }

    /// Parse `text` and add it as a layer at `priority`.
    ///
    /// Larger priorities win. Among equal priorities the most recently added
    /// layer wins. On error the store is left unchanged.
    pub fn add_layer(&mut self, text: &str, priority: f64) -> Result<LayerId, Error> {
        check_priority(priority)?;
        let root = self.parser.parse(text)?;
        self.insert_layer(root, priority)
    }

    /// Add an already-built tree as a layer. The root must be an object.
    pub fn add_layer_node(&mut self, root: Node, priority: f64) -> Result<LayerId, Error> {
        check_priority(priority)?;
        if !root.value.is_object() {
            return Err(Error::InvalidLayer {
                message: format!("layer root is {}, expected object", root.value.kind_name()),
            });
        }
        self.insert_layer(root, priority)
    }

    fn insert_layer(&mut self, root: Node, priority: f64) -> Result<LayerId, Error> {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        let position = self
            .layers
            .iter()
            .position(|layer| layer.priority() <= priority)
            .unwrap_or(self.layers.len());
        self.layers.insert(position, Layer::new(id, priority, root));

        log::debug!(
            "added {} at priority {} ({} loaded)",
            id,
            priority,
            self.layers.len()
        );
        Ok(id)
    }

    /// Drop one loaded layer. Returns `false` if no such layer exists.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id() != id);
        let removed = self.layers.len() != before;
        if removed {
            log::debug!("removed {}", id);
        }
        removed
    }

    /// Drop every loaded layer and empty the live layer.
    pub fn clear_all(&mut self) {
        log::debug!("clearing {} loaded layers and the live layer", self.layers.len());
        self.layers.clear();
        self.live = Node::object();
    }

    /// Number of loaded layers (the live layer is not counted).
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Loaded layers in precedence order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Root of the live layer.
    pub fn live_layer(&self) -> &Node {
        &self.live
    }

    /// Resolve a dotted path string.
    ///
    /// Unparseable paths resolve to nothing.
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_>> {
        match Path::parse(path) {
            Ok(path) => self.resolve_path(&path),
            Err(e) => {
                log::debug!("not resolving '{}': {}", path, e);
                None
            }
        }
    }

    /// Resolve a parsed path.
    ///
    /// The root path resolves like any other, except that a layer whose
    /// root object is empty does not define it.
    pub fn resolve_path(&self, path: &Path) -> Option<Resolved<'_>> {
        let defines = |node: &&Node| !path.is_empty() || !is_empty_object(node);

        if let Some(node) = self.live.get(path).filter(defines) {
            log::trace!("{} resolved in live layer", path);
            return Some(Resolved {
                node,
                source: LayerSource::Live,
            });
        }

        let resolved = self.layers.iter().find_map(|layer| {
            layer.lookup(path).filter(defines).map(|node| Resolved {
                node,
                source: LayerSource::Loaded {
                    id: layer.id(),
                    priority: layer.priority(),
                },
            })
        });
        if resolved.is_none() {
            log::trace!("{} not defined in any layer", path);
        }
        resolved
    }

    /// True if any layer defines `path`.
    pub fn has(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// True if some loaded layer (ignoring the live layer) defines `path`.
    pub fn defined_in_loaded(&self, path: &Path) -> bool {
        self.layers.iter().any(|layer| layer.lookup(path).is_some())
    }

    /// The comment that preceded the winning node's key in its source
    /// document. Live layer entries have none.
    pub fn get_description(&self, path: &str) -> Option<&str> {
        self.resolve(path)?.description()
    }
}

fn is_empty_object(node: &Node) -> bool {
    matches!(&node.value, Value::Object(map) if map.is_empty())
}

fn check_priority(priority: f64) -> Result<(), Error> {
    if priority.is_nan() {
        Err(Error::InvalidPriority { priority })
    } else {
        Ok(())
    }
}
