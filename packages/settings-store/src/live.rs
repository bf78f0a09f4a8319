//! Writes into the live layer.
//!
//! Every write lands in the live layer only; loaded layers are never
//! modified. A written setting is always stored as an array so that writes
//! to different indices accumulate.

use strata_core_store::convert::{node_to_json, to_json_string_pretty};
use strata_core_store::{Error, Node, Path, Value};

use crate::store::SettingsStore;

/// A value that can be written with `set_setting`.
pub trait SettingValue {
    fn into_value(self) -> Value;

    /// Filler for slots created when an array grows past its end.
    fn zero() -> Value;
}

impl SettingValue for i32 {
    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn zero() -> Value {
        Value::Integer(0)
    }
}

impl SettingValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn zero() -> Value {
        Value::Integer(0)
    }
}

impl SettingValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn zero() -> Value {
        Value::Float(0.0)
    }
}

impl SettingValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn zero() -> Value {
        Value::Bool(false)
    }
}

impl SettingValue for &str {
    fn into_value(self) -> Value {
        Value::from(self)
    }

    fn zero() -> Value {
        Value::String(String::new())
    }
}

impl SettingValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn zero() -> Value {
        Value::String(String::new())
    }
}

/// Longest array an indexed live write may create.
pub const MAX_ELEMENTS: usize = 1 << 16;

impl SettingsStore {
    /// Write `value` as element 0 of `path`, keeping any later elements.
    pub fn set_setting<V: SettingValue>(&mut self, path: &str, value: V) -> Result<(), Error> {
        self.set_setting_at(path, 0, value)
    }

    /// Write `value` as element `index` of `path` in the live layer.
    ///
    /// A scalar already at `path` becomes element 0 of a new array. An
    /// object or null at `path` is the target of the write and is replaced
    /// whole, subtree included. Only ancestors are protected: a non-object
    /// met on the way to `path` fails with `Error::PathConflict`. Missing
    /// intermediate objects are created.
    ///
    /// Missing slots before `index` are filled with the zero of `V`. An
    /// `index` at or beyond [`MAX_ELEMENTS`] fails with
    /// `Error::IndexOutOfRange` and leaves the live layer unchanged.
    pub fn set_setting_at<V: SettingValue>(
        &mut self,
        path: &str,
        index: usize,
        value: V,
    ) -> Result<(), Error> {
        let path = writable_path(path)?;
        if index >= MAX_ELEMENTS {
            return Err(Error::IndexOutOfRange {
                index,
                limit: MAX_ELEMENTS,
            });
        }
        let node = self.live.entry_mut(&path)?;

        let mut items = match std::mem::take(&mut node.value) {
            Value::Array(items) => items,
            scalar if scalar.is_scalar() => vec![Node::new(scalar)],
            _ => Vec::new(),
        };
        if items.len() <= index {
            items.resize_with(index + 1, || Node::new(V::zero()));
        }
        items[index] = Node::new(value.into_value());
        node.value = Value::Array(items);

        log::debug!("live {}[{}] written", path, index);
        Ok(())
    }

    /// Replace the live value at `path` with `node`.
    ///
    /// Descriptions are removed; live entries never carry them.
    pub fn set_node(&mut self, path: &str, mut node: Node) -> Result<(), Error> {
        let path = writable_path(path)?;
        node.strip_descriptions();
        *self.live.entry_mut(&path)? = node;
        log::debug!("live {} replaced", path);
        Ok(())
    }

    /// Remove `path` from the live layer. Loaded layers are untouched, so a
    /// lower layer's value may become visible again.
    pub fn remove_setting(&mut self, path: &str) -> bool {
        match Path::parse(path) {
            Ok(path) => self.live.remove(&path).is_some(),
            Err(_) => false,
        }
    }

    /// Snapshot of the live layer as JSON.
    pub fn live_to_json(&self) -> serde_json::Value {
        node_to_json(&self.live)
    }

    /// Pretty-printed JSON text of the live layer.
    pub fn live_to_json_string(&self) -> String {
        to_json_string_pretty(&self.live)
    }
}

fn writable_path(path: &str) -> Result<Path, Error> {
    let path = Path::parse(path)?;
    if path.is_empty() {
        return Err(Error::InvalidPath {
            message: "cannot write to the root of the live layer".to_string(),
        });
    }
    Ok(path)
}
