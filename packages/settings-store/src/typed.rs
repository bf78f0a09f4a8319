//! Typed reads of resolved settings.
//!
//! A resolved scalar is treated as a one-element vector and an array as a
//! vector of its elements. Reads never fail: a missing path, an index out of
//! range or a value of the wrong type all yield the caller's default.

use strata_core_store::{Node, Value};

use crate::store::SettingsStore;

/// Conversion from a stored scalar to a Rust type.
///
/// Returns `None` when the value cannot represent `Self`.
pub trait FromSetting: Sized {
    fn from_setting(value: &Value) -> Option<Self>;
}

impl FromSetting for i64 {
    fn from_setting(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            // Truncates toward zero, like a C cast
            Value::Float(f) if f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                Some(f.trunc() as i64)
            }
            _ => None,
        }
    }
}

impl FromSetting for i32 {
    fn from_setting(value: &Value) -> Option<Self> {
        i64::from_setting(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromSetting for f64 {
    fn from_setting(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromSetting for String {
    fn from_setting(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromSetting for bool {
    fn from_setting(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Element `index` of a resolved node viewed as a vector.
pub(crate) fn element(node: &Node, index: usize) -> Option<&Value> {
    match &node.value {
        Value::Array(items) => items.get(index).map(|item| &item.value),
        scalar if scalar.is_scalar() && index == 0 => Some(scalar),
        _ => None,
    }
}

/// Number of elements in a resolved node viewed as a vector.
pub(crate) fn element_count(node: &Node) -> usize {
    match &node.value {
        Value::Array(items) => items.len(),
        scalar if scalar.is_scalar() => 1,
        _ => 0,
    }
}

impl SettingsStore {
    /// Read element `index` of `path` as `T`.
    pub fn get_as<T: FromSetting>(&self, path: &str, index: usize) -> Option<T> {
        let resolved = self.resolve(path)?;
        element(resolved.node, index).and_then(T::from_setting)
    }

    pub fn get_as_int(&self, path: &str, index: usize, default: i64) -> i64 {
        self.get_as(path, index).unwrap_or(default)
    }

    pub fn get_as_double(&self, path: &str, index: usize, default: f64) -> f64 {
        self.get_as(path, index).unwrap_or(default)
    }

    pub fn get_as_string(&self, path: &str, index: usize, default: &str) -> String {
        self.get_as(path, index)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn get_as_bool(&self, path: &str, index: usize, default: bool) -> bool {
        self.get_as(path, index).unwrap_or(default)
    }

    /// Read every element of `path` as `T`.
    ///
    /// Returns `None` if the path is unresolved, is not a scalar or array, or
    /// if any element fails to convert.
    pub fn get_vector<T: FromSetting>(&self, path: &str) -> Option<Vec<T>> {
        let resolved = self.resolve(path)?;
        vector_of(resolved.node)
    }

    /// 0 when unresolved or not a value, 1 for a scalar, the length for an
    /// array.
    pub fn get_number_of_elements(&self, path: &str) -> usize {
        self.resolve(path)
            .map(|resolved| element_count(resolved.node))
            .unwrap_or(0)
    }
}

pub(crate) fn vector_of<T: FromSetting>(node: &Node) -> Option<Vec<T>> {
    match &node.value {
        Value::Array(items) => items
            .iter()
            .map(|item| T::from_setting(&item.value))
            .collect(),
        scalar if scalar.is_scalar() => T::from_setting(scalar).map(|v| vec![v]),
        _ => None,
    }
}
