//! Hydration: pushing resolved settings into the properties of an external
//! object, and capturing an object's property values back into the live
//! layer.
//!
//! An object exposes its settable properties through [`SettingsTarget`].
//! Settings for property `P` of an object named `N` in group `G` live at
//! `.G.N.P`.

use strata_core_store::{Error, Node, Path, Value};

use crate::store::SettingsStore;
use crate::typed::{element, element_count, FromSetting};

/// Element type of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Int,
    Double,
    String,
}

/// How many elements a property holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Variable,
}

impl Arity {
    fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => *n == count,
            Arity::Variable => true,
        }
    }
}

/// Declaration of one settable property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub kind: ElementKind,
    pub arity: Arity,
    /// Named values an `Int` property also accepts as strings.
    pub enumeration: Vec<(String, i64)>,
    /// Whether `capture` writes this property.
    pub persistent: bool,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, kind: ElementKind, arity: Arity) -> Self {
        Self {
            name: name.into(),
            kind,
            arity,
            enumeration: Vec::new(),
            persistent: true,
        }
    }

    pub fn int(name: impl Into<String>, count: usize) -> Self {
        Self::new(name, ElementKind::Int, Arity::Exactly(count))
    }

    pub fn double(name: impl Into<String>, count: usize) -> Self {
        Self::new(name, ElementKind::Double, Arity::Exactly(count))
    }

    pub fn strings(name: impl Into<String>) -> Self {
        Self::new(name, ElementKind::String, Arity::Variable)
    }

    #[must_use]
    pub fn with_enumeration<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        self.enumeration = entries
            .into_iter()
            .map(|(text, value)| (text.into(), value))
            .collect();
        self
    }

    /// Exclude this property from `capture`.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.persistent = false;
        self
    }

    fn enumeration_value(&self, text: &str) -> Option<i64> {
        self.enumeration
            .iter()
            .find(|(entry, _)| entry == text)
            .map(|(_, value)| *value)
    }
}

/// Typed values for one property.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingValues {
    Int(Vec<i64>),
    Double(Vec<f64>),
    String(Vec<String>),
}

impl SettingValues {
    pub fn len(&self) -> usize {
        match self {
            SettingValues::Int(v) => v.len(),
            SettingValues::Double(v) => v.len(),
            SettingValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            SettingValues::Int(_) => ElementKind::Int,
            SettingValues::Double(_) => ElementKind::Double,
            SettingValues::String(_) => ElementKind::String,
        }
    }

    /// A single element becomes a scalar, several become an array.
    pub fn to_value(&self) -> Value {
        let mut values: Vec<Value> = match self {
            SettingValues::Int(v) => v.iter().copied().map(Value::Integer).collect(),
            SettingValues::Double(v) => v.iter().copied().map(Value::Float).collect(),
            SettingValues::String(v) => v.iter().cloned().map(Value::String).collect(),
        };
        if values.len() == 1 {
            values.remove(0)
        } else {
            Value::Array(values.into_iter().map(Node::new).collect())
        }
    }
}

/// Error returned by a target that refuses values.
pub type ApplyError = Box<dyn std::error::Error + Send + Sync>;

/// An object whose properties can be filled from settings.
pub trait SettingsTarget {
    /// Group the object belongs to, e.g. `sources`.
    fn group(&self) -> &str;

    /// Name of the object within its group, e.g. `SphereSource`.
    fn name(&self) -> &str;

    fn properties(&self) -> Vec<PropertySpec>;

    /// Adopt `values` for `property`.
    fn apply(&mut self, property: &str, values: SettingValues) -> Result<(), ApplyError>;

    /// Current values of `property`, used by `capture`.
    fn current(&self, _property: &str) -> Option<SettingValues> {
        None
    }

    /// Whether `property` still holds its default value.
    fn is_default(&self, _property: &str) -> bool {
        false
    }
}

/// Why a property with a matching setting was left unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// The setting has a different number of elements than declared.
    CountMismatch { expected: usize, found: usize },
    /// Element `index` could not be read as the declared kind.
    TypeMismatch { index: usize },
    /// The setting is an object or null.
    NotAValue,
    /// The target's `apply` refused the values.
    Rejected(String),
}

/// Outcome of a `hydrate` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HydrationReport {
    /// Properties that received values.
    pub applied: Vec<String>,
    /// Properties with a setting that could not be used.
    pub skipped: Vec<(String, SkipReason)>,
}

impl HydrationReport {
    /// True when every property that had a setting received it.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

fn object_path(group: &str, name: &str) -> Path {
    Path::root().child(group).child(name)
}

fn read_elements<T: FromSetting>(
    node: &Node,
    count: usize,
    fallback: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>, SkipReason> {
    (0..count)
        .map(|index| {
            element(node, index)
                .and_then(|value| T::from_setting(value).or_else(|| fallback(value)))
                .ok_or(SkipReason::TypeMismatch { index })
        })
        .collect()
}

fn read_values(node: &Node, spec: &PropertySpec) -> Result<SettingValues, SkipReason> {
    if !(node.value.is_scalar() || node.value.is_array()) {
        return Err(SkipReason::NotAValue);
    }
    let count = element_count(node);
    if !spec.arity.accepts(count) {
        let expected = match spec.arity {
            Arity::Exactly(n) => n,
            Arity::Variable => count,
        };
        return Err(SkipReason::CountMismatch {
            expected,
            found: count,
        });
    }

    match spec.kind {
        ElementKind::Int => read_elements(node, count, |value| match value {
            Value::String(text) => spec.enumeration_value(text),
            _ => None,
        })
        .map(SettingValues::Int),
        ElementKind::Double => read_elements(node, count, |_| None).map(SettingValues::Double),
        ElementKind::String => read_elements(node, count, |_| None).map(SettingValues::String),
    }
}

impl SettingsStore {
    /// Fill the properties of `target` from the settings under
    /// `.<group>.<name>`.
    ///
    /// Properties without a setting keep their current value. Properties
    /// whose setting does not fit are skipped and listed in the report.
    pub fn hydrate(
        &self,
        group: &str,
        name: &str,
        target: &mut dyn SettingsTarget,
    ) -> HydrationReport {
        let base = object_path(group, name);
        let mut report = HydrationReport::default();

        for spec in target.properties() {
            let path = base.child(&spec.name);
            let Some(resolved) = self.resolve_path(&path) else {
                continue;
            };

            let outcome = read_values(resolved.node, &spec).and_then(|values| {
                target
                    .apply(&spec.name, values)
                    .map_err(|e| SkipReason::Rejected(e.to_string()))
            });
            match outcome {
                Ok(()) => {
                    log::trace!("hydrated {}", path);
                    report.applied.push(spec.name);
                }
                Err(reason) => {
                    log::warn!("skipping {}: {:?}", path, reason);
                    report.skipped.push((spec.name, reason));
                }
            }
        }

        report
    }

    /// [`hydrate`](Self::hydrate) using the target's own group and name.
    pub fn hydrate_target(&self, target: &mut dyn SettingsTarget) -> HydrationReport {
        let group = target.group().to_string();
        let name = target.name().to_string();
        self.hydrate(&group, &name, target)
    }

    /// Record the property values of `target` in the live layer.
    ///
    /// Transient properties are ignored. A property at its default value has
    /// its live entry removed, unless a loaded layer defines it, in which
    /// case the default is written so it keeps overriding that layer.
    /// Returns the number of entries written.
    pub fn capture(&mut self, target: &dyn SettingsTarget) -> Result<usize, Error> {
        let base = object_path(target.group(), target.name());
        let mut written = 0;

        for spec in target.properties().iter().filter(|spec| spec.persistent) {
            let path = base.child(&spec.name);
            if target.is_default(&spec.name) && !self.defined_in_loaded(&path) {
                if self.live.remove(&path).is_some() {
                    log::debug!("removed default {} from live layer", path);
                }
                continue;
            }

            let Some(values) = target.current(&spec.name) else {
                continue;
            };
            if values.is_empty() {
                continue;
            }
            self.live.entry_mut(&path)?.value = values.to_value();
            written += 1;
        }

        log::debug!(
            "captured {} properties of {}",
            written,
            object_path(target.group(), target.name())
        );
        Ok(written)
    }
}
