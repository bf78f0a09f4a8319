//! Strata Settings: Layered Settings Resolution
//!
//! This layer ranks parsed settings documents by priority and answers
//! queries against them:
//! - `SettingsStore`: loaded layers plus a writable live layer on top
//! - Typed reads (`get_as_int`, `get_as_double`, `get_as_string`, ...)
//!   that fall back to a default instead of failing
//! - `get_description`: the comment that documented a setting
//! - `hydrate` / `capture`: exchange values with objects implementing
//!   `SettingsTarget`
//! - `SharedSettings` / `global()`: a mutex-guarded store for threaded use
//!
//! # Example
//!
//! ```rust
//! use strata_settings_store::SettingsStore;
//!
//! let mut store = SettingsStore::new();
//! store.add_layer(r#"{
//!     // Site-wide defaults
//!     "sources": { "SphereSource": { "Center": [1.0, 2.0, 4.0] } }
//! }"#, 1.0).unwrap();
//!
//! assert_eq!(store.get_number_of_elements(".sources.SphereSource.Center"), 3);
//! assert_eq!(store.get_as_double(".sources.SphereSource.Center", 2, 0.0), 4.0);
//! assert_eq!(store.get_description(".sources"), Some("// Site-wide defaults"));
//! ```

mod hydrate;
mod layer;
mod live;
mod shared;
mod store;
mod typed;

pub use hydrate::{
    ApplyError, Arity, ElementKind, HydrationReport, PropertySpec, SettingValues,
    SettingsTarget, SkipReason,
};
pub use layer::{Layer, LayerId, LayerSource, Resolved};
pub use live::{SettingValue, MAX_ELEMENTS};
pub use shared::{global, SharedSettings};
pub use store::{SettingsStore, StoreOptions};
pub use typed::FromSetting;

// Re-export core types for convenience
pub use strata_core_store::{Error, Node, ParseError, ParseErrorKind, Path, PathError, Value};
