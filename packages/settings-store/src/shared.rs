//! A lock-guarded store for use from several threads, and an optional
//! process-wide instance.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;

use crate::store::SettingsStore;

/// A `SettingsStore` behind a single mutex.
///
/// Every operation, read or write, takes the same lock, since live writes
/// mutate trees that resolution walks.
#[derive(Clone, Debug, Default)]
pub struct SharedSettings {
    inner: Arc<Mutex<SettingsStore>>,
}

impl SharedSettings {
    pub fn new(store: SettingsStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with shared access to the store.
    pub fn read<R>(&self, f: impl FnOnce(&SettingsStore) -> R) -> R {
        f(&self.lock())
    }

    /// Run `f` with exclusive access to the store.
    pub fn write<R>(&self, f: impl FnOnce(&mut SettingsStore) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, SettingsStore> {
        // A panic mid-write leaves at worst a partially written live entry
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

lazy_static! {
    static ref GLOBAL: SharedSettings = SharedSettings::default();
}

/// The process-wide store, created empty on first use.
pub fn global() -> &'static SharedSettings {
    &GLOBAL
}
