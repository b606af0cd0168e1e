//! Construction-time configuration: hasher, capacity hint, load factor, and
//! per-element drop hooks.

use crate::error::ConfigError;
use crate::raw_index::DEFAULT_MAX_LOAD;
use crate::table::AssociativeTable;
use core::fmt;
use hashbrown::hash_map::DefaultHashBuilder;
use std::rc::Rc;

/// Shared destruction hook for one element type. The hook receives the
/// element by value; whatever it does not keep is dropped when it returns.
pub type DropHook<T> = Rc<dyn Fn(T)>;

/// Key and value destruction hooks attached to a table.
///
/// A hook runs exactly once for every element the table destroys: values
/// replaced by `insert_or_assign`, entries removed by `erase`, `retain`, or
/// `clear`, and every remaining entry when the table is dropped. Elements
/// handed back to the caller (`remove`, `remove_entry`, `into_iter`) are not
/// passed to hooks. An absent hook means plain `Drop`.
pub struct DropHooks<K, V> {
    key: Option<DropHook<K>>,
    value: Option<DropHook<V>>,
}

impl<K, V> DropHooks<K, V> {
    pub fn none() -> Self {
        Self {
            key: None,
            value: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none() && self.value.is_none()
    }

    pub(crate) fn destroy_key(&self, key: K) {
        match &self.key {
            Some(hook) => hook(key),
            None => drop(key),
        }
    }

    pub(crate) fn destroy_value(&self, value: V) {
        match &self.value {
            Some(hook) => hook(value),
            None => drop(value),
        }
    }

    pub(crate) fn destroy_entry(&self, key: K, value: V) {
        self.destroy_key(key);
        self.destroy_value(value);
    }
}

impl<K, V> Clone for DropHooks<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K, V> Default for DropHooks<K, V> {
    fn default() -> Self {
        Self::none()
    }
}

impl<K, V> fmt::Debug for DropHooks<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropHooks")
            .field("key", &self.key.is_some())
            .field("value", &self.value.is_some())
            .finish()
    }
}

/// Builder for `AssociativeTable`.
///
/// ```
/// use assoc_table::{OwnedText, TableConfig};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let released = Rc::new(Cell::new(0));
/// let counter = released.clone();
/// let mut table = TableConfig::<OwnedText, OwnedText>::new()
///     .capacity(16)
///     .on_value_drop(move |_v| counter.set(counter.get() + 1))
///     .build();
/// table.insert_or_assign("k".into(), "old".into());
/// table.insert_or_assign("k".into(), "new".into());
/// assert_eq!(released.get(), 1);
/// ```
pub struct TableConfig<K, V, S = DefaultHashBuilder> {
    pub(crate) hasher: S,
    pub(crate) capacity: usize,
    pub(crate) max_load: f64,
    pub(crate) hooks: DropHooks<K, V>,
}

impl<K, V> TableConfig<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V> Default for TableConfig<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> TableConfig<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            capacity: 0,
            max_load: DEFAULT_MAX_LOAD,
            hooks: DropHooks::none(),
        }
    }

    /// Replace the hash builder, keeping the other settings.
    pub fn hasher<S2>(self, hasher: S2) -> TableConfig<K, V, S2> {
        TableConfig {
            hasher,
            capacity: self.capacity,
            max_load: self.max_load,
            hooks: self.hooks,
        }
    }

    /// Number of entries the table holds before its first growth.
    /// Zero defers allocation to the first insert.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Load factor (live entries plus tombstones over buckets) above which
    /// the table grows. Must lie strictly between 0 and 1.
    pub fn max_load_factor(mut self, load: f64) -> Result<Self, ConfigError> {
        if !(load > 0.0 && load < 1.0) {
            return Err(ConfigError::InvalidLoadFactor(load));
        }
        self.max_load = load;
        Ok(self)
    }

    pub fn on_key_drop<F>(mut self, hook: F) -> Self
    where
        F: Fn(K) + 'static,
    {
        self.hooks.key = Some(Rc::new(hook));
        self
    }

    pub fn on_value_drop<F>(mut self, hook: F) -> Self
    where
        F: Fn(V) + 'static,
    {
        self.hooks.value = Some(Rc::new(hook));
        self
    }

    /// Attach an already shared hook record.
    pub fn hooks(mut self, hooks: DropHooks<K, V>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> AssociativeTable<K, V, S> {
        AssociativeTable::with_config(self)
    }
}

impl<K, V, S: Clone> Clone for TableConfig<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            capacity: self.capacity,
            max_load: self.max_load,
            hooks: self.hooks.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for TableConfig<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("capacity", &self.capacity)
            .field("max_load", &self.max_load)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
