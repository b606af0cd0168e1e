//! AssociativeSet: a set of unique keys over `AssociativeTable<T, ()>`.

use crate::config::TableConfig;
use crate::table::{self, AssociativeTable};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::Equivalent;

pub struct AssociativeSet<T, S = DefaultHashBuilder> {
    table: AssociativeTable<T, (), S>,
}

impl<T> AssociativeSet<T> {
    pub fn new() -> Self {
        Self {
            table: AssociativeTable::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: AssociativeTable::with_capacity(capacity),
        }
    }
}

impl<T, S: Default> Default for AssociativeSet<T, S> {
    fn default() -> Self {
        Self {
            table: AssociativeTable::default(),
        }
    }
}

impl<T, S> AssociativeSet<T, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: AssociativeTable::with_hasher(hasher),
        }
    }

    /// Only the key hook of `config` is meaningful for sets.
    pub fn with_config(config: TableConfig<T, (), S>) -> Self {
        Self {
            table: AssociativeTable::with_config(config),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.table.keys(),
        }
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.table.retain(|k, _| keep(k));
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

impl<T, S> AssociativeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    /// Add `value`; returns false (and drops `value`) if already present.
    pub fn put(&mut self, value: T) -> bool {
        self.table.emplace(value, ()).1
    }

    pub fn contains<Q>(&self, q: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        self.table.contains_key(q)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&T>
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        self.table.get_key_value(q).map(|(k, _)| k)
    }

    /// Remove and destroy the element equal to `q`.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        self.table.erase(q)
    }

    /// Remove the element equal to `q` and hand it to the caller.
    pub fn take<Q>(&mut self, q: &Q) -> Option<T>
    where
        Q: ?Sized + Hash + Equivalent<T>,
    {
        self.table.remove_entry(q).map(|(k, ())| k)
    }
}

impl<T: Clone, S: Clone> Clone for AssociativeSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for AssociativeSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> PartialEq for AssociativeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl<T, S> Eq for AssociativeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
}

impl<T, S> Extend<T> for AssociativeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.put(value);
        }
    }
}

impl<T, S> FromIterator<T> for AssociativeSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

pub struct Iter<'a, T> {
    it: table::Keys<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct IntoIter<T> {
    it: table::IntoIter<T, ()>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;
    #[inline]
    fn next(&mut self) -> Option<T> {
        self.it.next().map(|(k, ())| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T, S> IntoIterator for AssociativeSet<T, S> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            it: self.table.into_iter(),
        }
    }
}

impl<'a, T, S> IntoIterator for &'a AssociativeSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
