//! AssociativeTable: unique-key hash table with drop hooks and stable handles.

use crate::config::{DropHooks, TableConfig};
use crate::error::{InsertError, ReserveError};
use crate::raw_index::RawIndex;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::Equivalent;
use slotmap::{DefaultKey, SlotMap};

/// Detached reference to an entry.
///
/// Handles stay valid across growth and rehashing. Once the entry is
/// erased the handle resolves to `None`, even if its storage is reused by a
/// later insert.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }
    pub(crate) fn raw_handle(&self) -> DefaultKey {
        self.0
    }

    pub fn key<'a, K, V, S>(&self, table: &'a AssociativeTable<K, V, S>) -> Option<&'a K> {
        table.slots.get(self.0).map(|e| &e.key)
    }

    pub fn value<'a, K, V, S>(&self, table: &'a AssociativeTable<K, V, S>) -> Option<&'a V> {
        table.slots.get(self.0).map(|e| &e.value)
    }

    pub fn value_mut<'a, K, V, S>(
        &self,
        table: &'a mut AssociativeTable<K, V, S>,
    ) -> Option<&'a mut V> {
        table.slots.get_mut(self.0).map(|e| &mut e.value)
    }
}

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

/// Borrowed view of a live entry returned by the insert family.
pub struct EntryMut<'a, K, V> {
    key: &'a K,
    value: &'a mut V,
    handle: Handle,
}

impl<'a, K, V> EntryMut<'a, K, V> {
    pub fn key(&self) -> &K {
        self.key
    }
    pub fn get(&self) -> &V {
        self.value
    }
    pub fn get_mut(&mut self) -> &mut V {
        self.value
    }
    /// Convert into a mutable reference bound to the table borrow.
    pub fn into_mut(self) -> &'a mut V {
        self.value
    }
    pub fn handle(&self) -> Handle {
        self.handle
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntryMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryMut")
            .field("key", self.key)
            .field("value", &*self.value)
            .finish()
    }
}

/// Hash table mapping unique keys to values.
///
/// Entries are stored in generational slots; an open-addressing bucket
/// index maps cached hashes to those slots. Lookups accept any query type
/// `Q: Hash + Equivalent<K>`, so `&str` finds `String` or `OwnedText` keys
/// without building an owned key.
///
/// Mutating the table while an iterator or `EntryMut` is alive is rejected
/// by the borrow checker; detached [`Handle`]s are checked at runtime.
pub struct AssociativeTable<K, V, S = DefaultHashBuilder> {
    hasher: S,
    index: RawIndex,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    hooks: DropHooks<K, V>,
}

impl<K, V> AssociativeTable<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V, S: Default> Default for AssociativeTable<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> AssociativeTable<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config(TableConfig::with_hasher(hasher))
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::with_config(TableConfig::with_hasher(hasher).capacity(capacity))
    }

    pub fn with_config(config: TableConfig<K, V, S>) -> Self {
        Self {
            index: RawIndex::with_capacity(config.capacity, config.max_load),
            slots: SlotMap::with_capacity_and_key(config.capacity),
            hasher: config.hasher,
            hooks: config.hooks,
        }
    }

    /// Configuration that builds an empty table with this table's hasher,
    /// load factor, and hooks.
    pub fn config(&self) -> TableConfig<K, V, S>
    where
        S: Clone,
    {
        let mut config = TableConfig::with_hasher(self.hasher.clone()).hooks(self.hooks.clone());
        config.max_load = self.index.max_load();
        config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of entries the table can hold before the next growth.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Current number of buckets. Diagnostic only: it changes on growth and
    /// compaction and carries no ordering meaning.
    pub fn bucket_count(&self) -> usize {
        self.index.bucket_count()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { it: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { it: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            it: self.iter_mut(),
        }
    }

    /// Detach the entry behind `handle` and return it without running hooks.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let k = handle.raw_handle();
        let hash = self.slots.get(k)?.hash;
        let (pos, _) = self
            .index
            .find(hash, |slot| slot == k)
            .expect("live slot must be linked in the index");
        self.index.erase(pos);
        let entry = self.slots.remove(k)?;
        Some((entry.key, entry.value))
    }

    /// Destroy the entry behind `handle`. Returns false for stale handles.
    pub fn erase_handle(&mut self, handle: Handle) -> bool {
        match self.remove_handle(handle) {
            Some((key, value)) => {
                self.hooks.destroy_entry(key, value);
                true
            }
            None => false,
        }
    }

    /// Destroy every entry for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let doomed: Vec<DefaultKey> = self
            .slots
            .iter_mut()
            .filter_map(|(k, e)| (!keep(&e.key, &mut e.value)).then_some(k))
            .collect();
        for k in doomed {
            self.erase_handle(Handle::new(k));
        }
    }

    /// Destroy every entry; bucket storage is kept for reuse.
    pub fn clear(&mut self) {
        self.index.clear();
        if self.hooks.is_empty() {
            self.slots.clear();
            return;
        }
        for (_, entry) in self.slots.drain() {
            self.hooks.destroy_entry(entry.key, entry.value);
        }
    }

    /// Destroy every entry and release all storage.
    pub fn destroy(self) {
        drop(self)
    }

    /// Fallible form of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        self.index.reserve(additional)?;
        self.slots.reserve(additional);
        Ok(())
    }

    /// Make room for `additional` more entries without further growth.
    ///
    /// Panics on capacity overflow.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            panic!("{err}");
        }
    }

    /// Rebuild the bucket index at the smallest size that fits the live
    /// entries. This is the only operation that lowers `capacity()`.
    pub fn shrink_to_fit(&mut self) {
        self.index.shrink_to_fit();
    }

    fn entry_at(&mut self, k: DefaultKey) -> EntryMut<'_, K, V> {
        let e = self
            .slots
            .get_mut(k)
            .expect("indexed slot must hold an entry");
        EntryMut {
            key: &e.key,
            value: &mut e.value,
            handle: Handle::new(k),
        }
    }
}

impl<K, V, S> AssociativeTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn find_slot<Q>(&self, hash: u64, q: &Q) -> Option<(usize, DefaultKey)>
    where
        Q: ?Sized + Equivalent<K>,
    {
        let slots = &self.slots;
        self.index.find(hash, |k| {
            slots
                .get(k)
                .map(|e| q.equivalent(&e.key))
                .unwrap_or(false)
        })
    }

    /// Link a key known to be absent. Grows first if the projected load
    /// exceeds the limit.
    fn insert_new(&mut self, hash: u64, key: K, value: V) -> DefaultKey {
        self.reserve(1);
        let k = self.slots.insert(Entry { key, value, hash });
        self.index.insert(hash, k);
        debug_assert_eq!(self.index.len(), self.slots.len());
        k
    }

    /// Insert `key` with `default` if absent; otherwise leave the stored
    /// value untouched. Returns the live entry and whether it was inserted.
    ///
    /// When the key is present, `default` and the incoming `key` are dropped
    /// without passing through hooks, since they were never stored.
    pub fn emplace(&mut self, key: K, default: V) -> (EntryMut<'_, K, V>, bool) {
        self.emplace_with(key, || default)
    }

    /// Like [`emplace`](Self::emplace), but only builds the value when the
    /// key is absent.
    pub fn emplace_with<F>(&mut self, key: K, default: F) -> (EntryMut<'_, K, V>, bool)
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        if let Some((_, k)) = self.find_slot(hash, &key) {
            return (self.entry_at(k), false);
        }
        let value = default();
        let k = self.insert_new(hash, key, value);
        (self.entry_at(k), true)
    }

    /// Store `value` under `key`, replacing and destroying any previous
    /// value. Returns true if a new entry was created.
    ///
    /// On replacement the stored key is kept and the incoming `key` is
    /// dropped; the old value reaches the value hook after the new one is
    /// in place.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> bool {
        let hash = self.make_hash(&key);
        match self.find_slot(hash, &key) {
            Some((_, k)) => {
                let entry = self
                    .slots
                    .get_mut(k)
                    .expect("indexed slot must hold an entry");
                let old = mem::replace(&mut entry.value, value);
                self.hooks.destroy_value(old);
                false
            }
            None => {
                self.insert_new(hash, key, value);
                true
            }
        }
    }

    /// Insert only if `key` is absent.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<EntryMut<'_, K, V>, InsertError> {
        let hash = self.make_hash(&key);
        if self.find_slot(hash, &key).is_some() {
            return Err(InsertError::DuplicateKey);
        }
        let k = self.insert_new(hash, key, value);
        Ok(self.entry_at(k))
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let hash = self.make_hash(q);
        self.find_slot(hash, q).map(|(_, k)| Handle::new(k))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let h = self.find(q)?;
        self.slots.get(h.raw_handle()).map(|e| (&e.key, &e.value))
    }

    /// Mutable access to a stored value, e.g. to update a nested table in
    /// place.
    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let h = self.find(q)?;
        h.value_mut(self)
    }

    /// Remove the entry for `q`, destroying its key and value.
    /// Returns whether an entry was removed.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        match self.remove_entry(q) {
            Some((key, value)) => {
                self.hooks.destroy_entry(key, value);
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `q` and hand its value to the caller.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Remove the entry for `q` and hand key and value to the caller.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let hash = self.make_hash(q);
        let (pos, k) = self.find_slot(hash, q)?;
        self.index.erase(pos);
        let entry = self
            .slots
            .remove(k)
            .expect("indexed slot must hold an entry");
        Some((entry.key, entry.value))
    }
}

impl<K, V, S> Drop for AssociativeTable<K, V, S> {
    fn drop(&mut self) {
        if self.hooks.is_empty() {
            return;
        }
        for (_, entry) in self.slots.drain() {
            self.hooks.destroy_entry(entry.key, entry.value);
        }
    }
}

/// Asserted-presence lookup.
///
/// # Panics
///
/// Panics if the key is not present; use [`AssociativeTable::get`] when
/// absence is possible.
impl<K, Q: ?Sized, V, S> Index<&Q> for AssociativeTable<K, V, S>
where
    K: Eq + Hash,
    Q: Hash + Equivalent<K>,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in table"),
        }
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for AssociativeTable<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            index: self.index.clone(),
            slots: self.slots.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<K, V, S> fmt::Debug for AssociativeTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for AssociativeTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, S> Eq for AssociativeTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for AssociativeTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert_or_assign(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for AssociativeTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

/// Iterator over `(&K, &V)` in unspecified order.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(&K, &mut V)` in unspecified order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct Keys<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, _)| k)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct Values<'a, K, V> {
    it: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct ValuesMut<'a, K, V> {
    it: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, v)| v)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Owning iterator; entries leave the table without passing through hooks.
pub struct IntoIter<K, V> {
    it: slotmap::basic::IntoIter<DefaultKey, Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, e.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V, S> IntoIterator for AssociativeTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        self.index.clear();
        let slots = mem::take(&mut self.slots);
        IntoIter {
            it: slots.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a AssociativeTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut AssociativeTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
