//! # Open Addressing Hash Table
//!
//! This module provides a hash table using *open addressing*: every entry lives directly in one
//! contiguous slot array, and collisions are resolved by probing other slots in an order chosen by a
//! [`ProbingStrategy`].
//!
//! ## Key Features
//! - **Generic** key-value pairs (`K: Hash + Eq, V`), with lookups through any borrowed form of the key.
//! - **Configurable Probing**: linear (coprime capacities) or quadratic (power-of-two capacities).
//! - **Tombstones**: removal leaves a tombstone so probe chains running through the slot stay intact.
//! - **Lazy Relocation**: a successful lookup that walked past a tombstone moves the entry into the first
//!   tombstone it saw, so the next lookup for that key is shorter. Lookups therefore take `&mut self`.
//! - **Automatic Growth**: once occupied slots plus tombstones reach the load factor threshold, the table
//!   grows to the next legal capacity and re-places every live entry, dropping all tombstones.
//! - **Fail-fast cursor**: [`KeyCursor`] walks the keys without borrowing the table and reports any
//!   mutation that happened since it was created.
//!
//! **Note**: The table is not thread-safe. For concurrent access, wrap it in a mutex.
//!
//! ## Example
//! ```rust
//! use probing_hashtable::{OpenAddressingBuilder, ProbingStrategy};
//!
//! let mut table = OpenAddressingBuilder::new()
//!     .with_strategy(ProbingStrategy::Quadratic)
//!     .build::<&str, i32>()
//!     .unwrap();
//! table.insert("key", 42);
//! assert_eq!(table.get("key"), Some(&42));
//! assert_eq!(table.remove("key"), Some(42));
//! assert!(table.is_empty());
//! ```

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use super::probing::ProbingStrategy;
use crate::error::{Error, Result};

/// Default requested capacity, also the smallest capacity a table is built with.
pub const DEFAULT_CAPACITY: usize = 7;
/// Default ratio of used slots (live and tombstoned) to capacity that triggers growth.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.65;

/// A slot can be `Empty`, `Tombstone` (used to be occupied but removed), or `Occupied(key, value)`.
#[derive(Debug, Clone)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(K, V),
}

/// Outcome of walking a key's probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key is stored at `index`; `tombstone` is the first tombstone passed on the way.
    Found {
        index: usize,
        tombstone: Option<usize>,
    },
    /// The walk stopped at the empty slot `index`.
    Vacant {
        index: usize,
        tombstone: Option<usize>,
    },
    /// Every slot was visited without meeting the key or an empty slot.
    Exhausted { tombstone: Option<usize> },
}

/// A builder for [`OpenAddressingTable`], allowing you to specify capacity, load factor, probing strategy
/// and hasher.
#[derive(Debug, Clone)]
pub struct OpenAddressingBuilder<S = RandomState> {
    capacity: usize,
    load_factor: f64,
    strategy: ProbingStrategy,
    hasher: S,
}

impl Default for OpenAddressingBuilder<RandomState> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            strategy: ProbingStrategy::default(),
            hasher: RandomState::new(),
        }
    }
}

impl OpenAddressingBuilder<RandomState> {
    /// Create a new builder with default parameters and a `RandomState` hasher.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: BuildHasher> OpenAddressingBuilder<S> {
    /// Sets the requested capacity. Values below [`DEFAULT_CAPACITY`] are raised to it, then the
    /// strategy rounds the result up to a legal capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the load factor. Once `used slots >= floor(capacity * load_factor)`, the next insert grows
    /// the table.
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Sets the collision resolution strategy.
    pub fn with_strategy(mut self, strategy: ProbingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replaces the hasher builder.
    pub fn with_hasher<T: BuildHasher>(self, hasher: T) -> OpenAddressingBuilder<T> {
        OpenAddressingBuilder {
            capacity: self.capacity,
            load_factor: self.load_factor,
            strategy: self.strategy,
            hasher,
        }
    }

    /// Validates the configuration and builds an empty table.
    ///
    /// # Errors
    /// - [`Error::IllegalCapacity`] if the capacity is zero.
    /// - [`Error::IllegalLoadFactor`] if the load factor is not positive and finite.
    /// - [`Error::IllegalProbeConstant`] if a linear strategy has a zero step.
    pub fn build<K, V>(self) -> Result<OpenAddressingTable<K, V, S>> {
        if self.capacity == 0 {
            return Err(Error::IllegalCapacity(self.capacity));
        }
        if !(self.load_factor > 0.0 && self.load_factor.is_finite()) {
            return Err(Error::IllegalLoadFactor(self.load_factor));
        }
        if let ProbingStrategy::Linear { constant: 0 } = self.strategy {
            return Err(Error::IllegalProbeConstant(0));
        }

        let capacity = self
            .strategy
            .legalize(self.capacity.max(DEFAULT_CAPACITY));

        Ok(OpenAddressingTable {
            slots: empty_slots(capacity),
            threshold: threshold_for(capacity, self.load_factor),
            used_buckets: 0,
            len: 0,
            modifications: 0,
            load_factor: self.load_factor,
            strategy: self.strategy,
            build_hasher: self.hasher,
        })
    }
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    std::iter::repeat_with(|| Slot::Empty)
        .take(capacity)
        .collect()
}

fn threshold_for(capacity: usize, load_factor: f64) -> usize {
    (capacity as f64 * load_factor) as usize
}

/// The open addressing hash table.
pub struct OpenAddressingTable<K, V, S = RandomState> {
    slots: Vec<Slot<K, V>>,
    /// Growth is triggered once `used_buckets` reaches this.
    threshold: usize,
    /// Occupied slots plus tombstones.
    used_buckets: usize,
    /// Occupied slots.
    len: usize,
    /// Bumped by every change to the slot array.
    modifications: u64,

    load_factor: f64,
    strategy: ProbingStrategy,
    build_hasher: S,
}

impl<K: Hash + Eq, V> OpenAddressingTable<K, V, RandomState> {
    /// Creates an empty table with linear probing and default parameters.
    pub fn new() -> Self {
        Self::with_strategy(ProbingStrategy::default())
    }

    /// Creates an empty table with default parameters and the given strategy.
    ///
    /// # Panics
    /// Panics if `strategy` is linear with a zero step.
    pub fn with_strategy(strategy: ProbingStrategy) -> Self {
        assert!(
            strategy != ProbingStrategy::Linear { constant: 0 },
            "linear probing constant must be non-zero"
        );
        OpenAddressingTable::from_parts(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, strategy)
    }

    /// Creates an empty linear-probing table with the given capacity and load factor.
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Result<Self> {
        OpenAddressingBuilder::new()
            .with_capacity(capacity)
            .with_load_factor(load_factor)
            .build()
    }

    fn from_parts(capacity: usize, load_factor: f64, strategy: ProbingStrategy) -> Self {
        let capacity = strategy.legalize(capacity);
        OpenAddressingTable {
            slots: empty_slots(capacity),
            threshold: threshold_for(capacity, load_factor),
            used_buckets: 0,
            len: 0,
            modifications: 0,
            load_factor,
            strategy,
            build_hasher: RandomState::new(),
        }
    }
}

impl<K: Hash + Eq, V> Default for OpenAddressingTable<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OpenAddressingTable<K, V, S> {
    /// Returns the number of key-value pairs in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Alias of [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len
    }

    /// Returns true if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the backing storage.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn strategy(&self) -> ProbingStrategy {
        self.strategy
    }

    /// Resets every slot to empty. The capacity is kept.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.len = 0;
        self.used_buckets = 0;
        self.modifications += 1;
    }

    /// Iterates over `(key, value)` pairs in storage order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    /// Iterates over the keys in storage order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Iterates over the values in storage order. Values are not necessarily distinct.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Starts a fail-fast key cursor at the first slot.
    pub fn cursor(&self) -> KeyCursor {
        KeyCursor {
            index: 0,
            remaining: self.len,
            expected_modifications: self.modifications,
        }
    }

    /// Moves the entry at `from` into the tombstone at `to`, leaving a tombstone behind.
    fn relocate(&mut self, from: usize, to: usize) {
        debug_assert!(matches!(self.slots[to], Slot::Tombstone));
        let entry = std::mem::replace(&mut self.slots[from], Slot::Tombstone);
        self.slots[to] = entry;
        self.modifications += 1;
        log::trace!("Relocated entry from slot {from} to slot {to}");
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> OpenAddressingTable<K, V, S> {
    /// Insert a key-value pair. Returns the old value if the key existed.
    /// If the used slots have reached the threshold, the table grows first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.used_buckets >= self.threshold {
            self.grow();
        }
        self.place(key, value)
    }

    /// Alias of [`insert`](Self::insert).
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    /// Alias of [`insert`](Self::insert).
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    /// Retrieve a reference to the value for `key`, relocating the entry if a tombstone precedes it.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find(key)?;
        match &self.slots[index] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    /// Retrieve a mutable reference to the value for `key`, relocating the entry like [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find(key)?;
        match &mut self.slots[index] {
            Slot::Occupied(_, v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if `key` is present. Relocates the entry exactly as [`get`](Self::get) does.
    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Removes key from the table, returning the old value if present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Probe::Found { index, .. } = self.probe(key) else {
            return None;
        };
        match std::mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(_, v) => {
                self.len -= 1;
                self.modifications += 1;
                Some(v)
            }
            _ => unreachable!("probe reported an occupied slot"),
        }
    }

    /// Home bucket of `key` under the current capacity.
    fn home<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        let hash = self.build_hasher.hash_one(key);
        (hash % self.slots.len() as u64) as usize
    }

    /// Walks the probe sequence of `key` until it resolves.
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let home = self.home(key);
        let mut tombstone = None;
        for index in self.strategy.probe_sequence(home, self.slots.len()) {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant { index, tombstone },
                Slot::Tombstone => {
                    tombstone.get_or_insert(index);
                }
                Slot::Occupied(k, _) => {
                    if key.eq(k.borrow()) {
                        return Probe::Found { index, tombstone };
                    }
                }
            }
        }
        Probe::Exhausted { tombstone }
    }

    /// Locates `key` for a read, moving it into the first tombstone on its path.
    fn find<Q>(&mut self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.probe(key) {
            Probe::Found {
                index,
                tombstone: None,
            } => Some(index),
            Probe::Found {
                index,
                tombstone: Some(first),
            } => {
                self.relocate(index, first);
                Some(first)
            }
            Probe::Vacant { .. } | Probe::Exhausted { .. } => None,
        }
    }

    /// Inserts without checking the growth threshold.
    fn place(&mut self, key: K, value: V) -> Option<V> {
        match self.probe(&key) {
            Probe::Found {
                index,
                tombstone: None,
            } => {
                let Slot::Occupied(_, v) = &mut self.slots[index] else {
                    unreachable!("probe reported an occupied slot");
                };
                let old = std::mem::replace(v, value);
                self.modifications += 1;
                Some(old)
            }
            Probe::Found {
                index,
                tombstone: Some(first),
            } => {
                self.relocate(index, first);
                let Slot::Occupied(_, v) = &mut self.slots[first] else {
                    unreachable!("relocated entry must be occupied");
                };
                Some(std::mem::replace(v, value))
            }
            Probe::Vacant {
                tombstone: Some(first),
                ..
            }
            | Probe::Exhausted {
                tombstone: Some(first),
            } => {
                // the tombstone already counts as used
                self.slots[first] = Slot::Occupied(key, value);
                self.len += 1;
                self.modifications += 1;
                None
            }
            Probe::Vacant {
                index,
                tombstone: None,
            } => {
                self.slots[index] = Slot::Occupied(key, value);
                self.used_buckets += 1;
                self.len += 1;
                self.modifications += 1;
                None
            }
            Probe::Exhausted { tombstone: None } => {
                // every slot holds a live key, only reachable with a load factor >= 1
                self.grow();
                self.place(key, value)
            }
        }
    }

    /// Grows to the strategy's next legal capacity.
    fn grow(&mut self) {
        let new_capacity = self.strategy.grow(self.slots.len());
        self.rehash(new_capacity);
    }

    /// Rebuild the table with `new_capacity` slots, re-placing every occupied slot.
    fn rehash(&mut self, new_capacity: usize) {
        let old_capacity = self.slots.len();
        let live = self.len;
        let tombstones = self.used_buckets - self.len;
        log::debug!(
            "Resizing table from {old_capacity} to {new_capacity} slots ({live} keys, {tombstones} tombstones dropped)"
        );

        let old_slots = std::mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.threshold = threshold_for(new_capacity, self.load_factor);
        self.used_buckets = 0;
        self.len = 0;

        for slot in old_slots {
            if let Slot::Occupied(k, v) = slot {
                self.place(k, v);
            }
        }
        self.modifications += 1;

        log::debug!("Resized table to {} slots", self.slots.len());
    }
}

impl<K, V, S> fmt::Debug for OpenAddressingTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> fmt::Display for OpenAddressingTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k} => {v}")?;
        }
        write!(f, "}}")
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for OpenAddressingTable<K, V, S> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Iterator over `(&K, &V)`, created by [`OpenAddressingTable::iter`].
pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(k, v) = slot {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over keys, created by [`OpenAddressingTable::keys`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Iterator over values, created by [`OpenAddressingTable::values`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a OpenAddressingTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over `(K, V)`.
pub struct IntoIter<K, V> {
    slots: std::vec::IntoIter<Slot<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(k, v) = slot {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for OpenAddressingTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            slots: self.slots.into_iter(),
            remaining: self.len,
        }
    }
}

/// A fail-fast cursor over the keys of a table.
///
/// The cursor does not borrow the table between steps. It records the table's modification count when
/// created, and every step checks it again: if the table was changed in the meantime (insert, update,
/// remove, clear, resize, or a lookup that relocated an entry) the step fails with
/// [`Error::ConcurrentModification`]. The table itself stays valid; only the walk is abandoned.
#[derive(Debug, Clone)]
pub struct KeyCursor {
    index: usize,
    remaining: usize,
    expected_modifications: u64,
}

impl KeyCursor {
    fn check<K, V, S>(&self, table: &OpenAddressingTable<K, V, S>) -> Result<()> {
        if table.modifications != self.expected_modifications {
            return Err(Error::ConcurrentModification {
                expected: self.expected_modifications,
                found: table.modifications,
            });
        }
        Ok(())
    }

    /// Returns true if another key is left.
    pub fn has_next<K, V, S>(&self, table: &OpenAddressingTable<K, V, S>) -> Result<bool> {
        self.check(table)?;
        Ok(self.remaining != 0)
    }

    /// Advances to the next key in storage order.
    pub fn next<'t, K, V, S>(
        &mut self,
        table: &'t OpenAddressingTable<K, V, S>,
    ) -> Result<Option<&'t K>> {
        self.check(table)?;
        if self.remaining == 0 {
            return Ok(None);
        }
        while let Some(slot) = table.slots.get(self.index) {
            self.index += 1;
            if let Slot::Occupied(k, _) = slot {
                self.remaining -= 1;
                return Ok(Some(k));
            }
        }
        Ok(None)
    }

    /// Removal through a cursor is not offered; use [`OpenAddressingTable::remove`].
    pub fn remove(&mut self) -> Result<()> {
        Err(Error::Unsupported("remove through a key cursor"))
    }
}
