//! assoc-table: a single-threaded, open-addressing hash table with owned
//! entries, per-table drop hooks, and nesting of tables as values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a unique-key associative container whose element lifecycle is
//!   explicit: every element the table destroys passes through an optional
//!   hook exactly once, including entries of nested tables.
//! - Layers:
//!   - RawIndex: power-of-two bucket array of `Empty | Deleted | Full(hash,
//!     slot)` with linear probing. Knows nothing about keys; callers supply
//!     the equality predicate per probe.
//!   - AssociativeTable<K, V, S>: entries in a `SlotMap`, linked through the
//!     RawIndex. Owns the hasher and the drop hooks; exposes
//!     insert/lookup/erase, borrowed iteration, and detached `Handle`s.
//!   - AssociativeSet<T, S>: `AssociativeTable<T, ()>` with a key-only
//!     surface.
//!
//! Constraints
//! - Single-threaded: hook records are `Rc`, so tables are `!Send`/`!Sync`.
//! - O(1) average lookups with unique keys; reads accept any
//!   `Q: Hash + Equivalent<K>` and never allocate.
//! - Capacity only grows, except through `shrink_to_fit`.
//!
//! Hasher and rehashing invariants
//! - Each bucket caches the full `u64` hash of its key. Growth re-homes
//!   buckets by cached hash only; entries never move, and no user `Hash`,
//!   `Eq`, or `Drop` runs during a rehash.
//! - Growth is triggered before linking a new key when live entries plus
//!   tombstones would exceed the load limit (default 7/8 of the buckets,
//!   capped so at least one bucket stays empty).
//!
//! Destruction order
//! - Entries are unlinked from both the index and the slot storage before
//!   hooks run, so the structure is consistent whenever user code executes.
//! - A value stored in a table is destroyed by exactly one of: replacement
//!   in `insert_or_assign`, `erase`/`erase_handle`, `retain`, `clear`, or the
//!   table's drop. Elements moved out (`remove`, `remove_entry`,
//!   `into_iter`) belong to the caller and skip hooks.
//!
//! Access tiers
//! - `get`/`get_mut`/`find` return `Option`; `table[&key]` panics when the
//!   key is absent and is meant for call sites that already know it exists.

pub mod config;
pub mod error;
mod owned_text;
mod raw_index;
pub mod set;
pub mod table;
mod table_proptest;

// Public surface
pub use config::{DropHook, DropHooks, TableConfig};
pub use error::{ConfigError, InsertError, ReserveError, TextError};
pub use hashbrown::Equivalent;
pub use owned_text::OwnedText;
pub use set::AssociativeSet;
pub use table::{AssociativeTable, EntryMut, Handle};
