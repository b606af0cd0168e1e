#![cfg(test)]

// Property tests for AssociativeTable kept inside the crate so they can
// inspect the bucket index alongside the public surface.

use crate::table::{AssociativeTable, Handle};
use crate::InsertError;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations: indices shrink to earlier keys, the pool
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    InsertOrAssign(usize, i32),
    Emplace(usize, i32),
    TryInsert(usize, i32),
    Erase(usize),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Shrink,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::InsertOrAssign(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Emplace(i, v)),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryInsert(i, v)),
            2 => idx.clone().prop_map(OpI::Erase),
            1 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s: String| s),
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Shrink),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives `sut` and a `HashMap` model through the same operations.
// Invariants exercised after every step:
// - insert-or-assign is last-writer-wins; emplace never overwrites.
// - erase/remove make the key absent and shrink `len` by one.
// - handles of live entries stay stable across growth and resolve to
//   `None` once their entry is gone.
// - iteration yields each live key exactly once.
// - the bucket count is a power of two strictly above `len`.
fn run_state_machine<S: BuildHasher>(
    mut sut: AssociativeTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut live: HashMap<Key, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::InsertOrAssign(i, v) => {
                let k = key_from(pool, i);
                let inserted = sut.insert_or_assign(k.clone(), v);
                prop_assert_eq!(inserted, model.insert(k.clone(), v).is_none());
                if inserted {
                    let h = sut.find(&k).expect("just inserted");
                    live.insert(k, h);
                }
            }
            OpI::Emplace(i, v) => {
                let k = key_from(pool, i);
                let (entry, inserted) = sut.emplace(k.clone(), v);
                let stored = *entry.get();
                let h = entry.handle();
                prop_assert_eq!(inserted, !model.contains_key(&k));
                let expected = *model.entry(k.clone()).or_insert(v);
                prop_assert_eq!(stored, expected);
                if inserted {
                    live.insert(k, h);
                } else {
                    prop_assert_eq!(Some(&h), live.get(&k));
                }
            }
            OpI::TryInsert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                match sut.try_insert(k.clone(), v) {
                    Ok(entry) => {
                        prop_assert!(!already, "try_insert must fail on duplicate");
                        live.insert(k.clone(), entry.handle());
                        model.insert(k, v);
                    }
                    Err(InsertError::DuplicateKey) => prop_assert!(already),
                }
            }
            OpI::Erase(i) => {
                let k = key_from(pool, i);
                let before = sut.len();
                let erased = sut.erase(k.0.as_str());
                prop_assert_eq!(erased, model.remove(&k).is_some());
                if erased {
                    prop_assert_eq!(sut.len(), before - 1);
                    stale.extend(live.remove(&k));
                }
                prop_assert!(sut.get(&k).is_none());
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let got = sut.remove_entry(&k);
                let expected = model.remove(&k);
                prop_assert_eq!(got.as_ref().map(|(_, v)| *v), expected);
                if let Some((kk, _)) = got {
                    prop_assert!(kk == k);
                    stale.extend(live.remove(&k));
                }
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
                prop_assert_eq!(sut.find(&k), live.get(&k).copied());
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(v) = sut.get_mut(&k) {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model tracks live key");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Iterate => {
                let s_keys: Vec<Key> = sut.keys().cloned().collect();
                let unique: BTreeSet<Key> = s_keys.iter().cloned().collect();
                prop_assert_eq!(s_keys.len(), unique.len(), "no key visited twice");
                let m_keys: BTreeSet<Key> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
            OpI::Shrink => {
                sut.shrink_to_fit();
                prop_assert!(sut.capacity() >= sut.len());
            }
        }

        for &h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        for (k, &h) in &live {
            prop_assert_eq!(h.key(&sut), Some(k));
            prop_assert_eq!(h.value(&sut), model.get(k));
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        if sut.bucket_count() > 0 {
            prop_assert!(sut.bucket_count().is_power_of_two());
            prop_assert!(sut.bucket_count() > sut.len());
        }
    }
    Ok(())
}

// Collision variant using a constant hasher to stress equality probing.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(AssociativeTable::new(), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(AssociativeTable::with_hasher(ConstBuildHasher), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_small_load_factor((pool, ops) in arb_scenario()) {
        let sut = crate::TableConfig::new().max_load_factor(0.25).unwrap().build();
        run_state_machine(sut, &pool, ops)?;
    }
}
