// AssociativeTable integration suite (consolidated).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Uniqueness: at most one entry per key; emplace never overwrites.
// - Update: insert_or_assign is last-writer-wins and releases the old value.
// - Absence: get/erase on missing keys are ordinary None/false results.
// - Destruction: every stored element reaches its hook exactly once,
//   including entries of nested tables.
// - Nesting: inner tables are mutated in place through the outer table.
use assoc_table::{AssociativeSet, AssociativeTable, OwnedText, TableConfig};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type Reviews = AssociativeTable<OwnedText, OwnedText>;

fn inner_snapshot(table: &AssociativeTable<OwnedText, OwnedText>) -> BTreeMap<String, String> {
    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// Test: string-keyed review map.
// Assumes: owned OwnedText keys can be queried with &str.
// Verifies: absent lookups, erase, size bookkeeping, asserted access.
#[test]
fn book_reviews_scenario() {
    let mut book_reviews = Reviews::new();
    book_reviews.insert_or_assign(
        "Adventures of Huckleberry Finn".into(),
        "My favorite book.".into(),
    );
    book_reviews.insert_or_assign("Grimms' Fairy Tales".into(), "Masterpiece.".into());
    book_reviews.insert_or_assign("Pride and Prejudice".into(), "Very enjoyable.".into());
    book_reviews.insert_or_assign(
        "The Adventures of Sherlock Holmes".into(),
        "Eye lyked it alot.".into(),
    );

    assert!(book_reviews.get("Les Misérables").is_none());
    assert_eq!(book_reviews.len(), 4);

    assert!(book_reviews.erase("The Adventures of Sherlock Holmes"));
    assert_eq!(book_reviews.len(), 3);

    assert!(book_reviews.get("The Adventures of Sherlock Holmes").is_none());
    assert!(book_reviews.get("Alice's Adventure in Wonderland").is_none());
    assert_eq!(
        book_reviews.get("Pride and Prejudice").map(OwnedText::as_str),
        Some("Very enjoyable.")
    );
    assert_eq!(book_reviews["Pride and Prejudice"], "Very enjoyable.");

    let mut listed: Vec<(String, String)> = book_reviews
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    listed.sort();
    assert_eq!(
        listed,
        vec![
            (
                "Adventures of Huckleberry Finn".to_string(),
                "My favorite book.".to_string()
            ),
            ("Grimms' Fairy Tales".to_string(), "Masterpiece.".to_string()),
            ("Pride and Prejudice".to_string(), "Very enjoyable.".to_string()),
        ]
    );
}

// Test: asserted-presence access on a missing key.
// Verifies: the indexing form halts instead of returning a default.
#[test]
#[should_panic(expected = "key not found")]
fn review_for_missing_title_panics() {
    let book_reviews = Reviews::new();
    let _review: &OwnedText = &book_reviews["Les Misérables"];
}

// Test: map of maps with an in-place update of an inner table.
// Assumes: emplace returns the existing inner table when the outer key exists.
// Verifies: inner "group" table updated in place, old value released,
//           outer size unchanged.
#[test]
fn nested_config_scenario() {
    let released: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = released.clone();
    let inner = TableConfig::<OwnedText, OwnedText>::new()
        .on_value_drop(move |v| sink.borrow_mut().push(v.into_string()));

    let mut config: AssociativeTable<OwnedText, Reviews> = AssociativeTable::new();
    let mut put = |section: &str, key: &str, value: &str| {
        config
            .emplace_with(section.into(), || inner.clone().build())
            .0
            .into_mut()
            .insert_or_assign(key.into(), value.into());
    };
    put("user", "name", "Joe");
    put("user", "groups", "proj1,proj3");
    put("group", "proj1", "Energy");
    put("group", "proj2", "Windy");
    put("group", "proj3", "Oil");
    put("admin", "employees", "2302");
    assert!(released.borrow().is_empty());

    put("group", "proj2", "Wind");

    assert_eq!(config.len(), 3);
    let group = config.get("group").expect("group section present");
    assert_eq!(group.len(), 3);
    assert_eq!(
        inner_snapshot(group),
        BTreeMap::from([
            ("proj1".to_string(), "Energy".to_string()),
            ("proj2".to_string(), "Wind".to_string()),
            ("proj3".to_string(), "Oil".to_string()),
        ])
    );
    assert_eq!(*released.borrow(), vec!["Windy".to_string()]);
    assert_eq!(config["user"]["name"], "Joe");
    assert_eq!(config["admin"]["employees"], "2302");

    // Walk every section and its entries, as a listing would.
    let mut lines = Vec::new();
    for (section, table) in &config {
        assert!(table.bucket_count() > table.len());
        for (k, v) in table {
            lines.push(format!("{section}: {k} - {v}"));
        }
    }
    lines.sort();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "admin: employees - 2302");
    assert_eq!(lines[3], "group: proj3 - Oil");

    // Dropping the outer table destroys each inner table, whose hook
    // releases every remaining inner value once.
    drop(config);
    let mut all = released.borrow().clone();
    all.sort();
    assert_eq!(
        all,
        vec!["2302", "Energy", "Joe", "Oil", "Wind", "Windy", "proj1,proj3"]
    );
}

// Test: inner tables mutated through get_mut.
// Verifies: mutation via the outer table's value reference is visible.
#[test]
fn nested_mutation_through_get_mut() {
    let mut outer: AssociativeTable<OwnedText, AssociativeTable<OwnedText, u32>> =
        AssociativeTable::new();
    outer.emplace("counts".into(), AssociativeTable::new());
    for word in ["a", "b", "a", "c", "a"] {
        let counts = outer.get_mut("counts").expect("present");
        *counts.emplace(word.into(), 0).0.into_mut() += 1;
    }
    let counts = &outer["counts"];
    assert_eq!(counts["a"], 3);
    assert_eq!(counts["b"], 1);
    assert_eq!(counts.len(), 3);
    assert!(outer.erase("counts"));
    assert!(outer.is_empty());
}

// Test: hooks on both levels of a nested table.
// Assumes: the outer value hook receives the inner table by value.
// Verifies: outer hook runs once per inner table; inner key hooks run once
//           per inner entry when the inner table is dropped by the hook.
#[test]
fn nested_hooks_run_depth_first_once() {
    let events: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let inner_events = events.clone();
    let inner_cfg = TableConfig::<OwnedText, u32>::new()
        .on_key_drop(move |k| inner_events.borrow_mut().push(format!("inner:{k}")));
    let outer_events = events.clone();
    let mut outer = TableConfig::<u32, AssociativeTable<OwnedText, u32>>::new()
        .on_value_drop(move |t| {
            outer_events
                .borrow_mut()
                .push(format!("outer:{}", t.len()));
            drop(t);
        })
        .build();

    for section in 0..3u32 {
        let (entry, _) = outer.emplace_with(section, || inner_cfg.clone().build());
        let table = entry.into_mut();
        for i in 0..=section {
            table.insert_or_assign(format!("{section}.{i}").into(), i);
        }
    }
    assert!(outer.erase(&1));
    {
        let erased = events.borrow();
        assert_eq!(erased[0], "outer:2");
        let mut inner_keys = erased[1..].to_vec();
        inner_keys.sort();
        assert_eq!(inner_keys, vec!["inner:1.0", "inner:1.1"]);
    }

    outer.destroy();
    let all = events.borrow();
    // Three inner tables and six inner keys in total.
    assert_eq!(all.len(), 9);
    assert_eq!(all.iter().filter(|e| e.starts_with("outer:")).count(), 3);
    for key in ["0.0", "1.0", "1.1", "2.0", "2.1", "2.2"] {
        let tag = format!("inner:{key}");
        assert_eq!(all.iter().filter(|e| **e == tag).count(), 1, "{tag}");
    }
}

// Test: set over map.
// Verifies: put deduplicates, iteration yields keys only.
#[test]
fn set_of_words() {
    let mut set: AssociativeSet<OwnedText> = AssociativeSet::new();
    for w in ["Hello", "You", "Tube", "You"] {
        set.put(w.into());
    }
    assert_eq!(set.len(), 3);
    let mut words: Vec<&str> = set.iter().map(|w| w.as_str()).collect();
    words.sort();
    assert_eq!(words, vec!["Hello", "Tube", "You"]);
}

// Test: growth with owning values.
// Verifies: OwnedText values survive many rehashes unchanged and no value
//           is released while still stored.
#[test]
fn owned_values_survive_growth() {
    let released = Rc::new(RefCell::new(0usize));
    let sink = released.clone();
    let mut t = TableConfig::<OwnedText, OwnedText>::new()
        .on_value_drop(move |_| *sink.borrow_mut() += 1)
        .build();
    for i in 0..5000 {
        t.insert_or_assign(format!("key-{i}").into(), format!("value-{i}").into());
    }
    assert_eq!(*released.borrow(), 0);
    for i in (0..5000).step_by(7) {
        assert_eq!(t[format!("key-{i}").as_str()], format!("value-{i}").as_str());
    }
    drop(t);
    assert_eq!(*released.borrow(), 5000);
}
