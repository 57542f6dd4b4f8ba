use std::collections::{BTreeMap, BTreeSet};

use avl_core::{AvlTreeMap, Cursor, CursorError, SingletonOrOrderedSet};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 1_000;

fn key_strategy() -> impl Strategy<Value = i32> {
    0i32..50
}

fn value_strategy() -> impl Strategy<Value = i32> {
    0i32..8
}

fn pairs<'a, C: Cursor<Item = (&'a i32, &'a char)>>(cursor: &mut C) -> Vec<(i32, char)> {
    let mut pairs = Vec::new();
    while cursor.next().unwrap() {
        let (key, value) = cursor.get().unwrap();
        pairs.push((*key, *value));
    }
    pairs
}

fn pairs_backward<'a, C: Cursor<Item = (&'a i32, &'a char)>>(cursor: &mut C) -> Vec<(i32, char)> {
    let mut pairs = Vec::new();
    while cursor.previous().unwrap() {
        let (key, value) = cursor.get().unwrap();
        pairs.push((*key, *value));
    }
    pairs
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i32, i32),
    Remove(i32, i32),
    RemoveKey(i32),
    FindValue(i32, i32),
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Remove(k, v)),
        1 => key_strategy().prop_map(MapOp::RemoveKey),
        2 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::FindValue(k, v)),
    ]
}

// ─── Duplicate values ────────────────────────────────────────────────────────

#[test]
fn values_under_one_key() {
    let mut map = AvlTreeMap::new(true);
    assert_eq!(map.insert("K", "a"), None);
    assert_eq!(map.insert("K", "b"), None);

    assert_eq!(map.len(), 1);
    assert_eq!(map.find_value(&"K", &"a"), Some(&"a"));
    assert_eq!(map.find_value(&"K", &"b"), Some(&"b"));
    assert!(map.find(&"K").unwrap().is_ordered_set());
    map.validate().unwrap();

    assert_eq!(map.remove(&"K", &"a"), Some("a"));
    assert_eq!(map.find_value(&"K", &"a"), None);
    assert_eq!(map.find_value(&"K", &"b"), Some(&"b"));
    assert_eq!(map.find(&"K").unwrap().singleton(), Some(&"b"));
    map.validate().unwrap();

    assert_eq!(map.remove(&"K", &"b"), Some("b"));
    assert_eq!(map.find(&"K"), None);
    assert!(map.is_empty());
    map.validate().unwrap();
}

#[test]
fn equal_value_is_rejected() {
    let mut map = AvlTreeMap::new(true);
    assert_eq!(map.insert(1, 'x'), None);
    assert_eq!(map.insert(1, 'x'), Some('x'));
    assert!(map.find(&1).unwrap().is_singleton());

    assert_eq!(map.insert(1, 'y'), None);
    assert_eq!(map.insert(1, 'y'), Some('y'));
    assert_eq!(map.find(&1).unwrap().len(), 2);
}

#[test]
fn unique_map_replaces_values() {
    let mut map = AvlTreeMap::new(false);
    assert!(!map.is_duplicates_allowed());
    assert_eq!(map.insert(1, 'a'), None);
    assert_eq!(map.insert(1, 'b'), Some('a'));
    assert_eq!(map.find(&1), Some(&SingletonOrOrderedSet::Singleton('b')));
    assert_eq!(map.remove(&1, &'a'), None);
    assert_eq!(map.remove(&1, &'b'), Some('b'));
    assert!(map.is_empty());
}

#[test]
fn remove_key_takes_every_value() {
    let mut map = AvlTreeMap::new(true);
    for value in ['c', 'a', 'b'] {
        map.insert(7, value);
    }
    map.insert(8, 'z');

    let removed = map.remove_key(&7).unwrap();
    assert_eq!(removed.values().copied().collect::<Vec<_>>(), ['a', 'b', 'c']);
    assert_eq!(map.remove_key(&7), None);
    assert_eq!(map.keys(), [&8]);
}

#[test]
fn boundary_queries_use_keys() {
    let mut map = AvlTreeMap::new(true);
    for (key, value) in [(10, 'a'), (20, 'b'), (20, 'c'), (30, 'd')] {
        map.insert(key, value);
    }
    assert_eq!(map.find_greater(&10).map(|(k, v)| (*k, v.len())), Some((20, 2)));
    assert_eq!(map.find_greater_or_equal(&21).map(|(k, _)| *k), Some(30));
    assert_eq!(map.find_less(&20).map(|(k, _)| *k), Some(10));
    assert_eq!(map.find_less_or_equal(&29).map(|(k, _)| *k), Some(20));
    assert_eq!(map.first().map(|(k, _)| *k), Some(10));
    assert_eq!(map.last().map(|(k, _)| *k), Some(30));
}

#[test]
fn value_comparator_orders_duplicates() {
    let mut map = AvlTreeMap::with_comparators(
        |a: &i32, b: &i32| a.cmp(b),
        |a: &i32, b: &i32| b.cmp(a),
        true,
    );
    for value in [1, 3, 2] {
        map.insert(0, value);
    }
    let values: Vec<i32> = map.find(&0).unwrap().values().copied().collect();
    assert_eq!(values, [3, 2, 1]);
}

// ─── Cursors ─────────────────────────────────────────────────────────────────

fn sample() -> AvlTreeMap<i32, char> {
    let mut map = AvlTreeMap::new(true);
    for (key, value) in [(2, 'c'), (1, 'x'), (2, 'a'), (3, 'q'), (2, 'b')] {
        map.insert(key, value);
    }
    map
}

#[test]
fn key_cursor_steps_once_per_key() {
    let map = sample();
    let mut cursor = map.cursor();

    let mut seen = Vec::new();
    while cursor.next().unwrap() {
        let (key, values) = cursor.get().unwrap();
        seen.push((*key, values.len()));
    }
    assert_eq!(seen, [(1, 1), (2, 3), (3, 1)]);

    cursor.before(&2).unwrap();
    assert!(cursor.next().unwrap());
    assert_eq!(cursor.get().unwrap().0, &2);
}

#[test]
fn key_cursor_rejects_value_positioning() {
    let map = sample();
    let mut cursor = map.cursor();
    assert_eq!(
        cursor.before_value(&2, &'a'),
        Err(CursorError::UnsupportedOperation { operation: "before_value" })
    );
    assert_eq!(
        cursor.after_value(&2, &'a'),
        Err(CursorError::UnsupportedOperation { operation: "after_value" })
    );
    cursor.close();
    assert_eq!(cursor.after_value(&2, &'a'), Err(CursorError::Closed { operation: "after_value" }));
}

#[test]
fn flat_cursor_visits_every_pair() {
    let map = sample();
    let mut cursor = map.flat_cursor();

    let expected = [(1, 'x'), (2, 'a'), (2, 'b'), (2, 'c'), (3, 'q')];
    assert_eq!(pairs(&mut cursor), expected);
    assert!(!cursor.available());

    cursor.after_last().unwrap();
    let mut reversed = expected.to_vec();
    reversed.reverse();
    assert_eq!(pairs_backward(&mut cursor), reversed);

    assert!(cursor.last().unwrap());
    assert_eq!(cursor.get(), Ok((&3, &'q')));
    assert!(cursor.first().unwrap());
    assert_eq!(cursor.get(), Ok((&1, &'x')));
}

#[test]
fn flat_cursor_key_positioning_spans_duplicates() {
    let map = sample();
    let mut cursor = map.flat_cursor();

    cursor.before(&2).unwrap();
    assert_eq!(pairs(&mut cursor), [(2, 'a'), (2, 'b'), (2, 'c'), (3, 'q')]);
    cursor.before(&2).unwrap();
    assert_eq!(pairs_backward(&mut cursor), [(1, 'x')]);

    cursor.after(&2).unwrap();
    assert_eq!(pairs(&mut cursor), [(3, 'q')]);
    cursor.after(&2).unwrap();
    assert_eq!(pairs_backward(&mut cursor), [(2, 'c'), (2, 'b'), (2, 'a'), (1, 'x')]);
}

#[test]
fn flat_cursor_value_positioning() {
    let map = sample();
    let mut cursor = map.flat_cursor();

    cursor.before_value(&2, &'b').unwrap();
    assert_eq!(pairs(&mut cursor), [(2, 'b'), (2, 'c'), (3, 'q')]);
    cursor.before_value(&2, &'b').unwrap();
    assert_eq!(pairs_backward(&mut cursor), [(2, 'a'), (1, 'x')]);

    cursor.after_value(&2, &'b').unwrap();
    assert_eq!(pairs(&mut cursor), [(2, 'c'), (3, 'q')]);
    cursor.after_value(&2, &'b').unwrap();
    assert_eq!(pairs_backward(&mut cursor), [(2, 'b'), (2, 'a'), (1, 'x')]);

    // Values outside the set's range land at its edges.
    cursor.before_value(&2, &'0').unwrap();
    assert_eq!(pairs_backward(&mut cursor), [(1, 'x')]);
    cursor.after_value(&2, &'z').unwrap();
    assert_eq!(pairs(&mut cursor), [(3, 'q')]);

    // A singleton compares against its one value.
    cursor.before_value(&1, &'x').unwrap();
    assert_eq!(pairs(&mut cursor).first(), Some(&(1, 'x')));
    cursor.after_value(&1, &'x').unwrap();
    assert_eq!(pairs(&mut cursor).first(), Some(&(2, 'a')));
    cursor.after_value(&1, &'a').unwrap();
    assert_eq!(pairs(&mut cursor).first(), Some(&(1, 'x')));

    // An absent key falls back to key positioning.
    cursor.before_value(&0, &'a').unwrap();
    assert_eq!(pairs(&mut cursor).len(), 5);
}

#[test]
fn flat_cursor_needs_duplicates_for_value_positioning() {
    let mut map = AvlTreeMap::new(false);
    map.insert(1, 'a');
    let mut cursor = map.flat_cursor();
    assert_eq!(
        cursor.before_value(&1, &'a'),
        Err(CursorError::UnsupportedOperation { operation: "before_value" })
    );
    assert_eq!(
        cursor.after_value(&1, &'a'),
        Err(CursorError::UnsupportedOperation { operation: "after_value" })
    );
    assert_eq!(pairs(&mut cursor), [(1, 'a')]);

    cursor.close();
    assert_eq!(cursor.get(), Err(CursorError::Closed { operation: "get" }));
    assert_eq!(cursor.before_value(&1, &'a'), Err(CursorError::Closed { operation: "before_value" }));
}

// ─── Randomized model check ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random operations on a duplicates map and a BTreeMap of BTreeSets.
    #[test]
    fn map_ops_match_model(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map = AvlTreeMap::new(true);
        let mut model: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();

        for op in &ops {
            match *op {
                MapOp::Insert(k, v) => {
                    let fresh = model.entry(k).or_default().insert(v);
                    prop_assert_eq!(map.insert(k, v).is_none(), fresh, "insert({}, {})", k, v);
                }
                MapOp::Remove(k, v) => {
                    let expected = model.get_mut(&k).and_then(|values| values.take(&v));
                    if model.get(&k).is_some_and(BTreeSet::is_empty) {
                        model.remove(&k);
                    }
                    prop_assert_eq!(map.remove(&k, &v), expected, "remove({}, {})", k, v);
                }
                MapOp::RemoveKey(k) => {
                    let expected = model.remove(&k).map(|values| values.into_iter().collect::<Vec<_>>());
                    let removed = map.remove_key(&k).map(|values| values.values().copied().collect::<Vec<_>>());
                    prop_assert_eq!(removed, expected, "remove_key({})", k);
                }
                MapOp::FindValue(k, v) => {
                    let expected = model.get(&k).and_then(|values| values.get(&v));
                    prop_assert_eq!(map.find_value(&k, &v), expected, "find_value({}, {})", k, v);
                }
            }
            prop_assert_eq!(map.validate(), Ok(()), "invariants broken after {:?}", op);
            prop_assert_eq!(map.len(), model.len(), "len mismatch after {:?}", op);
        }

        let mut cursor = map.flat_cursor();
        let mut flat = Vec::new();
        while cursor.next().unwrap() {
            let (key, value) = cursor.get().unwrap();
            flat.push((*key, *value));
        }
        let expected: Vec<(i32, i32)> = model
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (*key, *value)))
            .collect();
        prop_assert_eq!(flat, expected);
    }
}
