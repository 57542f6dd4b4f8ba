use avl_core::marshal::{BytesMarshaller, I64Marshaller, StringMarshaller};
use avl_core::{AvlTree, AvlTreeMarshaller, InvariantViolation, KeyMarshaller, MarshalError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn marshaller() -> AvlTreeMarshaller<I64Marshaller> {
    AvlTreeMarshaller::natural(I64Marshaller)
}

fn word(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Hand-encodes a node holding an `i64` key.
fn node(key: i64, index: i32, left: Option<Vec<u8>>, right: Option<Vec<u8>>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(word(8));
    out.extend(key.to_be_bytes());
    out.extend(word(index));
    for (child, marker) in [(left, 2), (right, 4)] {
        match child {
            Some(child) => {
                out.extend(word(marker));
                out.extend(child);
            }
            None => out.extend(word(0)),
        }
    }
    out
}

fn tree_bytes(count: i32, root: Vec<u8>) -> Vec<u8> {
    let mut out = vec![0];
    out.extend(word(count));
    out.extend(root);
    out
}

fn decode(bytes: &[u8]) -> Result<AvlTree<i64>, MarshalError> {
    marshaller().deserialize(bytes)
}

// ─── Round trips ─────────────────────────────────────────────────────────────

#[test]
fn empty_tree_is_one_zero_byte() {
    let tree: AvlTree<i64> = AvlTree::new();
    let bytes = marshaller().serialize(&tree).unwrap();
    assert_eq!(bytes, [0]);
    let copy = decode(&bytes).unwrap();
    assert!(copy.is_empty());
    assert_eq!(copy.validate(), Ok(()));
}

#[test]
fn hand_encoded_tree_decodes() {
    let bytes = tree_bytes(3, node(2, 1, Some(node(1, 0, None, None)), Some(node(3, 2, None, None))));
    let tree = decode(&bytes).unwrap();
    assert_eq!(tree.keys(), [&1, &2, &3]);
    assert_eq!(tree.structure().to_string(), "2\n├─ 1\n└─ 3");
    assert_eq!(marshaller().serialize(&tree).unwrap(), bytes);
}

#[test]
fn string_keys_round_trip() {
    let tree: AvlTree<String> = ["delta", "alpha", "charlie", "bravo"].into_iter().map(String::from).collect();
    let marshaller = AvlTreeMarshaller::natural(StringMarshaller);
    let copy: AvlTree<String> = marshaller.deserialize(&marshaller.serialize(&tree).unwrap()).unwrap();
    assert_eq!(copy.keys(), tree.keys());
}

#[test]
fn custom_order_survives_the_round_trip() {
    let descending = |a: &Vec<u8>, b: &Vec<u8>| b.cmp(a);
    let mut tree = AvlTree::with_comparator(descending);
    for key in [vec![1], vec![3], vec![2, 0]] {
        tree.insert(key);
    }
    let marshaller = AvlTreeMarshaller::new(descending, BytesMarshaller);
    let mut copy: AvlTree<Vec<u8>, _> = marshaller.deserialize(&marshaller.serialize(&tree).unwrap()).unwrap();
    assert_eq!(copy.keys(), [&vec![3], &vec![2, 0], &vec![1]]);
    copy.insert(vec![0]);
    assert_eq!(copy.last(), Some(&vec![0]));
}

#[test]
fn decoded_tree_accepts_further_updates() {
    let tree: AvlTree<i64> = (0..50).collect();
    let mut copy = decode(&marshaller().serialize(&tree).unwrap()).unwrap();
    for key in 50..100 {
        copy.insert(key);
    }
    for key in (0..100).step_by(3) {
        copy.remove(&key);
    }
    assert_eq!(copy.validate(), Ok(()));
    assert_eq!(copy.len(), 66);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Serialization preserves keys and shape.
    #[test]
    fn round_trip_preserves_keys_and_shape(values in proptest::collection::vec(any::<i64>(), 0..300)) {
        let tree: AvlTree<i64> = values.into_iter().collect();
        let copy = decode(&marshaller().serialize(&tree).unwrap()).unwrap();
        prop_assert_eq!(copy.keys(), tree.keys());
        prop_assert_eq!(copy.structure().to_string(), tree.structure().to_string());
        prop_assert_eq!(copy.validate(), Ok(()));
    }

    /// Every strict prefix longer than one byte is rejected.
    #[test]
    fn truncated_streams_are_rejected(values in proptest::collection::vec(any::<i64>(), 1..20), cut in any::<prop::sample::Index>()) {
        let tree: AvlTree<i64> = values.into_iter().collect();
        let bytes = marshaller().serialize(&tree).unwrap();
        // A lone zero byte is the empty tree, so start past it.
        let len = cut.index(bytes.len() - 2) + 2;
        prop_assert!(decode(&bytes[..len]).is_err());
    }
}

// ─── Malformed input ─────────────────────────────────────────────────────────

#[test]
fn rejects_no_input() {
    assert_eq!(decode(&[]), Err(MarshalError::Truncated { offset: 0, needed: 1 }));
}

#[test]
fn rejects_unknown_tree_marker() {
    assert_eq!(decode(&[1]), Err(MarshalError::InvalidMarker { offset: 0, marker: 1 }));
}

#[test]
fn rejects_bad_counts() {
    let single = node(1, 0, None, None);
    assert_eq!(decode(&tree_bytes(0, single.clone())), Err(MarshalError::InvalidCount { count: 0 }));
    assert_eq!(decode(&tree_bytes(-1, single.clone())), Err(MarshalError::InvalidCount { count: -1 }));
    // Declares two nodes but carries one.
    assert!(decode(&tree_bytes(2, single)).is_err());
}

#[test]
fn rejects_bad_indexes() {
    let out_of_range = tree_bytes(1, node(1, 1, None, None));
    assert_eq!(decode(&out_of_range), Err(MarshalError::InvalidIndex { index: 1 }));

    let repeated = tree_bytes(2, node(2, 0, Some(node(1, 0, None, None)), None));
    assert_eq!(decode(&repeated), Err(MarshalError::InvalidIndex { index: 0 }));

    let swapped = tree_bytes(2, node(2, 0, Some(node(1, 1, None, None)), None));
    assert!(matches!(
        decode(&swapped),
        Err(MarshalError::Structure(InvariantViolation::Links { .. }))
    ));
}

#[test]
fn rejects_wrong_child_markers() {
    let mut bytes = tree_bytes(1, node(1, 0, None, None));
    let left_marker = bytes.len() - 8;
    bytes[left_marker..left_marker + 4].copy_from_slice(&word(4));
    assert_eq!(
        decode(&bytes),
        Err(MarshalError::InvalidMarker {
            offset: left_marker,
            marker: 4
        })
    );
}

#[test]
fn rejects_unordered_keys() {
    let bytes = tree_bytes(2, node(1, 1, Some(node(2, 0, None, None)), None));
    assert!(matches!(
        decode(&bytes),
        Err(MarshalError::Structure(InvariantViolation::Order { .. }))
    ));
}

#[test]
fn rejects_unbalanced_shapes() {
    let chain = node(1, 0, None, Some(node(2, 1, None, Some(node(3, 2, None, None)))));
    assert!(matches!(
        decode(&tree_bytes(3, chain)),
        Err(MarshalError::Structure(InvariantViolation::Balance { .. }))
    ));
}

#[test]
fn rejects_trailing_bytes() {
    let mut bytes = tree_bytes(1, node(1, 0, None, None));
    bytes.extend([0, 0]);
    assert_eq!(decode(&bytes), Err(MarshalError::TrailingBytes { remaining: 2 }));
}

#[test]
fn rejects_negative_key_length() {
    let mut bytes = vec![0];
    bytes.extend(word(1));
    bytes.extend(word(-5));
    bytes.extend([0; 12]);
    assert_eq!(decode(&bytes), Err(MarshalError::InvalidLength { offset: 5, length: -5 }));
}

#[test]
fn reports_key_marshaller_failures() {
    let mut bytes = vec![0];
    bytes.extend(word(1));
    bytes.extend(word(2));
    bytes.extend([0xC3, 0x28]);
    bytes.extend(word(0));
    bytes.extend(word(0));
    bytes.extend(word(0));
    let result: Result<AvlTree<String>, _> = AvlTreeMarshaller::natural(StringMarshaller).deserialize(&bytes);
    assert!(matches!(result, Err(MarshalError::Key(_))));

    assert!(KeyMarshaller::<i64>::deserialize(&I64Marshaller, &[1, 2, 3]).is_err());
}
