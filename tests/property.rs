//! Property-based tests for bramble's value tree, CBOR codec, and JSON
//! Pointer engine.

use proptest::prelude::*;

use bramble::arena::{Arena, ValueId};
use bramble::{cbor, json, pointer};

// =========================================================================
// Value tree generation
// =========================================================================

#[derive(Debug, Clone)]
enum Tree {
    Uint(u64),
    NegInt(u64),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    Null,
    Array(Vec<Tree>),
    Map(Vec<(String, Tree)>),
}

fn arb_leaf() -> impl Strategy<Value = Tree> {
    prop_oneof![
        any::<u64>().prop_map(Tree::Uint),
        any::<u64>().prop_map(Tree::NegInt),
        prop::collection::vec(any::<u8>(), 0..20).prop_map(Tree::Bytes),
        "[a-zA-Z0-9_ ]{0,30}".prop_map(Tree::Text),
        any::<bool>().prop_map(Tree::Bool),
        Just(Tree::Null),
    ]
}

fn arb_tree(depth: u32) -> BoxedStrategy<Tree> {
    if depth == 0 {
        arb_leaf().boxed()
    } else {
        prop_oneof![
            3 => arb_leaf(),
            1 => prop::collection::vec(arb_tree(depth - 1), 0..4).prop_map(Tree::Array),
            1 => prop::collection::vec(("[a-z]{1,8}", arb_tree(depth - 1)), 0..4).prop_map(Tree::Map),
        ]
        .boxed()
    }
}

fn build(arena: &mut Arena, tree: &Tree) -> ValueId {
    match tree {
        Tree::Uint(v) => arena.uint(*v),
        Tree::NegInt(m) => arena.neg_int(*m),
        Tree::Bytes(b) => arena.bytes(b.clone()),
        Tree::Text(s) => arena.text(s.as_bytes()),
        Tree::Bool(b) => arena.boolean(*b),
        Tree::Null => arena.null(),
        Tree::Array(items) => {
            let a = arena.array();
            for item in items {
                let child = build(arena, item);
                arena.insert_tail(a, child).unwrap();
            }
            a
        }
        Tree::Map(entries) => {
            let m = arena.map();
            for (key, value) in entries {
                let v = build(arena, value);
                arena.map_insert(m, key, v).unwrap();
            }
            m
        }
    }
}

/// Subset of `Tree` that survives a JSON round-trip losslessly: no raw
/// bytes (JSON has no byte-string type) and small `NegInt` magnitudes, so
/// nothing overflows `f64`/`i64` precision through the text encoding.
fn arb_json_safe_tree(depth: u32) -> BoxedStrategy<Tree> {
    let leaf = prop_oneof![
        (0u64..1_000_000_000).prop_map(Tree::Uint),
        (0u64..1_000_000_000).prop_map(Tree::NegInt),
        "[a-zA-Z0-9_ ]{0,30}".prop_map(Tree::Text),
        any::<bool>().prop_map(Tree::Bool),
        Just(Tree::Null),
    ];
    if depth == 0 {
        leaf.boxed()
    } else {
        prop_oneof![
            3 => leaf,
            1 => prop::collection::vec(arb_json_safe_tree(depth - 1), 0..4).prop_map(Tree::Array),
            1 => prop::collection::vec(("[a-z]{1,8}", arb_json_safe_tree(depth - 1)), 0..4).prop_map(Tree::Map),
        ]
        .boxed()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// CBOR round-trip (canonical): decoding a freshly-encoded value back
    /// into the same arena yields a structurally-equal tree, and
    /// re-encoding that decoded tree reproduces the same bytes
    /// (§8 property 1: `load(dump(v)) = v`, `dump(load(dump(v))) = dump(v)`).
    #[test]
    fn cbor_round_trips_structurally_and_byte_for_byte(tree in arb_tree(3)) {
        let mut arena = Arena::new();
        let root = build(&mut arena, &tree);
        let encoded = cbor::dump(&arena, root);

        let limits = cbor::DecodeLimits::default();
        let (decoded_root, consumed) = cbor::load_into(&mut arena, &encoded, &limits).unwrap();
        prop_assert_eq!(consumed, encoded.len());
        prop_assert!(arena.value_equal(root, decoded_root));

        let reencoded = cbor::dump(&arena, decoded_root);
        prop_assert_eq!(encoded, reencoded);
    }

    /// JSON round-trip on the lossless subset (§8 property 2).
    #[test]
    fn json_round_trips_on_lossless_subset(tree in arb_json_safe_tree(3)) {
        let mut arena = Arena::new();
        let root = build(&mut arena, &tree);
        let text = json::dump(&arena, root);

        let (decoded_arena, decoded_root, _) = json::load(&text).unwrap();
        let retext = json::dump(&decoded_arena, decoded_root);
        prop_assert_eq!(text, retext);
    }

    /// `duplicate` produces a structurally-equal, fully detached subtree.
    #[test]
    fn duplicate_is_structurally_equal_and_free(tree in arb_tree(3)) {
        let mut arena = Arena::new();
        let root = build(&mut arena, &tree);
        let dup = arena.duplicate(root);
        prop_assert!(arena.value_equal(root, dup));
        prop_assert!(arena.is_free(dup));
    }

    /// Pointer `set` then `get` returns the value just set, and it is
    /// owned (has a parent) afterwards (§8 property 3).
    #[test]
    fn pointer_set_then_get_round_trips(key in "[a-z]{1,8}", value in 0i64..1000) {
        let mut arena = Arena::new();
        let root = arena.map();
        let path = format!("/{key}");
        pointer::set_int(&mut arena, root, &path, value);
        prop_assert_eq!(pointer::get_int(&arena, root, &path), Some(value));
        let id = pointer::get(&arena, root, &path).unwrap();
        prop_assert!(arena.parent(id).is_some());
    }

    /// Pointer `remove` detaches the subtree and clears it from the tree
    /// (§8 property 4).
    #[test]
    fn pointer_remove_detaches(key in "[a-z]{1,8}", value in 0i64..1000) {
        let mut arena = Arena::new();
        let root = arena.map();
        let path = format!("/{key}");
        pointer::set_int(&mut arena, root, &path, value);
        let removed = pointer::remove(&mut arena, root, &path).unwrap();
        prop_assert_eq!(pointer::get(&arena, root, &path), None);
        prop_assert!(arena.is_free(removed));
        arena.release(removed);
    }

    /// Every non-BMP scalar round-trips through a JSON surrogate pair
    /// (§8 property 7).
    #[test]
    fn non_bmp_scalar_round_trips_through_surrogate_pair(cp in 0x10000u32..0x10FFFF) {
        prop_assume!(char::from_u32(cp).is_some());
        let ch = char::from_u32(cp).unwrap();
        let mut arena = Arena::new();
        let text = arena.text(ch.to_string().as_bytes());
        let dumped = json::dump(&arena, text);
        let (decoded_arena, decoded_root, _) = json::load(&dumped).unwrap();
        prop_assert_eq!(decoded_arena.as_text_str(decoded_root).into_owned(), ch.to_string());
    }

    /// The parent back-reference invariant (§8 property 6): every child of
    /// a just-built array reports that array as its parent.
    #[test]
    fn parent_invariant_holds_for_array_children(items in prop::collection::vec(0i64..1000, 0..8)) {
        let mut arena = Arena::new();
        let array = arena.array();
        for v in &items {
            let child = arena.integer(*v);
            arena.insert_tail(array, child).unwrap();
        }
        for child in arena.iter(array) {
            prop_assert_eq!(arena.parent(child), Some(array));
        }
    }
}
