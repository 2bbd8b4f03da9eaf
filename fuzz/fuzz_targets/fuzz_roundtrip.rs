#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::{Arbitrary, Unstructured};

use bramble::arena::{Arena, ValueId};
use bramble::cbor::{self, DecodeLimits};

const MAX_DEPTH: u32 = 5;

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

fn arbitrary_tree(u: &mut Unstructured<'_>, depth: u32) -> arbitrary::Result<Tree> {
    let variant: u8 = if depth == 0 { u.int_in_range(0..=5)? } else { u.int_in_range(0..=7)? };
    Ok(match variant {
        0 => Tree::Uint(u.arbitrary()?),
        1 => Tree::NegInt(u.arbitrary()?),
        2 => Tree::Bytes(Vec::<u8>::arbitrary(u)?),
        3 => Tree::Text(String::arbitrary(u)?),
        4 => Tree::Bool(u.arbitrary()?),
        5 => Tree::Null,
        6 => {
            let len: usize = u.int_in_range(0..=4)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(arbitrary_tree(u, depth - 1)?);
            }
            Tree::Array(items)
        }
        _ => {
            let len: usize = u.int_in_range(0..=4)?;
            let mut entries = Vec::with_capacity(len);
            for _ in 0..len {
                entries.push((String::arbitrary(u)?, arbitrary_tree(u, depth - 1)?));
            }
            Tree::Map(entries)
        }
    })
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
                // Keys may repeat; the map type tolerates duplicates.
                arena.map_insert(m, key, v).unwrap();
            }
            m
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let tree = match arbitrary_tree(&mut u, MAX_DEPTH) {
        Ok(t) => t,
        Err(_) => return,
    };

    let mut arena = Arena::new();
    let root = build(&mut arena, &tree);

    let encoded = cbor::dump(&arena, root);
    let limits = DecodeLimits::default();
    let (decoded, consumed) = cbor::load_into(&mut arena, &encoded, &limits).expect("decode of our own encoding must succeed");
    assert_eq!(consumed, encoded.len(), "decoder did not consume the whole encoding");
    assert!(arena.value_equal(root, decoded), "decoded tree is not structurally equal to the original");

    let reencoded = cbor::dump(&arena, decoded);
    assert_eq!(encoded, reencoded, "re-encoding a decoded value changed its bytes");
});
