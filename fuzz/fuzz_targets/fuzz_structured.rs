#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::{Arbitrary, Unstructured};

use bramble::arena::{Arena, ValueId};
use bramble::cbor::{self, DecodeLimits};
use bramble::{json, patch, pointer};

const MAX_DEPTH: u32 = 4;

/// Arbitrary-generated value tree restricted to shapes that round-trip
/// losslessly through both CBOR and JSON, so the equality checks below
/// compare like with like instead of fighting lossy-conversion noise.
#[derive(Debug, Clone)]
enum Tree {
    Uint(u64),
    NegInt(u64),
    Text(String),
    Bool(bool),
    Null,
    Array(Vec<Tree>),
    Map(Vec<(String, Tree)>),
}

fn arbitrary_tree(u: &mut Unstructured<'_>, depth: u32) -> arbitrary::Result<Tree> {
    let variant: u8 = if depth == 0 { u.int_in_range(0..=4)? } else { u.int_in_range(0..=6)? };
    Ok(match variant {
        0 => Tree::Uint(u.int_in_range(0..=1_000_000_000)?),
        1 => Tree::NegInt(u.int_in_range(0..=1_000_000_000)?),
        2 => Tree::Text(String::arbitrary(u)?),
        3 => Tree::Bool(u.arbitrary()?),
        4 => Tree::Null,
        5 => {
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
                entries.push((arbitrary_key(u)?, arbitrary_tree(u, depth - 1)?));
            }
            Tree::Map(entries)
        }
    })
}

/// Keys drawn from a small alphabet so pointer paths built from them are
/// likely to actually address something, rather than almost always
/// missing.
fn arbitrary_key(u: &mut Unstructured<'_>) -> arbitrary::Result<String> {
    let len: usize = u.int_in_range(1..=4)?;
    let mut s = String::with_capacity(len);
    for _ in 0..len {
        let c: u8 = u.int_in_range(0..=25)?;
        s.push((b'a' + c) as char);
    }
    Ok(s)
}

fn build(arena: &mut Arena, tree: &Tree) -> ValueId {
    match tree {
        Tree::Uint(v) => arena.uint(*v),
        Tree::NegInt(m) => arena.neg_int(*m),
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

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let (doc_tree, patch_tree, path) = match (|| -> arbitrary::Result<_> {
        let doc = arbitrary_tree(&mut u, MAX_DEPTH)?;
        let patch_tree = arbitrary_tree(&mut u, MAX_DEPTH)?;
        let path = arbitrary_key(&mut u)?;
        Ok((doc, patch_tree, path))
    })() {
        Ok(v) => v,
        Err(_) => return,
    };

    let mut arena = Arena::new();
    let root = build(&mut arena, &doc_tree);

    // Both codecs must accept whatever they just produced.
    let cbor_bytes = cbor::dump(&arena, root);
    let (roundtripped, _) = cbor::load_into(&mut arena, &cbor_bytes, &DecodeLimits::default()).unwrap();
    assert!(arena.value_equal(root, roundtripped));
    arena.release(roundtripped);

    let json_text = json::dump(&arena, root);
    let (_, _, consumed) = json::load(&json_text).unwrap();
    assert_eq!(consumed, json_text.len());

    // Pointer engine: a lookup under a random single-segment path must
    // never panic regardless of whether `root` is even a map.
    let rooted_path = format!("/{path}");
    let _ = pointer::get(&arena, root, &rooted_path);

    // Merge patch: applying an arbitrary second tree as a patch must never
    // panic and must leave `root` as a valid, still-free-of-its-own-parent
    // value (merge_patch never re-parents `target` itself).
    let patch_root = build(&mut arena, &patch_tree);
    patch::merge_patch(&mut arena, root, patch_root);
    assert!(arena.is_free(root));
    let _ = json::dump(&arena, root);
});
