#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::Unstructured;

use bramble::arena::{Arena, ValueId};
use bramble::cbor::DecodeLimits;
use bramble::json::{self, JsonFlags};

const MAX_DEPTH: u32 = 5;

/// A superset of JSON-representable shapes: includes byte strings, tags,
/// and simple-extension values, none of which JSON can express losslessly.
/// The serializer must substitute something JSON-legal for these rather
/// than panic or emit invalid output.
#[derive(Debug, Clone)]
enum Tree {
    Uint(u64),
    NegInt(u64),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    Null,
    Real(f64),
    Tagged(u64, Box<Tree>),
    Array(Vec<Tree>),
    Map(Vec<(String, Tree)>),
}

fn arbitrary_tree(u: &mut Unstructured<'_>, depth: u32) -> arbitrary::Result<Tree> {
    let variant: u8 = if depth == 0 { u.int_in_range(0..=6)? } else { u.int_in_range(0..=8)? };
    Ok(match variant {
        0 => Tree::Uint(u.arbitrary()?),
        1 => Tree::NegInt(u.arbitrary()?),
        2 => Tree::Bytes(Vec::<u8>::arbitrary(u)?),
        3 => Tree::Text(String::arbitrary(u)?),
        4 => Tree::Bool(u.arbitrary()?),
        5 => Tree::Null,
        6 => Tree::Real(u.arbitrary()?),
        7 => Tree::Tagged(u.arbitrary()?, Box::new(arbitrary_tree(u, depth - 1)?)),
        8 if depth > 0 => {
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
                entries.push((String::arbitrary(u)?, arbitrary_tree(u, depth.saturating_sub(1))?));
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
        Tree::Real(f) => arena.real(*f),
        Tree::Tagged(tag, inner) => {
            let content = build(arena, inner);
            arena.tag(*tag, content).unwrap()
        }
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
    let tree = match arbitrary_tree(&mut u, MAX_DEPTH) {
        Ok(t) => t,
        Err(_) => return,
    };

    let mut arena = Arena::new();
    let root = build(&mut arena, &tree);

    // Must never panic, and the output must always be valid JSON: the
    // lossy fallback (Bytes/Tag/extension Simple -> null, NaN/Inf -> 0.0)
    // still has to parse back.
    let text = json::dump(&arena, root);
    let (_, _, consumed) = json::load(&text).unwrap_or_else(|e| {
        panic!("serializer produced unparseable JSON {text:?}: {e}");
    });
    assert_eq!(consumed, text.len());

    let pretty = json::dump_pretty(&arena, root);
    let limits = DecodeLimits::default();
    json::load_with(&pretty, JsonFlags::empty(), &limits)
        .unwrap_or_else(|e| panic!("pretty serializer produced unparseable JSON {pretty:?}: {e}"));
});
