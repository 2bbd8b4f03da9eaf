//! JSON Pointer (RFC 6901) evaluation and mutation (§4.4): `get` / `insert`
//! / `replace` / `set` / `remove` / `move_value` / `copy` / `test`, plus
//! the typed convenience wrappers and the path-join helper.
//!
//! Every operation that cannot complete returns `None` rather than
//! panicking (§7's propagation policy); the pointer engine never walks off
//! the end of a tree it was given.

use crate::arena::{Arena, ValueId};
use crate::strutil;

fn tokenize(path: &str) -> Vec<Vec<u8>> {
    if path.is_empty() {
        return Vec::new();
    }
    strutil::split(&path.as_bytes()[1..], b"/")
        .into_iter()
        .map(|tok| {
            let step1 = strutil::replace(tok, b"~1", b"/").expect("~1 is non-empty");
            strutil::replace(&step1, b"~0", b"~").expect("~0 is non-empty")
        })
        .collect()
}

fn escape_token(tok: &[u8]) -> Vec<u8> {
    let step1 = strutil::replace(tok, b"~", b"~0").expect("~ is non-empty");
    strutil::replace(&step1, b"/", b"~1").expect("/ is non-empty")
}

/// Build a pointer string from raw (unescaped) path components.
pub fn join(parts: &[&[u8]]) -> String {
    let mut out = Vec::new();
    for part in parts {
        out.push(b'/');
        out.extend_from_slice(&escape_token(part));
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn parse_index(token: &[u8]) -> Option<usize> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

enum ArrayTarget {
    Index(usize),
    Append,
}

fn array_target(len: usize, token: &[u8]) -> Option<ArrayTarget> {
    if token == b"-" {
        return Some(ArrayTarget::Append);
    }
    let idx = parse_index(token)?;
    match idx.cmp(&len) {
        std::cmp::Ordering::Less => Some(ArrayTarget::Index(idx)),
        std::cmp::Ordering::Equal => Some(ArrayTarget::Append),
        std::cmp::Ordering::Greater => None,
    }
}

fn step_read(arena: &Arena, container: ValueId, token: &[u8]) -> Option<ValueId> {
    if arena.is_array(container) {
        if token == b"-" {
            return arena.last(container);
        }
        let idx = parse_index(token)?;
        arena.iter(container).nth(idx)
    } else if arena.is_map(container) {
        arena.map_find(container, token).and_then(|pair| arena.pair_value(pair))
    } else {
        None
    }
}

fn walk(arena: &Arena, root: ValueId, tokens: &[Vec<u8>]) -> Option<ValueId> {
    let mut current = root;
    for token in tokens {
        current = step_read(arena, current, token)?;
    }
    Some(current)
}

/// Walk to `path`'s value, or `None` if any segment doesn't resolve.
pub fn get(arena: &Arena, root: ValueId, path: &str) -> Option<ValueId> {
    walk(arena, root, &tokenize(path))
}

/// Add `v` at `path` only if nothing is there yet. Returns the containing
/// parent on success. On failure `v` is left exactly as given — still
/// free, still owned by the caller, who may retry elsewhere or release it.
pub fn insert(arena: &mut Arena, root: ValueId, path: &str, v: ValueId) -> Option<ValueId> {
    let tokens = tokenize(path);
    let (last, init) = tokens.split_last()?;
    let parent = walk(arena, root, init)?;

    if arena.is_map(parent) {
        if arena.map_find(parent, last).is_some() {
            return None;
        }
        let key = arena.text(last.clone());
        let pair = arena.pair(key, v).ok()?;
        arena.insert_tail(parent, pair).ok()?;
        Some(parent)
    } else if arena.is_array(parent) {
        match array_target(arena.size(parent), last) {
            Some(ArrayTarget::Append) => {
                arena.insert_tail(parent, v).ok()?;
                Some(parent)
            }
            Some(ArrayTarget::Index(idx)) => {
                let pivot = arena.iter(parent).nth(idx)?;
                arena.insert_before(pivot, v).ok()?;
                Some(parent)
            }
            None => None,
        }
    } else {
        None
    }
}

/// Overwrite the value at `path` only if it already exists. Both the old
/// and new values are handled: old is released, new takes its place.
pub fn replace(arena: &mut Arena, root: ValueId, path: &str, v: ValueId) -> Option<ValueId> {
    let tokens = tokenize(path);
    let (last, init) = tokens.split_last()?;
    let parent = walk(arena, root, init)?;

    if arena.is_map(parent) {
        let pair = arena.map_find(parent, last)?;
        let old = arena.set_pair_value(pair, v).ok()?;
        arena.release(old);
        Some(parent)
    } else if arena.is_array(parent) {
        match array_target(arena.size(parent), last) {
            Some(ArrayTarget::Index(idx)) => {
                let old = arena.iter(parent).nth(idx)?;
                arena.replace_child(parent, old, v).ok()?;
                arena.release(old);
                Some(parent)
            }
            _ => None,
        }
    } else {
        None
    }
}

/// Upsert: replace if present, insert if missing. An existing map entry
/// keeps its original key position (§9's resolved open question).
pub fn set(arena: &mut Arena, root: ValueId, path: &str, v: ValueId) -> Option<ValueId> {
    if get(arena, root, path).is_some() {
        replace(arena, root, path, v)
    } else {
        insert(arena, root, path, v)
    }
}

/// Detach and return the subtree at `path`; the caller owns the returned,
/// now-free value and must release it or re-attach it elsewhere.
pub fn remove(arena: &mut Arena, root: ValueId, path: &str) -> Option<ValueId> {
    let tokens = tokenize(path);
    let (last, init) = tokens.split_last()?;
    let parent = walk(arena, root, init)?;

    if arena.is_map(parent) {
        let pair = arena.map_find(parent, last)?;
        arena.detach(pair).ok()?;
        // `pair` isn't a container, so `detach` can't pull the value out of
        // it directly; swap it out via `set_pair_value` (which does clear
        // the value's parent) before releasing the now-key-only pair.
        let placeholder = arena.null();
        let value = arena.set_pair_value(pair, placeholder).ok()?;
        arena.release(pair);
        Some(value)
    } else if arena.is_array(parent) {
        match array_target(arena.size(parent), last) {
            Some(ArrayTarget::Index(idx)) => {
                let elm = arena.iter(parent).nth(idx)?;
                arena.detach(elm).ok()
            }
            _ => None,
        }
    } else {
        None
    }
}

fn is_descendant(arena: &Arena, ancestor: ValueId, node: ValueId) -> bool {
    let mut current = node;
    while let Some(parent) = arena.parent(current) {
        if parent == ancestor {
            return true;
        }
        current = parent;
    }
    false
}

/// Detach the value at `from` and insert it at `to`. Fails if `from` is
/// missing, or if `to` names a location inside `from`'s own subtree.
pub fn move_value(arena: &mut Arena, root: ValueId, from: &str, to: &str) -> Option<ValueId> {
    let source = get(arena, root, from)?;
    let to_tokens = tokenize(to);
    let (_, init) = to_tokens.split_last()?;
    let dest_container = walk(arena, root, init)?;
    if dest_container == source || is_descendant(arena, source, dest_container) {
        return None;
    }
    let detached = remove(arena, root, from)?;
    let parent = set(arena, root, to, detached);
    if parent.is_none() {
        arena.release(detached);
    }
    parent
}

/// Deep-copy the value at `from` and insert the copy at `to`.
pub fn copy(arena: &mut Arena, root: ValueId, from: &str, to: &str) -> Option<ValueId> {
    let source = get(arena, root, from)?;
    let dup = arena.duplicate(source);
    if set(arena, root, to, dup).is_some() {
        Some(dup)
    } else {
        arena.release(dup);
        None
    }
}

/// Structural-equality comparison against the value at `path`.
pub fn test(arena: &Arena, root: ValueId, path: &str, v: ValueId) -> bool {
    match get(arena, root, path) {
        Some(existing) => arena.value_equal(existing, v),
        None => false,
    }
}

// -- Typed convenience wrappers (§4.4 [ADDED]) --------------------------

pub fn get_int(arena: &Arena, root: ValueId, path: &str) -> Option<i64> {
    let id = get(arena, root, path)?;
    matches!(arena.tl_type(id), crate::value::ValueKind::Uint | crate::value::ValueKind::NegInt)
        .then(|| arena.as_integer(id))
}

pub fn set_int(arena: &mut Arena, root: ValueId, path: &str, value: i64) -> Option<ValueId> {
    let v = arena.integer(value);
    set(arena, root, path, v)
}

pub fn get_bool(arena: &Arena, root: ValueId, path: &str) -> Option<bool> {
    let id = get(arena, root, path)?;
    match arena.as_simple(id) {
        Some(crate::arena::Simple::True) => Some(true),
        Some(crate::arena::Simple::False) => Some(false),
        _ => None,
    }
}

pub fn set_bool(arena: &mut Arena, root: ValueId, path: &str, value: bool) -> Option<ValueId> {
    let v = arena.boolean(value);
    set(arena, root, path, v)
}

pub fn get_str<'a>(arena: &'a Arena, root: ValueId, path: &str) -> Option<&'a [u8]> {
    let id = get(arena, root, path)?;
    arena.is_text(id).then(|| arena.as_text(id))
}

pub fn set_str(arena: &mut Arena, root: ValueId, path: &str, value: &str) -> Option<ValueId> {
    let v = arena.text(value.as_bytes());
    set(arena, root, path, v)
}

pub fn get_null(arena: &Arena, root: ValueId, path: &str) -> bool {
    get(arena, root, path).map(|id| arena.is_null(id)).unwrap_or(false)
}

pub fn set_null(arena: &mut Arena, root: ValueId, path: &str) -> Option<ValueId> {
    let v = arena.null();
    set(arena, root, path, v)
}

pub fn set_empty_array(arena: &mut Arena, root: ValueId, path: &str) -> Option<ValueId> {
    let v = arena.array();
    set(arena, root, path, v)
}

pub fn set_empty_map(arena: &mut Arena, root: ValueId, path: &str) -> Option<ValueId> {
    let v = arena.map();
    set(arena, root, path, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn sample() -> (Arena, ValueId) {
        let mut arena = Arena::new();
        let root = arena.map();
        let foo = arena.array();
        let bar = arena.text("bar".as_bytes());
        let baz = arena.text("baz".as_bytes());
        arena.insert_tail(foo, bar).unwrap();
        arena.insert_tail(foo, baz).unwrap();
        arena.map_insert(root, "foo", foo).unwrap();
        let zero = arena.uint(0);
        arena.map_insert(root, "", zero).unwrap();
        let one = arena.uint(1);
        arena.map_insert(root, "a/b", one).unwrap();
        let eight = arena.uint(8);
        arena.map_insert(root, "m~n", eight).unwrap();
        (arena, root)
    }

    #[test]
    fn get_array_element() {
        let (arena, root) = sample();
        let v = get(&arena, root, "/foo/0").unwrap();
        assert_eq!(arena.as_text(v), b"bar");
    }

    #[test]
    fn get_escaped_keys() {
        let (arena, root) = sample();
        assert_eq!(arena.as_integer(get(&arena, root, "/a~1b").unwrap()), 1);
        assert_eq!(arena.as_integer(get(&arena, root, "/m~0n").unwrap()), 8);
        assert_eq!(arena.as_integer(get(&arena, root, "/").unwrap()), 0);
    }

    #[test]
    fn set_appends_and_replaces() {
        let (mut arena, root) = sample();
        set_int(&mut arena, root, "/foo/-", 99);
        assert_eq!(arena.size(get(&arena, root, "/foo").unwrap()), 3);
        set_int(&mut arena, root, "/foo/0", 7);
        assert_eq!(get_int(&arena, root, "/foo/0"), Some(7));
    }

    #[test]
    fn remove_detaches_subtree() {
        let (mut arena, root) = sample();
        let removed = remove(&mut arena, root, "/foo/0").unwrap();
        assert!(arena.is_free(removed));
        assert_eq!(arena.size(get(&arena, root, "/foo").unwrap()), 1);
        arena.release(removed);
    }

    #[test]
    fn test_matches_structural_equality() {
        let (mut arena, root) = sample();
        let expect = arena.uint(0);
        assert!(test(&arena, root, "/", expect));
        arena.release(expect);
    }

    #[test]
    fn move_refuses_into_own_subtree() {
        let (mut arena, root) = sample();
        assert!(move_value(&mut arena, root, "/foo", "/foo/0/x").is_none());
    }
}
