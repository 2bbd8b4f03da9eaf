//! JSON Merge Patch (RFC 7396, §4.4): folds a patch document into a
//! target, treating `Null` leaves as deletions.

use crate::arena::{Arena, NodeData, Simple, ValueId};

/// Applies `patch` onto `target` in place, so callers keep their root
/// identity (§4.4: "replaces the value contents rather than the identity
/// of the root node"). `patch` is consumed: its tree is duplicated into
/// `target` piecewise and the original is released once fully folded in.
pub fn merge_patch(arena: &mut Arena, target: ValueId, patch: ValueId) {
    merge_patch_value(arena, target, patch);
    arena.release(patch);
}

fn merge_patch_value(arena: &mut Arena, target: ValueId, patch: ValueId) {
    if arena.is_map(patch) {
        if !arena.is_map(target) {
            clear_to_empty_map(arena, target);
        }
        let entries: Vec<ValueId> = arena.iter(patch).collect();
        for pair in entries {
            let Some(key) = arena.pair_key(pair) else { continue };
            let Some(value) = arena.pair_value(pair) else { continue };
            let key_bytes = arena.as_text(key).to_vec();

            if matches!(arena.as_simple(value), Some(Simple::Null)) {
                if let Some(existing_pair) = arena.map_find(target, &key_bytes) {
                    arena.detach(existing_pair).expect("existing_pair is a child of target");
                    arena.release(existing_pair);
                }
                continue;
            }

            match arena.map_find(target, &key_bytes) {
                Some(existing_pair) => {
                    let existing_value = arena.pair_value(existing_pair).expect("map children are Pair");
                    merge_patch_value(arena, existing_value, value);
                }
                None => {
                    let new_value = arena.null();
                    merge_patch_value(arena, new_value, value);
                    let new_key = arena.text(key_bytes);
                    let new_pair = arena.pair(new_key, new_value).expect("key/value are fresh and free");
                    arena.insert_tail(target, new_pair).expect("target is a map");
                }
            }
        }
    } else {
        overwrite_with_copy_of(arena, target, patch);
    }
}

/// Replace `target`'s content in place with a deep copy of `source`,
/// preserving `target`'s identity and its position in its own parent.
/// `target`'s previous children are released first so overwriting a
/// container doesn't orphan its old contents in the arena.
fn overwrite_with_copy_of(arena: &mut Arena, target: ValueId, source: ValueId) {
    let copy = arena.duplicate(source);
    let old = std::mem::replace(&mut arena.node_mut(target).data, NodeData::Simple(Simple::Null));
    release_children_of(arena, &old);
    let data = std::mem::replace(&mut arena.node_mut(copy).data, NodeData::Simple(Simple::Null));
    reparent_children(arena, target, &data);
    arena.node_mut(target).data = data;
    arena.release(copy);
}

fn clear_to_empty_map(arena: &mut Arena, target: ValueId) {
    let empty = NodeData::Map(Vec::new());
    let old = std::mem::replace(&mut arena.node_mut(target).data, empty);
    release_children_of(arena, &old);
}

fn reparent_children(arena: &mut Arena, new_parent: ValueId, data: &NodeData) {
    match data {
        NodeData::Array(children) | NodeData::Map(children) => {
            for &child in children {
                arena.node_mut(child).parent = Some(new_parent);
            }
        }
        NodeData::Tag { content, .. } => arena.node_mut(*content).parent = Some(new_parent),
        NodeData::Pair { key, value } => {
            arena.node_mut(*key).parent = Some(new_parent);
            arena.node_mut(*value).parent = Some(new_parent);
        }
        _ => {}
    }
}

fn release_children_of(arena: &mut Arena, data: &NodeData) {
    match data {
        NodeData::Array(children) | NodeData::Map(children) => {
            for &child in children {
                arena.release(child);
            }
        }
        NodeData::Tag { content, .. } => arena.release(*content),
        NodeData::Pair { key, value } => {
            arena.release(*key);
            arena.release(*value);
        }
        _ => {}
    }
}

/// Value-returning variant: builds a fresh, free result instead of
/// mutating `target`. `patch` is still consumed.
pub fn merge_patch_value_new(arena: &mut Arena, target: ValueId, patch: ValueId) -> ValueId {
    let scratch = arena.duplicate(target);
    merge_patch(arena, scratch, patch);
    scratch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json;
    use crate::json::JsonFlags;
    use crate::cbor::DecodeLimits;
    use crate::pointer;

    fn load_root(src: &str) -> (Arena, ValueId) {
        let (arena, id, _) = json::load(src).unwrap();
        (arena, id)
    }

    fn load_patch(arena: &mut Arena, src: &str) -> ValueId {
        let (id, _) = json::load_into(arena, src, JsonFlags::empty(), &DecodeLimits::default()).unwrap();
        id
    }

    #[test]
    fn replaces_scalar_keys_and_removes_null() {
        let (mut arena, target) = load_root(r#"{"a":"b","c":{"d":"e","f":"g"}}"#);
        let patch = load_patch(&mut arena, r#"{"a":"z","c":{"f":null}}"#);
        merge_patch(&mut arena, target, patch);
        assert_eq!(pointer::get_str(&arena, target, "/a"), Some(b"z".as_slice()));
        assert_eq!(pointer::get(&arena, target, "/c/f"), None);
        assert_eq!(pointer::get_str(&arena, target, "/c/d"), Some(b"e".as_slice()));
    }

    #[test]
    fn non_map_patch_replaces_wholesale() {
        let (mut arena, target) = load_root(r#"{"a":"b"}"#);
        let patch = load_patch(&mut arena, r#""replacement""#);
        merge_patch(&mut arena, target, patch);
        assert!(arena.is_text(target));
        assert_eq!(arena.as_text(target), b"replacement");
    }

    #[test]
    fn idempotent_on_null_free_patch() {
        let (mut arena, target) = load_root(r#"{"a":1,"b":2}"#);
        let patch1 = load_patch(&mut arena, r#"{"a":9}"#);
        merge_patch(&mut arena, target, patch1);
        let patch2 = load_patch(&mut arena, r#"{"a":9}"#);
        merge_patch(&mut arena, target, patch2);
        assert_eq!(pointer::get_int(&arena, target, "/a"), Some(9));
        assert_eq!(pointer::get_int(&arena, target, "/b"), Some(2));
    }
}
