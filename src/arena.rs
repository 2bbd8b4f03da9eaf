//! The generational-handle arena backing every [`Value`](crate::value::Value)
//! tree.
//!
//! A tree is not a single Rust ownership chain: a node needs an O(1) path
//! back to its parent (§3), which the borrow checker won't let us do with
//! plain `Box`/`Rc` links without real pain. Per DESIGN NOTES §9 this is
//! instead modeled as an arena of records addressed by generational
//! handles: each child stores its parent's handle, each container stores
//! the handles of its children.

use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};

new_key_type! {
    /// A generational handle into an [`Arena`]. The Rust stand-in for a
    /// `cbor_value_t *` in the reference implementation.
    pub struct ValueId;
}

/// One of the eight public `Value` variants, plus the internal `Pair`
/// variant used for map entries (§3).
#[derive(Debug, Clone)]
pub enum NodeData {
    Uint(u64),
    NegInt(u64),
    Bytes(Vec<u8>),
    Text(Vec<u8>),
    Array(Vec<ValueId>),
    /// Children are always `Pair` nodes.
    Map(Vec<ValueId>),
    Tag { item: u64, content: ValueId },
    Simple(Simple),
    /// Internal: a map entry. Hidden behind the `Value`/pointer APIs.
    Pair { key: ValueId, value: ValueId },
}

/// Major type 7 payload (§3's `Simple` variant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Simple {
    None,
    False,
    True,
    Null,
    Undef,
    Extension(u8),
    Real(f64),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub parent: Option<ValueId>,
    pub data: NodeData,
}

/// Owns every [`Node`] reachable from any tree built through it.
///
/// A node whose `parent` is `None` is "free" in §3's sense: either a root
/// the caller is holding, or a subtree just detached and awaiting either
/// re-insertion or [`Arena::release`]. Nothing is dropped implicitly when a
/// subtree is detached: the caller must release it explicitly, exactly as
/// §5 requires.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: SlotMap<ValueId, Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self { nodes: SlotMap::with_key() }
    }

    pub(crate) fn alloc(&mut self, data: NodeData) -> ValueId {
        self.nodes.insert(Node { parent: None, data })
    }

    pub(crate) fn node(&self, id: ValueId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: ValueId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub(crate) fn try_node(&self, id: ValueId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: ValueId) -> Option<ValueId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn is_free(&self, id: ValueId) -> bool {
        self.parent(id).is_none()
    }

    pub fn contains(&self, id: ValueId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Children of a container node, in iteration order. Empty for leaves.
    pub(crate) fn children(&self, id: ValueId) -> &[ValueId] {
        match &self.nodes[id].data {
            NodeData::Array(v) | NodeData::Map(v) => v,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self, id: ValueId) -> Option<&mut Vec<ValueId>> {
        match &mut self.nodes[id].data {
            NodeData::Array(v) | NodeData::Map(v) => Some(v),
            _ => None,
        }
    }

    fn require_free(&self, id: ValueId) -> Result<()> {
        if !self.is_free(id) {
            return Err(Error::PreconditionViolated(
                "cannot insert a value that already has a parent",
            ));
        }
        Ok(())
    }

    fn require_container(&self, id: ValueId) -> Result<()> {
        match self.try_node(id).map(|n| &n.data) {
            Some(NodeData::Array(_)) | Some(NodeData::Map(_)) => Ok(()),
            _ => Err(Error::PreconditionViolated("target is not a container")),
        }
    }

    /// For `Map` containers the inserted value must itself be a `Pair`.
    fn require_insertable(&self, container: ValueId, value: ValueId) -> Result<()> {
        self.require_free(value)?;
        match &self.node(container).data {
            NodeData::Array(_) => Ok(()),
            NodeData::Map(_) => match self.node(value).data {
                NodeData::Pair { .. } => Ok(()),
                _ => Err(Error::PreconditionViolated("map children must be Pair values")),
            },
            _ => Err(Error::PreconditionViolated("target is not a container")),
        }
    }

    pub fn size(&self, container: ValueId) -> usize {
        self.children(container).len()
    }

    pub fn empty(&self, container: ValueId) -> bool {
        self.size(container) == 0
    }

    pub fn first(&self, container: ValueId) -> Option<ValueId> {
        self.children(container).first().copied()
    }

    pub fn last(&self, container: ValueId) -> Option<ValueId> {
        self.children(container).last().copied()
    }

    /// The element following `elm` within its parent container, or `None`
    /// if `elm` is the last child (or has no parent).
    pub fn next(&self, elm: ValueId) -> Option<ValueId> {
        let parent = self.parent(elm)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|&s| s == elm)?;
        siblings.get(idx + 1).copied()
    }

    pub fn prev(&self, elm: ValueId) -> Option<ValueId> {
        let parent = self.parent(elm)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|&s| s == elm)?;
        idx.checked_sub(1).and_then(|i| siblings.get(i)).copied()
    }

    pub fn insert_head(&mut self, container: ValueId, value: ValueId) -> Result<()> {
        self.require_insertable(container, value)?;
        self.children_mut(container).unwrap().insert(0, value);
        self.node_mut(value).parent = Some(container);
        Ok(())
    }

    pub fn insert_tail(&mut self, container: ValueId, value: ValueId) -> Result<()> {
        self.require_insertable(container, value)?;
        self.children_mut(container).unwrap().push(value);
        self.node_mut(value).parent = Some(container);
        Ok(())
    }

    pub fn insert_before(&mut self, pivot: ValueId, value: ValueId) -> Result<()> {
        let container = self
            .parent(pivot)
            .ok_or(Error::PreconditionViolated("pivot has no parent"))?;
        self.require_insertable(container, value)?;
        let children = self.children_mut(container).unwrap();
        let idx = children
            .iter()
            .position(|&s| s == pivot)
            .ok_or(Error::PreconditionViolated("pivot is not a child of its own parent"))?;
        children.insert(idx, value);
        self.node_mut(value).parent = Some(container);
        Ok(())
    }

    pub fn insert_after(&mut self, pivot: ValueId, value: ValueId) -> Result<()> {
        let container = self
            .parent(pivot)
            .ok_or(Error::PreconditionViolated("pivot has no parent"))?;
        self.require_insertable(container, value)?;
        let children = self.children_mut(container).unwrap();
        let idx = children
            .iter()
            .position(|&s| s == pivot)
            .ok_or(Error::PreconditionViolated("pivot is not a child of its own parent"))?;
        children.insert(idx + 1, value);
        self.node_mut(value).parent = Some(container);
        Ok(())
    }

    /// Detach `elm` from its parent container without releasing it: clears
    /// its parent back-reference and unlinks it from the child list. The
    /// returned value is free and must eventually be re-inserted or
    /// [`Arena::release`]d.
    pub fn detach(&mut self, elm: ValueId) -> Result<ValueId> {
        let container = self
            .parent(elm)
            .ok_or(Error::PreconditionViolated("value has no parent to detach from"))?;
        let children = self
            .children_mut(container)
            .ok_or(Error::PreconditionViolated("parent is not a container"))?;
        let idx = children
            .iter()
            .position(|&s| s == elm)
            .ok_or(Error::PreconditionViolated("value is not a child of its recorded parent"))?;
        children.remove(idx);
        self.node_mut(elm).parent = None;
        Ok(elm)
    }

    /// Detach and release `elm`'s entire subtree.
    pub fn remove(&mut self, elm: ValueId) -> Result<ValueId> {
        self.detach(elm)
    }

    /// Detach and release every child of `container`, leaving it empty.
    pub fn clear(&mut self, container: ValueId) -> Result<()> {
        self.require_container(container)?;
        let children: Vec<ValueId> = self.children(container).to_vec();
        for child in children {
            self.detach(child)?;
            self.release(child);
        }
        Ok(())
    }

    /// Swap the contents of two containers, re-parenting all children of
    /// both so the parent-back-reference invariant holds for the new
    /// arrangement (§3).
    pub fn swap(&mut self, a: ValueId, b: ValueId) -> Result<()> {
        self.require_container(a)?;
        self.require_container(b)?;
        let a_children = std::mem::take(self.children_mut(a).unwrap());
        let b_children = std::mem::take(self.children_mut(b).unwrap());
        for &child in &a_children {
            self.node_mut(child).parent = Some(b);
        }
        for &child in &b_children {
            self.node_mut(child).parent = Some(a);
        }
        *self.children_mut(a).unwrap() = b_children;
        *self.children_mut(b).unwrap() = a_children;
        Ok(())
    }

    /// Move all children of `src` to the tail of `dst`, re-parenting them,
    /// leaving `src` empty.
    pub fn concat(&mut self, dst: ValueId, src: ValueId) -> Result<()> {
        self.require_container(dst)?;
        self.require_container(src)?;
        if dst == src {
            return Err(Error::PreconditionViolated("cannot concat a container with itself"));
        }
        let moved: Vec<ValueId> = std::mem::take(self.children_mut(src).unwrap());
        for &child in &moved {
            self.node_mut(child).parent = Some(dst);
        }
        self.children_mut(dst).unwrap().extend(moved);
        Ok(())
    }

    /// Replace `old` with `new` in `container`'s child list at the same
    /// position, re-parenting `new` and clearing `old`'s parent. `old` is
    /// detached but not released; the caller decides its fate (the pointer
    /// engine's `replace`/`set` release it, `move_value` does not apply
    /// here since it never replaces).
    pub(crate) fn replace_child(&mut self, container: ValueId, old: ValueId, new: ValueId) -> Result<()> {
        self.require_free(new)?;
        let children = self
            .children_mut(container)
            .ok_or(Error::PreconditionViolated("target is not a container"))?;
        let idx = children
            .iter()
            .position(|&c| c == old)
            .ok_or(Error::PreconditionViolated("old value is not a child of container"))?;
        children[idx] = new;
        self.node_mut(old).parent = None;
        self.node_mut(new).parent = Some(container);
        Ok(())
    }

    /// Replace a `Pair`'s value in place, keeping its key and its position
    /// within the owning map untouched. Used by the pointer engine's
    /// `replace`/`set` so upsert keeps the original key ordering (§9).
    pub(crate) fn set_pair_value(&mut self, pair: ValueId, new_value: ValueId) -> Result<ValueId> {
        self.require_free(new_value)?;
        let (key, old_value) = match self.node(pair).data {
            NodeData::Pair { key, value } => (key, value),
            _ => return Err(Error::PreconditionViolated("target is not a Pair")),
        };
        self.node_mut(old_value).parent = None;
        self.node_mut(new_value).parent = Some(pair);
        self.node_mut(pair).data = NodeData::Pair { key, value: new_value };
        Ok(old_value)
    }

    /// Recursively release a subtree: frees every descendant's storage.
    /// Does not attempt to detach `id` from a parent first — callers that
    /// want both should `detach` then `release`, as `remove`'s callers do.
    pub fn release(&mut self, id: ValueId) {
        let children: Vec<ValueId> = match self.try_node(id).map(|n| n.data.clone()) {
            Some(NodeData::Array(c)) | Some(NodeData::Map(c)) => c,
            Some(NodeData::Tag { content, .. }) => vec![content],
            Some(NodeData::Pair { key, value }) => vec![key, value],
            _ => Vec::new(),
        };
        for child in children {
            self.release(child);
        }
        self.nodes.remove(id);
    }

    /// Deep-copy a subtree, producing a fully detached (free) new subtree.
    pub fn duplicate(&mut self, id: ValueId) -> ValueId {
        let data = self.node(id).data.clone();
        let new_data = match data {
            NodeData::Uint(v) => NodeData::Uint(v),
            NodeData::NegInt(v) => NodeData::NegInt(v),
            NodeData::Bytes(v) => NodeData::Bytes(v),
            NodeData::Text(v) => NodeData::Text(v),
            NodeData::Simple(s) => NodeData::Simple(s),
            NodeData::Array(children) => {
                NodeData::Array(children.iter().map(|&c| self.duplicate(c)).collect())
            }
            NodeData::Map(children) => {
                NodeData::Map(children.iter().map(|&c| self.duplicate(c)).collect())
            }
            NodeData::Tag { item, content } => {
                NodeData::Tag { item, content: self.duplicate(content) }
            }
            NodeData::Pair { key, value } => {
                NodeData::Pair { key: self.duplicate(key), value: self.duplicate(value) }
            }
        };
        let new_id = self.alloc(new_data);
        // Re-parent the freshly duplicated children to point at new_id.
        let children = match &self.node(new_id).data {
            NodeData::Array(c) | NodeData::Map(c) => c.clone(),
            _ => Vec::new(),
        };
        for child in children {
            self.node_mut(child).parent = Some(new_id);
        }
        if let NodeData::Tag { content, .. } = self.node(new_id).data {
            self.node_mut(content).parent = Some(new_id);
        }
        if let NodeData::Pair { key, value } = self.node(new_id).data {
            self.node_mut(key).parent = Some(new_id);
            self.node_mut(value).parent = Some(new_id);
        }
        new_id
    }

    /// Structural equality (§4.1's `value_equal`).
    pub fn value_equal(&self, a: ValueId, b: ValueId) -> bool {
        use NodeData::*;
        match (&self.node(a).data, &self.node(b).data) {
            (Uint(x), Uint(y)) => x == y,
            (NegInt(x), NegInt(y)) => x == y,
            (Bytes(x), Bytes(y)) => x == y,
            (Text(x), Text(y)) => x == y,
            (Array(xs), Array(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(&x, &y)| self.value_equal(x, y))
            }
            (Map(xs), Map(ys)) => {
                if xs.len() != ys.len() {
                    return false;
                }
                let mut used = vec![false; ys.len()];
                'outer: for &x in xs {
                    for (j, &y) in ys.iter().enumerate() {
                        if !used[j] && self.pair_equal(x, y) {
                            used[j] = true;
                            continue 'outer;
                        }
                    }
                    return false;
                }
                true
            }
            (Tag { item: ia, content: ca }, Tag { item: ib, content: cb }) => {
                ia == ib && self.value_equal(*ca, *cb)
            }
            (Simple(sa), Simple(sb)) => match (sa, sb) {
                (Simple::Real(x), Simple::Real(y)) => x.to_bits() == y.to_bits(),
                _ => sa == sb,
            },
            (Pair { key: ka, value: va }, Pair { key: kb, value: vb }) => {
                self.value_equal(*ka, *kb) && self.value_equal(*va, *vb)
            }
            _ => false,
        }
    }

    fn pair_equal(&self, a: ValueId, b: ValueId) -> bool {
        matches!((&self.node(a).data, &self.node(b).data), (NodeData::Pair { .. }, NodeData::Pair { .. }))
            && self.value_equal(a, b)
    }
}
