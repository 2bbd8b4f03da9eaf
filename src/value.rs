//! The public `Value` surface (§4.1): factory operations and defensive
//! typed accessors layered over the [`Arena`].

use crate::arena::{Arena, NodeData, Simple};
pub use crate::arena::ValueId;
use crate::error::{Error, Result};

impl Arena {
    // -- Factories ---------------------------------------------------

    pub fn boolean(&mut self, b: bool) -> ValueId {
        self.alloc(NodeData::Simple(if b { Simple::True } else { Simple::False }))
    }

    pub fn null(&mut self) -> ValueId {
        self.alloc(NodeData::Simple(Simple::Null))
    }

    pub fn undef(&mut self) -> ValueId {
        self.alloc(NodeData::Simple(Simple::Undef))
    }

    /// Chooses `Uint` or `NegInt` by sign, matching the C reference's
    /// `cbor_integer` constructor.
    pub fn integer(&mut self, i: i64) -> ValueId {
        if i >= 0 {
            self.alloc(NodeData::Uint(i as u64))
        } else {
            // NegInt(m) represents -1 - m.
            self.alloc(NodeData::NegInt((-1 - i) as u64))
        }
    }

    pub fn uint(&mut self, u: u64) -> ValueId {
        self.alloc(NodeData::Uint(u))
    }

    /// `m` is the encoded magnitude; the represented integer is `-1 - m`.
    pub fn neg_int(&mut self, m: u64) -> ValueId {
        self.alloc(NodeData::NegInt(m))
    }

    pub fn real(&mut self, f: f64) -> ValueId {
        self.alloc(NodeData::Simple(Simple::Real(f)))
    }

    pub fn bytes(&mut self, src: impl Into<Vec<u8>>) -> ValueId {
        self.alloc(NodeData::Bytes(src.into()))
    }

    pub fn text(&mut self, src: impl Into<Vec<u8>>) -> ValueId {
        self.alloc(NodeData::Text(src.into()))
    }

    pub fn array(&mut self) -> ValueId {
        self.alloc(NodeData::Array(Vec::new()))
    }

    pub fn map(&mut self) -> ValueId {
        self.alloc(NodeData::Map(Vec::new()))
    }

    pub fn tag(&mut self, item: u64, content: ValueId) -> Result<ValueId> {
        if !self.is_free(content) {
            return Err(Error::PreconditionViolated("tag content must be a free value"));
        }
        let id = self.alloc(NodeData::Tag { item, content });
        self.node_mut(content).parent = Some(id);
        Ok(id)
    }

    pub fn simple_extension(&mut self, code: u8) -> ValueId {
        self.alloc(NodeData::Simple(Simple::Extension(code)))
    }

    /// Builds a free `Pair` (map entry) from two free values.
    pub fn pair(&mut self, key: ValueId, value: ValueId) -> Result<ValueId> {
        if !self.is_free(key) || !self.is_free(value) {
            return Err(Error::PreconditionViolated("pair key/value must be free values"));
        }
        let id = self.alloc(NodeData::Pair { key, value });
        self.node_mut(key).parent = Some(id);
        self.node_mut(value).parent = Some(id);
        Ok(id)
    }

    /// Convenience: build a free text/value pair and insert it at the tail
    /// of `map_id` in one step.
    pub fn map_insert(&mut self, map_id: ValueId, key: &str, value: ValueId) -> Result<()> {
        let k = self.text(key.as_bytes());
        let pair = self.pair(k, value)?;
        self.insert_tail(map_id, pair)
    }

    // -- Typed accessors (§4.1: zero-value on mismatch) ----------------

    pub fn tl_type(&self, id: ValueId) -> ValueKind {
        match &self.node(id).data {
            NodeData::Uint(_) => ValueKind::Uint,
            NodeData::NegInt(_) => ValueKind::NegInt,
            NodeData::Bytes(_) => ValueKind::Bytes,
            NodeData::Text(_) => ValueKind::Text,
            NodeData::Array(_) => ValueKind::Array,
            NodeData::Map(_) => ValueKind::Map,
            NodeData::Tag { .. } => ValueKind::Tag,
            NodeData::Simple(_) => ValueKind::Simple,
            NodeData::Pair { .. } => ValueKind::Pair,
        }
    }

    pub fn is_array(&self, id: ValueId) -> bool {
        matches!(self.node(id).data, NodeData::Array(_))
    }

    pub fn is_map(&self, id: ValueId) -> bool {
        matches!(self.node(id).data, NodeData::Map(_))
    }

    pub fn is_text(&self, id: ValueId) -> bool {
        matches!(self.node(id).data, NodeData::Text(_))
    }

    pub fn is_null(&self, id: ValueId) -> bool {
        matches!(self.node(id).data, NodeData::Simple(Simple::Null))
    }

    /// Integers from either integer variant; zero otherwise.
    pub fn as_integer(&self, id: ValueId) -> i64 {
        match self.node(id).data {
            NodeData::Uint(u) => u as i64,
            NodeData::NegInt(m) => (-1i64).wrapping_sub(m as i64),
            _ => 0,
        }
    }

    /// Accepts integer variants as well as `Simple::Real`; zero otherwise.
    pub fn as_real(&self, id: ValueId) -> f64 {
        match &self.node(id).data {
            NodeData::Uint(u) => *u as f64,
            NodeData::NegInt(m) => -1.0 - (*m as f64),
            NodeData::Simple(Simple::Real(f)) => *f,
            _ => 0.0,
        }
    }

    pub fn as_text(&self, id: ValueId) -> &[u8] {
        match &self.node(id).data {
            NodeData::Text(b) => b,
            _ => &[],
        }
    }

    pub fn as_text_str(&self, id: ValueId) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.as_text(id))
    }

    pub fn as_bytes(&self, id: ValueId) -> &[u8] {
        match &self.node(id).data {
            NodeData::Bytes(b) => b,
            _ => &[],
        }
    }

    pub fn as_boolean(&self, id: ValueId) -> bool {
        matches!(self.node(id).data, NodeData::Simple(Simple::True))
    }

    pub fn as_simple(&self, id: ValueId) -> Option<Simple> {
        match self.node(id).data {
            NodeData::Simple(s) => Some(s),
            _ => None,
        }
    }

    pub fn tag_item(&self, id: ValueId) -> Option<u64> {
        match self.node(id).data {
            NodeData::Tag { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn tag_content(&self, id: ValueId) -> Option<ValueId> {
        match self.node(id).data {
            NodeData::Tag { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn pair_key(&self, id: ValueId) -> Option<ValueId> {
        match self.node(id).data {
            NodeData::Pair { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn pair_value(&self, id: ValueId) -> Option<ValueId> {
        match self.node(id).data {
            NodeData::Pair { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Look up a `Map` entry by text key (string-equality against `Text`
    /// keys only, per §4.4's map-addressing rule).
    pub fn map_find(&self, map_id: ValueId, key: &[u8]) -> Option<ValueId> {
        if !self.is_map(map_id) {
            return None;
        }
        self.children(map_id).iter().copied().find(|&pair| {
            self.pair_key(pair)
                .map(|k| self.is_text(k) && self.as_text(k) == key)
                .unwrap_or(false)
        })
    }

    /// Forward iterator over a container's children, from `first()`.
    pub fn iter(&self, container: ValueId) -> Iter<'_> {
        Iter { arena: self, cursor: self.first(container) }
    }

    /// Reverse iterator over a container's children, from `last()`.
    pub fn iter_rev(&self, container: ValueId) -> RevIter<'_> {
        RevIter { arena: self, cursor: self.last(container) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Uint,
    NegInt,
    Bytes,
    Text,
    Array,
    Map,
    Tag,
    Simple,
    Pair,
}

/// Stable against deletion of the current node only if the caller advances
/// before deleting (§4.1): the iterator captures `next()`'s target before
/// handing back the current id, so the caller may safely detach `elm`
/// inside the loop body as long as it doesn't also mutate later siblings.
pub struct Iter<'a> {
    arena: &'a Arena,
    cursor: Option<ValueId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = ValueId;
    fn next(&mut self) -> Option<ValueId> {
        let current = self.cursor?;
        self.cursor = self.arena.next(current);
        Some(current)
    }
}

pub struct RevIter<'a> {
    arena: &'a Arena,
    cursor: Option<ValueId>,
}

impl<'a> Iterator for RevIter<'a> {
    type Item = ValueId;
    fn next(&mut self) -> Option<ValueId> {
        let current = self.cursor?;
        self.cursor = self.arena.prev(current);
        Some(current)
    }
}
