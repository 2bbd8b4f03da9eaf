//! bramble - a CBOR-faithful value tree with CBOR/JSON codecs and a
//! JSON Pointer / Merge Patch mutation layer.
//!
//! # Example
//!
//! ```rust
//! use bramble::{Arena, cbor, json, pointer};
//!
//! let mut arena = Arena::new();
//! let root = arena.map();
//! let name = arena.text("ferris".as_bytes());
//! arena.map_insert(root, "name", name).unwrap();
//!
//! let bytes = cbor::dump(&arena, root);
//! let (decoded, id, _) = cbor::load(&bytes).unwrap();
//! assert_eq!(pointer::get_str(&decoded, id, "/name"), Some(b"ferris".as_slice()));
//! ```

pub mod arena;
pub mod cbor;
pub mod error;
pub mod json;
pub mod patch;
pub mod pointer;
pub mod strutil;
pub mod value;

pub use arena::{Arena, NodeData, Simple, ValueId};
pub use error::{Error, Result};
pub use patch::merge_patch;
pub use value::ValueKind;
