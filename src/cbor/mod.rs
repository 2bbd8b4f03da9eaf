//! CBOR (RFC 7049) binary codec (§4.2).
//!
//! `load`/`load_with` decode exactly one top-level item and report how
//! many bytes were consumed; `dump` encodes a value with the narrowest
//! framing that represents it exactly.

mod decode;
mod encode;

use std::fs;
use std::path::Path;

use crate::arena::{Arena, ValueId};
use crate::error::Result;

pub use decode::DecodeLimits;

/// Decode exactly one top-level CBOR item from `bytes`.
///
/// Returns the owning [`Arena`], the decoded root, and the number of bytes
/// consumed. On failure, no partial subtree survives in the returned arena
/// (there is none: the arena is discarded along with the `Err`).
pub fn load(bytes: &[u8]) -> Result<(Arena, ValueId, usize)> {
    load_with(bytes, &DecodeLimits::default())
}

pub fn load_with(bytes: &[u8], limits: &DecodeLimits) -> Result<(Arena, ValueId, usize)> {
    let mut arena = Arena::new();
    let (id, consumed) = load_into(&mut arena, bytes, limits)?;
    Ok((arena, id, consumed))
}

/// Decode into a caller-owned arena, e.g. to merge-patch a CBOR payload
/// into a tree that already holds other values.
pub fn load_into(arena: &mut Arena, bytes: &[u8], limits: &DecodeLimits) -> Result<(ValueId, usize)> {
    let mut dec = decode::Decoder::new(bytes, limits);
    let id = dec.decode_item(arena)?;
    Ok((id, dec.offset()))
}

/// Encode `value` (in `arena`) to its canonical-minimal CBOR byte sequence.
pub fn dump(arena: &Arena, value: ValueId) -> Vec<u8> {
    let mut out = Vec::new();
    encode::encode_item(arena, value, &mut out);
    out
}

/// Out-of-core-engineering convenience wrapper (§1): read a file and decode
/// one top-level item from its full contents.
pub fn loadf(path: impl AsRef<Path>) -> Result<(Arena, ValueId)> {
    let bytes = fs::read(path)?;
    let (arena, id, _) = load(&bytes)?;
    Ok((arena, id))
}

pub fn dumpf(path: impl AsRef<Path>, arena: &Arena, value: ValueId) -> Result<()> {
    let bytes = dump(arena, value);
    fs::write(path, bytes)?;
    Ok(())
}
