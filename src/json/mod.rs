//! JSON (RFC 7159) text codec (§4.3), with tolerant-lexer extensions gated
//! behind [`JsonFlags`] and a serializer that emits strict, extension-free
//! output.

mod diagnostic;
mod lexer;
mod parser;
mod serializer;

use std::fs;
use std::path::Path;

use crate::arena::{Arena, ValueId};
use crate::cbor::DecodeLimits;
use crate::error::Result;

pub use diagnostic::{diagnostic, CaretDiagnostic, JsonDiagnostic};
pub use lexer::JsonFlags;

/// Parse exactly one JSON value from `text` under default flags (strict
/// RFC 7159) and default [`DecodeLimits`].
///
/// Returns the owning arena, the parsed root, and the number of bytes
/// consumed — trailing bytes after the value are left unexamined, mirroring
/// the CBOR codec's `load` contract.
pub fn load(text: &str) -> Result<(Arena, ValueId, usize)> {
    load_with(text, JsonFlags::empty(), &DecodeLimits::default())
}

pub fn load_with(text: &str, flags: JsonFlags, limits: &DecodeLimits) -> Result<(Arena, ValueId, usize)> {
    let mut arena = Arena::new();
    let (id, consumed) = load_into(&mut arena, text, flags, limits)?;
    Ok((arena, id, consumed))
}

/// Parse into a caller-owned arena, e.g. to merge-patch a JSON payload
/// into a tree that already holds other values (perhaps CBOR-decoded).
pub fn load_into(arena: &mut Arena, text: &str, flags: JsonFlags, limits: &DecodeLimits) -> Result<(ValueId, usize)> {
    let mut parser = parser::Parser::new(text, flags, limits);
    let id = parser.parse_value(arena)?;
    Ok((id, parser.offset()))
}

/// Compact (no whitespace) serialization.
pub fn dump(arena: &Arena, value: ValueId) -> String {
    serializer::serialize(arena, value, false)
}

/// 4-space-indented, newline-separated serialization.
pub fn dump_pretty(arena: &Arena, value: ValueId) -> String {
    serializer::serialize(arena, value, true)
}

pub fn loadf(path: impl AsRef<Path>) -> Result<(Arena, ValueId)> {
    let text = fs::read_to_string(path)?;
    let (arena, id, _) = load(&text)?;
    Ok((arena, id))
}

pub fn dumpf(path: impl AsRef<Path>, arena: &Arena, value: ValueId, pretty: bool) -> Result<()> {
    let text = if pretty { dump_pretty(arena, value) } else { dump(arena, value) };
    fs::write(path, text)?;
    Ok(())
}
