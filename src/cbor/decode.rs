//! CBOR decoder: major-type/addition-byte framing, indefinite-length
//! chunked strings and containers, tags, and the three binary float widths
//! widened to `f64` (§4.2).
//!
//! Ported from the addition-byte handling in the original C reference's
//! `cbor__loads`, with one deliberate deviation noted in §9: that
//! reference has a transcription bug where one code path reads 4 bytes
//! instead of 8 for a `double` (addition 27). This decoder always reads
//! the full 8 bytes.

use crate::arena::{Arena, ValueId};
use crate::error::{Error, Result};

const BREAK: u8 = 0xFF;

/// Bounds on recursion depth and per-container element counts, so that a
/// small adversarial input can't exhaust the stack or allocate unbounded
/// memory from a claimed element count (§4.2 [ADDED], §9).
#[derive(Debug, Clone, Copy)]
pub struct DecodeLimits {
    pub max_depth: usize,
    pub max_collection_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self { max_depth: 256, max_collection_len: 1 << 20 }
    }
}

pub(crate) struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    limits: &'a DecodeLimits,
    depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8], limits: &'a DecodeLimits) -> Self {
        Self { input, pos: 0, limits, depth: 0 }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    fn truncated(&self) -> Error {
        Error::Truncated { offset: self.pos }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or_else(|| self.truncated())?;
        if end > self.input.len() {
            return Err(self.truncated());
        }
        let slice = &self.input[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_initial_byte(&mut self) -> Result<(u8, u8)> {
        let b = self.read_u8()?;
        Ok((b >> 5, b & 0x1F))
    }

    /// Resolves an addition byte to its payload value, or `None` for the
    /// indefinite-length marker (addition 31). Additions 28-30 are
    /// unassigned and are always an error.
    fn read_length_value(&mut self, addition: u8) -> Result<Option<u64>> {
        match addition {
            0..=23 => Ok(Some(addition as u64)),
            24 => Ok(Some(self.read_u8()? as u64)),
            25 => {
                let b = self.take(2)?;
                Ok(Some(u16::from_be_bytes([b[0], b[1]]) as u64))
            }
            26 => {
                let b = self.take(4)?;
                Ok(Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64))
            }
            27 => {
                let b = self.take(8)?;
                Ok(Some(u64::from_be_bytes(b.try_into().unwrap())))
            }
            28..=30 => Err(Error::MalformedIndefinite { offset: self.pos }),
            31 => Ok(None),
            _ => unreachable!("addition is 5 bits"),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(Error::DepthExceeded { limit: self.limits.max_depth });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn check_len(&self, len: u64) -> Result<usize> {
        let len = usize::try_from(len).map_err(|_| self.truncated())?;
        if len > self.limits.max_collection_len {
            return Err(self.truncated());
        }
        Ok(len)
    }

    pub fn decode_item(&mut self, arena: &mut Arena) -> Result<ValueId> {
        self.enter()?;
        let result = self.decode_item_inner(arena);
        self.leave();
        result
    }

    fn decode_item_inner(&mut self, arena: &mut Arena) -> Result<ValueId> {
        let start = self.pos;
        let (major, addition) = self.read_initial_byte()?;
        match major {
            0 => {
                let v = self
                    .read_length_value(addition)?
                    .ok_or(Error::MalformedIndefinite { offset: start })?;
                Ok(arena.uint(v))
            }
            1 => {
                let v = self
                    .read_length_value(addition)?
                    .ok_or(Error::MalformedIndefinite { offset: start })?;
                Ok(arena.neg_int(v))
            }
            2 => self.decode_string(arena, addition, false),
            3 => self.decode_string(arena, addition, true),
            4 => self.decode_array(arena, addition),
            5 => self.decode_map(arena, addition),
            6 => {
                let item = self
                    .read_length_value(addition)?
                    .ok_or(Error::MalformedIndefinite { offset: start })?;
                let content = self.decode_item(arena)?;
                arena.tag(item, content)
            }
            7 => self.decode_simple(arena, addition),
            _ => unreachable!("major type is 3 bits"),
        }
    }

    fn decode_definite_chunk(&mut self, major: u8, addition: u8) -> Result<Vec<u8>> {
        let len = self
            .read_length_value(addition)?
            .ok_or(Error::MalformedIndefinite { offset: self.pos })?;
        let len = self.check_len(len)?;
        let _ = major;
        Ok(self.take(len)?.to_vec())
    }

    fn decode_string(&mut self, arena: &mut Arena, addition: u8, is_text: bool) -> Result<ValueId> {
        let major = if is_text { 3 } else { 2 };
        let bytes = if addition == 31 {
            let mut buf = Vec::new();
            loop {
                if self.peek_is_break()? {
                    self.read_u8()?;
                    break;
                }
                let chunk_start = self.pos;
                let (chunk_major, chunk_addition) = self.read_initial_byte()?;
                if chunk_major != major || chunk_addition == 31 {
                    return Err(Error::MalformedIndefinite { offset: chunk_start });
                }
                buf.extend(self.decode_definite_chunk(chunk_major, chunk_addition)?);
            }
            buf
        } else {
            self.decode_definite_chunk(major, addition)?
        };
        Ok(if is_text { arena.text(bytes) } else { arena.bytes(bytes) })
    }

    fn peek_is_break(&self) -> Result<bool> {
        Ok(self.input.get(self.pos).copied().ok_or_else(|| self.truncated())? == BREAK)
    }

    fn decode_array(&mut self, arena: &mut Arena, addition: u8) -> Result<ValueId> {
        let array = arena.array();
        if addition == 31 {
            loop {
                if self.peek_is_break()? {
                    self.read_u8()?;
                    break;
                }
                match self.decode_item(arena) {
                    Ok(item) => {
                        arena.insert_tail(array, item).expect("fresh array accepts any free value");
                    }
                    Err(e) => {
                        arena.release(array);
                        return Err(e);
                    }
                }
            }
        } else {
            let n = self
                .read_length_value(addition)?
                .ok_or(Error::MalformedIndefinite { offset: self.pos })?;
            let n = self.check_len(n)?;
            for _ in 0..n {
                match self.decode_item(arena) {
                    Ok(item) => {
                        arena.insert_tail(array, item).expect("fresh array accepts any free value");
                    }
                    Err(e) => {
                        arena.release(array);
                        return Err(e);
                    }
                }
            }
        }
        Ok(array)
    }

    fn decode_one_pair(&mut self, arena: &mut Arena) -> Result<ValueId> {
        let key = self.decode_item(arena)?;
        let value = match self.decode_item(arena) {
            Ok(v) => v,
            Err(e) => {
                arena.release(key);
                return Err(e);
            }
        };
        Ok(arena.pair(key, value).expect("key/value are fresh and free"))
    }

    fn decode_map(&mut self, arena: &mut Arena, addition: u8) -> Result<ValueId> {
        let map = arena.map();
        if addition == 31 {
            loop {
                if self.peek_is_break()? {
                    self.read_u8()?;
                    break;
                }
                match self.decode_one_pair(arena) {
                    Ok(pair) => {
                        arena.insert_tail(map, pair).expect("fresh map accepts any free pair");
                    }
                    Err(e) => {
                        arena.release(map);
                        return Err(e);
                    }
                }
            }
        } else {
            let n = self
                .read_length_value(addition)?
                .ok_or(Error::MalformedIndefinite { offset: self.pos })?;
            let n = self.check_len(n)?;
            for _ in 0..n {
                match self.decode_one_pair(arena) {
                    Ok(pair) => {
                        arena.insert_tail(map, pair).expect("fresh map accepts any free pair");
                    }
                    Err(e) => {
                        arena.release(map);
                        return Err(e);
                    }
                }
            }
        }
        Ok(map)
    }

    fn decode_simple(&mut self, arena: &mut Arena, addition: u8) -> Result<ValueId> {
        match addition {
            0..=19 => Ok(arena.simple_extension(addition)),
            20 => Ok(arena.boolean(false)),
            21 => Ok(arena.boolean(true)),
            22 => Ok(arena.null()),
            23 => Ok(arena.undef()),
            24 => {
                let code = self.read_u8()?;
                Ok(arena.simple_extension(code))
            }
            25 => {
                let b = self.take(2)?;
                let bits = u16::from_be_bytes([b[0], b[1]]);
                Ok(arena.real(half_to_f64(bits)))
            }
            26 => {
                let b = self.take(4)?;
                let bits = u32::from_be_bytes(b.try_into().unwrap());
                Ok(arena.real(single_to_f64(bits)))
            }
            27 => {
                let b = self.take(8)?;
                let bits = u64::from_be_bytes(b.try_into().unwrap());
                Ok(arena.real(f64::from_bits(bits)))
            }
            28..=30 => Err(Error::UnsupportedSimple(addition)),
            31 => Err(Error::MalformedIndefinite { offset: self.pos }),
            _ => unreachable!("addition is 5 bits"),
        }
    }
}

/// Widen a CBOR half-float (1/5/10) to `f64`, per IEEE-754 half layout.
fn half_to_f64(bits: u16) -> f64 {
    let sign = ((bits & 0x8000) as u64) << 48;
    let exp = (bits >> 10) & 0x1F;
    let frac = (bits & 0x3FF) as u64;
    let mut out = sign | (frac << (52 - 10));
    if exp == 0 {
        // subnormal/zero: leave exponent field zero.
    } else if exp == 31 {
        out |= 0x7FFu64 << 52;
    } else {
        out |= (exp as u64 - 15 + 1023) << 52;
    }
    f64::from_bits(out)
}

/// Widen a CBOR single-float (1/8/23) to `f64`.
fn single_to_f64(bits: u32) -> f64 {
    let sign = ((bits & 0x8000_0000) as u64) << 32;
    let exp = (bits >> 23) & 0xFF;
    let frac = (bits & 0x7F_FFFF) as u64;
    let mut out = sign | (frac << (52 - 23));
    if exp == 0 {
    } else if exp == 255 {
        out |= 0x7FFu64 << 52;
    } else {
        out |= (exp as u64 - 127 + 1023) << 52;
    }
    f64::from_bits(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_float_one_point_five() {
        // 0x3e00 = 1.5 in half precision.
        assert_eq!(half_to_f64(0x3e00), 1.5);
    }

    #[test]
    fn half_float_zero_and_infinity() {
        assert_eq!(half_to_f64(0x0000), 0.0);
        assert!(half_to_f64(0x7c00).is_infinite());
        assert!(half_to_f64(0x7e00).is_nan());
    }

    #[test]
    fn single_float_matches_native_widening() {
        let v: f32 = 1.1;
        let widened = single_to_f64(v.to_bits());
        assert_eq!(widened, v as f64);
    }
}
