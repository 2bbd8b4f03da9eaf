#![no_main]
use libfuzzer_sys::fuzz_target;
use bramble::cbor::{self, DecodeLimits};

/// Recursively walk a decoded value to force full decoding of nested
/// arrays, maps, and tags.
fn walk(arena: &bramble::Arena, id: bramble::ValueId) {
    use bramble::ValueKind::*;
    match arena.tl_type(id) {
        Array | Map => {
            for child in arena.iter(id) {
                walk(arena, child);
            }
        }
        Tag => {
            if let Some(content) = arena.tag_content(id) {
                walk(arena, content);
            }
        }
        _ => {}
    }
}

fuzz_target!(|data: &[u8]| {
    // Fuzz the CBOR decoder directly — malformed input must produce an
    // `Err`, never a panic, and `consumed` must never exceed the input.
    let limits = DecodeLimits::default();
    if let Ok((arena, id, consumed)) = cbor::load_with(data, &limits) {
        assert!(consumed <= data.len());
        walk(&arena, id);
    }
});
