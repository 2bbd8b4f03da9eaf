#![no_main]
use libfuzzer_sys::fuzz_target;
use bramble::json::{self, JsonFlags};
use bramble::cbor::DecodeLimits;

/// Recursively walk a decoded value to force full traversal of nested
/// containers (catches decoders that build a lazy/partial tree).
fn walk(arena: &bramble::Arena, id: bramble::ValueId) {
    use bramble::ValueKind::*;
    match arena.tl_type(id) {
        Array | Map => {
            for child in arena.iter(id) {
                walk(arena, child);
            }
        }
        _ => {}
    }
}

fuzz_target!(|data: &str| {
    let limits = DecodeLimits::default();

    // Strict mode: must never panic, success or failure is both fine.
    if let Ok((arena, id, _)) = json::load_with(data, JsonFlags::empty(), &limits) {
        walk(&arena, id);
    }

    // Tolerant mode (comments + inf/nan literals): same requirement.
    let tolerant = JsonFlags::ALLOW_COMMENT | JsonFlags::ALLOW_INF | JsonFlags::ALLOW_NAN;
    if let Ok((arena, id, consumed)) = json::load_with(data, tolerant, &limits) {
        assert!(consumed <= data.len(), "parser reported consuming more bytes than it was given");
        walk(&arena, id);
    }
});
