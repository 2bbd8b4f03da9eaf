#![no_main]
use libfuzzer_sys::fuzz_target;
use bramble::{json, pointer};

fuzz_target!(|data: &[u8]| {
    // Need at least some bytes for both document and pointer.
    if data.len() < 4 {
        return;
    }

    // Use the first byte as a split-point ratio between document and pointer.
    let split = (data[0] as usize * data.len()) / 256;
    let split = split.clamp(1, data.len() - 1);

    let doc_bytes = &data[1..split.max(1)];
    let path_bytes = &data[split..];

    let doc_str = match std::str::from_utf8(doc_bytes) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (arena, root, _) = match json::load(doc_str) {
        Ok(v) => v,
        Err(_) => return,
    };

    let path = match std::str::from_utf8(path_bytes) {
        Ok(s) => s,
        Err(_) => return,
    };

    // Every read-only pointer operation must resolve or return None, never panic.
    let _ = pointer::get(&arena, root, path);
    let _ = pointer::get_int(&arena, root, path);
    let _ = pointer::get_bool(&arena, root, path);
    let _ = pointer::get_str(&arena, root, path);
    let _ = pointer::get_null(&arena, root, path);
    let _ = pointer::test(&arena, root, path, root);
});
