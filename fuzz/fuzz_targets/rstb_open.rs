//! Fuzz target for ResourceSizeIndex::open.
//!
//! Run with: cargo +nightly fuzz run rstb_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use wildbits::ResourceSizeIndex;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = ResourceSizeIndex::open(data) else {
        return;
    };
    for (hash, size) in table.iter() {
        assert_eq!(table.lookup(hash), Some(size));
    }
    // Names read lossily may exceed what the writer accepts
    let _ = table.to_bytes();
});
