//! Fuzz target for Yaz0 decompression.
//!
//! Run with: cargo +nightly fuzz run yaz0_decompress

#![no_main]

use libfuzzer_sys::fuzz_target;
use wildbits::codec::yaz0;

fuzz_target!(|data: &[u8]| {
    if let Ok(out) = yaz0::decompress(data) {
        assert_eq!(Some(out.len() as u32), yaz0::decompressed_size(data));
        assert_eq!(yaz0::decompress(&yaz0::compress(&out)).ok(), Some(out));
    }
});
