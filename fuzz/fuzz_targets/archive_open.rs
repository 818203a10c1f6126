//! Fuzz target for ArchiveHandle::open with arbitrary byte input.
//!
//! Exercises header parsing, nested archive detection and tree building
//! with malformed input. Looks for panics and hangs.
//!
//! Run with: cargo +nightly fuzz run archive_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use wildbits::{ArchiveHandle, OpenOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(archive) = ArchiveHandle::open(data, &OpenOptions::default()) else {
        return;
    };

    // A parsed archive must serialize and parse again
    let bytes = archive
        .to_bytes()
        .expect("opened archive failed to serialize");
    let reopened = ArchiveHandle::open(&bytes, &OpenOptions::default())
        .expect("serialized archive failed to reopen");
    assert_eq!(archive.len(), reopened.len());

    for view in archive.tree() {
        let _ = archive.entry_info(&view.name);
    }
});
