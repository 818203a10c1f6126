//! Fuzz target for ArchivePath::new with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run archive_path
//!
//! Properties checked on every accepted path:
//! - no `.` or `..` segments
//! - not absolute, no empty segments
//! - no NUL bytes

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path_str) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = wildbits::ArchivePath::new(path_str) else {
        return;
    };

    let s = path.as_str();
    assert!(!s.starts_with('/'), "Absolute path accepted: {:?}", s);
    assert!(!s.contains('\0'), "NUL byte in path: {:?}", s);
    for segment in path.components() {
        assert!(
            !segment.is_empty() && segment != "." && segment != "..",
            "Bad segment {:?} in {:?}",
            segment,
            s
        );
    }
    assert_eq!(path.depth(), s.split('/').count());
});
