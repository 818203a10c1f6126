//! Content sniffing by magic bytes.
//!
//! Nested archives are recognized purely by content, never by extension:
//! `Model.sbfres` holding SARC bytes is an archive, `Pack.sarc` holding
//! anything else is an opaque file.

use super::SARC_MAGIC;

/// Returns `true` if `data` starts with the SARC magic.
///
/// ```
/// use wildbits::format::detect::is_sarc;
///
/// assert!(is_sarc(b"SARC\x00\x14\xfe\xff"));
/// assert!(!is_sarc(b"Yaz0"));
/// ```
#[inline]
pub fn is_sarc(data: &[u8]) -> bool {
    data.starts_with(SARC_MAGIC)
}
