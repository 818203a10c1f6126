//! Name hashing shared by the archive codec and the size table.
//!
//! Two hashes are in play:
//!
//! - [`sarc_name_hash`]: the multiplicative string hash SARC uses to key its
//!   file allocation table. The multiplier is stored in the SFAT header and
//!   is `0x65` in every archive seen in practice.
//! - [`resource_hash`]: CRC-32 (IEEE 802.3 polynomial) of a canonical
//!   resource path, which keys RSTB size tables.
//!
//! # Example
//!
//! ```rust
//! use wildbits::hash::{resource_hash, sarc_name_hash, DEFAULT_HASH_MULTIPLIER};
//!
//! assert_eq!(resource_hash("123456789"), 0xCBF4_3926);
//! let h = sarc_name_hash("Model/Npc.bfres", DEFAULT_HASH_MULTIPLIER);
//! assert_ne!(h, 0);
//! ```

/// Hash multiplier written by every known SARC encoder.
pub const DEFAULT_HASH_MULTIPLIER: u32 = 0x65;

/// Computes the SARC file-name hash.
///
/// Each byte is sign-extended before being added, matching the reference
/// encoder's use of signed `char`.
pub fn sarc_name_hash(name: &str, multiplier: u32) -> u32 {
    name.as_bytes().iter().fold(0u32, |hash, &byte| {
        hash.wrapping_mul(multiplier)
            .wrapping_add(byte as i8 as i32 as u32)
    })
}

/// Computes the RSTB hash of a canonical resource path.
#[inline]
pub fn resource_hash(name: &str) -> u32 {
    crc32fast::hash(name.as_bytes())
}
