//! Compression codecs.
//!
//! Only Yaz0 is needed: it wraps individual archive entries, whole
//! archives, and resource-size tables.

use std::borrow::Cow;

use crate::Result;

pub mod yaz0;

/// Returns `data` decompressed if it is Yaz0, or borrowed unchanged.
///
/// The flag is `true` when decompression happened.
///
/// # Errors
///
/// Returns [`crate::Error::Decompression`] for a corrupt Yaz0 stream.
pub fn unwrap_yaz0(data: &[u8]) -> Result<(Cow<'_, [u8]>, bool)> {
    if yaz0::is_compressed(data) {
        Ok((Cow::Owned(yaz0::decompress(data)?), true))
    } else {
        Ok((Cow::Borrowed(data), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_plain_borrows() {
        let (data, compressed) = unwrap_yaz0(b"plain").unwrap();
        assert!(!compressed);
        assert!(matches!(data, Cow::Borrowed(_)));
    }

    #[test]
    fn test_unwrap_compressed() {
        let packed = yaz0::compress(b"abcabcabcabc");
        let (data, compressed) = unwrap_yaz0(&packed).unwrap();
        assert!(compressed);
        assert_eq!(&*data, b"abcabcabcabc");
    }
}
