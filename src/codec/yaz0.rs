//! Yaz0 compression codec (pure Rust implementation).
//!
//! Yaz0 is a byte-oriented LZ77 variant used for most compressed game
//! resources. Archive entries and whole archives are commonly stored
//! wrapped in it.
//!
//! # Format
//!
//! - 16-byte header: magic `Yaz0`, big-endian decompressed size, big-endian
//!   data alignment hint, 4 reserved bytes
//! - Groups of one code byte followed by up to eight chunks. Code bits are
//!   read MSB first: `1` copies one literal byte, `0` is a back-reference.
//! - A back-reference is `NR RR` where the distance is `0xRRR + 1` and the
//!   length is `N + 2`. When `N` is zero a third byte follows and the
//!   length is that byte plus `0x12`.

use crate::{Error, Result};

/// Yaz0 magic bytes.
pub const YAZ0_MAGIC: &[u8; 4] = b"Yaz0";

/// Size of the Yaz0 header.
pub const YAZ0_HEADER_SIZE: usize = 0x10;

/// Shortest back-reference worth encoding.
const MIN_MATCH: usize = 3;

/// Longest back-reference the encoding can express.
const MAX_MATCH: usize = 0x111;

/// Sliding window size.
const WINDOW_SIZE: usize = 0x1000;

/// Back-references up to this length fit in two bytes.
const SHORT_MATCH_LIMIT: usize = 0x11;

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;

/// Candidates examined per position.
const MAX_CHAIN: usize = 64;

const NO_POSITION: usize = usize::MAX;

/// Parsed Yaz0 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Yaz0Header {
    /// Size of the data once decompressed.
    pub decompressed_size: u32,
    /// Alignment hint for the decompressed data (0 if unset).
    pub alignment: u32,
}

impl Yaz0Header {
    /// Reads the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < YAZ0_HEADER_SIZE || !data.starts_with(YAZ0_MAGIC) {
            return None;
        }
        let word = |at: usize| u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
        Some(Self {
            decompressed_size: word(4),
            alignment: word(8),
        })
    }
}

/// Returns `true` if `data` carries a complete Yaz0 header.
#[inline]
pub fn is_compressed(data: &[u8]) -> bool {
    Yaz0Header::parse(data).is_some()
}

/// Returns the decompressed size declared by a Yaz0 header.
pub fn decompressed_size(data: &[u8]) -> Option<u32> {
    Yaz0Header::parse(data).map(|h| h.decompressed_size)
}

/// Decompresses a complete Yaz0 stream.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the header is missing and
/// [`Error::Decompression`] if the stream is truncated or refers back
/// past the start of the output.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let header = Yaz0Header::parse(data)
        .ok_or_else(|| Error::InvalidFormat("missing Yaz0 header".into()))?;
    let size = header.decompressed_size as usize;

    // Cap the up-front allocation; a hostile header may claim 4 GiB.
    let mut out = Vec::with_capacity(size.min(data.len().saturating_mul(MAX_MATCH)));
    let mut src = YAZ0_HEADER_SIZE;
    let mut code = 0u8;
    let mut bits_left = 0u32;

    let byte_at = |at: usize| -> Result<u8> {
        data.get(at).copied().ok_or_else(|| Error::Decompression {
            reason: format!("stream truncated at offset {:#x}", at),
        })
    };

    while out.len() < size {
        if bits_left == 0 {
            code = byte_at(src)?;
            src += 1;
            bits_left = 8;
        }

        if code & 0x80 != 0 {
            out.push(byte_at(src)?);
            src += 1;
        } else {
            let b1 = byte_at(src)? as usize;
            let b2 = byte_at(src + 1)? as usize;
            src += 2;

            let distance = ((b1 & 0x0F) << 8 | b2) + 1;
            let length = match b1 >> 4 {
                0 => {
                    let b3 = byte_at(src)? as usize;
                    src += 1;
                    b3 + 0x12
                }
                n => n + 2,
            };

            if distance > out.len() {
                return Err(Error::Decompression {
                    reason: format!(
                        "back-reference distance {} exceeds {} bytes of output",
                        distance,
                        out.len()
                    ),
                });
            }

            let start = out.len() - distance;
            let length = length.min(size - out.len());
            // Byte-wise so that overlapping references repeat correctly
            for k in 0..length {
                let b = out[start + k];
                out.push(b);
            }
        }

        code <<= 1;
        bits_left -= 1;
    }

    Ok(out)
}

/// Compresses `data` into a Yaz0 stream with no alignment hint.
pub fn compress(data: &[u8]) -> Vec<u8> {
    compress_with_alignment(data, 0)
}

/// Compresses `data` into a Yaz0 stream, recording `alignment` in the header.
///
/// Uses greedy matching over hash chains. Output is deterministic.
pub fn compress_with_alignment(data: &[u8], alignment: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(YAZ0_HEADER_SIZE + data.len() + data.len() / 8 + 1);
    out.extend_from_slice(YAZ0_MAGIC);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&alignment.to_be_bytes());
    out.extend_from_slice(&[0; 4]);

    let mut finder = MatchFinder::new(data.len());
    let mut pos = 0;

    while pos < data.len() {
        let code_pos = out.len();
        out.push(0);
        let mut code = 0u8;

        for bit in 0..8 {
            if pos >= data.len() {
                break;
            }
            match finder.longest_match(data, pos) {
                Some((length, distance)) => {
                    let d = distance - 1;
                    if length > SHORT_MATCH_LIMIT {
                        out.push((d >> 8) as u8);
                        out.push(d as u8);
                        out.push((length - 0x12) as u8);
                    } else {
                        out.push((((length - 2) << 4) | (d >> 8)) as u8);
                        out.push(d as u8);
                    }
                    for p in pos..pos + length {
                        finder.insert(data, p);
                    }
                    pos += length;
                }
                None => {
                    code |= 0x80 >> bit;
                    out.push(data[pos]);
                    finder.insert(data, pos);
                    pos += 1;
                }
            }
        }

        out[code_pos] = code;
    }

    out
}

/// Hash-chain match finder over a 4 KiB window.
struct MatchFinder {
    head: Vec<usize>,
    prev: Vec<usize>,
}

impl MatchFinder {
    fn new(len: usize) -> Self {
        Self {
            head: vec![NO_POSITION; HASH_SIZE],
            prev: vec![NO_POSITION; len],
        }
    }

    #[inline]
    fn hash3(data: &[u8], pos: usize) -> usize {
        let v = (data[pos] as u32) << 16 | (data[pos + 1] as u32) << 8 | data[pos + 2] as u32;
        (v.wrapping_mul(2654435761) >> (32 - HASH_BITS)) as usize
    }

    fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let h = Self::hash3(data, pos);
        self.prev[pos] = self.head[h];
        self.head[h] = pos;
    }

    /// Returns `(length, distance)` of the longest match at `pos`.
    fn longest_match(&self, data: &[u8], pos: usize) -> Option<(usize, usize)> {
        if pos + MIN_MATCH > data.len() {
            return None;
        }
        let max_len = (data.len() - pos).min(MAX_MATCH);
        let mut best: Option<(usize, usize)> = None;
        let mut candidate = self.head[Self::hash3(data, pos)];

        for _ in 0..MAX_CHAIN {
            if candidate == NO_POSITION || pos - candidate > WINDOW_SIZE {
                break;
            }
            let length = data[candidate..]
                .iter()
                .zip(&data[pos..pos + max_len])
                .take_while(|(a, b)| a == b)
                .count();
            if length >= MIN_MATCH && best.is_none_or(|(l, _)| length > l) {
                best = Some((length, pos - candidate));
                if length == max_len {
                    break;
                }
            }
            candidate = self.prev[candidate];
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_text() {
        let data = b"Hello hello hello hello, Yaz0 world! world! world!".repeat(20);
        let packed = compress(&data);
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_roundtrip_empty() {
        let packed = compress(&[]);
        assert_eq!(packed.len(), YAZ0_HEADER_SIZE);
        assert_eq!(decompress(&packed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_long_run_uses_three_byte_refs() {
        let data = vec![0xAB; 5000];
        let packed = compress(&data);
        assert!(packed.len() < 100);
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_header_fields() {
        let packed = compress_with_alignment(b"abc", 0x80);
        let header = Yaz0Header::parse(&packed).unwrap();
        assert_eq!(header.decompressed_size, 3);
        assert_eq!(header.alignment, 0x80);
        assert_eq!(decompressed_size(&packed), Some(3));
        assert!(is_compressed(&packed));
        assert!(!is_compressed(b"Yaz0"));
    }

    #[test]
    fn test_decode_hand_built_stream() {
        // "abc" literal, then a 6-byte reference at distance 3
        let mut stream = Vec::new();
        stream.extend_from_slice(b"Yaz0");
        stream.extend_from_slice(&9u32.to_be_bytes());
        stream.extend_from_slice(&[0; 8]);
        stream.push(0b1110_0000);
        stream.extend_from_slice(b"abc");
        stream.extend_from_slice(&[0x40, 0x02]);
        assert_eq!(decompress(&stream).unwrap(), b"abcabcabc");
    }

    #[test]
    fn test_truncated_stream() {
        let data = b"some data that compresses some data that compresses".to_vec();
        let packed = compress(&data);
        let err = decompress(&packed[..packed.len() - 2]).unwrap_err();
        assert!(matches!(err, Error::Decompression { .. }));
    }

    #[test]
    fn test_bad_distance() {
        let mut stream = Vec::new();
        stream.extend_from_slice(b"Yaz0");
        stream.extend_from_slice(&4u32.to_be_bytes());
        stream.extend_from_slice(&[0; 8]);
        stream.push(0x00);
        stream.extend_from_slice(&[0x20, 0x05]);
        let err = decompress(&stream).unwrap_err();
        assert!(matches!(err, Error::Decompression { .. }));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            decompress(b"nope").unwrap_err(),
            Error::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_pseudorandom_roundtrip() {
        let mut state = 0x1234_5678u32;
        let data: Vec<u8> = (0..20_000)
            .map(|i| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                // Mix random bytes with repeated structure
                if i % 7 < 3 { (state >> 24) as u8 } else { (i % 31) as u8 }
            })
            .collect();
        assert_eq!(decompress(&compress(&data)).unwrap(), data);
    }
}
