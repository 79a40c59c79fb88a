//! Content-Encoding decoders
//!
//! Output is capped: a body that inflates past `max_size` bytes is treated
//! as undecodable.

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::io::Read;

/// Supported `Content-Encoding` tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// No transformation
    Identity,
    /// gzip (also `x-gzip`)
    Gzip,
    /// zlib-wrapped deflate, with raw deflate accepted too
    Deflate,
}

impl Encoding {
    /// Parse a header value, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "identity" => Some(Self::Identity),
            "gzip" | "x-gzip" => Some(Self::Gzip),
            "deflate" => Some(Self::Deflate),
            _ => None,
        }
    }
}

fn read_capped<R: Read>(reader: R, encoding: &str, max_size: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .take(max_size.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| Error::decode(encoding, e.to_string()))?;
    if out.len() as u64 > max_size {
        return Err(Error::decode(
            encoding,
            format!("decoded size exceeds {max_size} bytes"),
        ));
    }
    Ok(out)
}

/// Decode `content` according to a `Content-Encoding` header value
pub fn decode(encoding: &str, content: &[u8], max_size: u64) -> Result<Vec<u8>> {
    match Encoding::parse(encoding) {
        Some(Encoding::Identity) => Ok(content.to_vec()),
        Some(Encoding::Gzip) => read_capped(GzDecoder::new(content), encoding, max_size),
        Some(Encoding::Deflate) => read_capped(ZlibDecoder::new(content), encoding, max_size)
            .or_else(|_| read_capped(DeflateDecoder::new(content), encoding, max_size)),
        None => Err(Error::decode(encoding, "unsupported encoding")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(Encoding::parse("GZIP"), Some(Encoding::Gzip));
        assert_eq!(Encoding::parse(" x-gzip "), Some(Encoding::Gzip));
        assert_eq!(Encoding::parse("deflate"), Some(Encoding::Deflate));
        assert_eq!(Encoding::parse("identity"), Some(Encoding::Identity));
        assert_eq!(Encoding::parse("br"), None);
        assert_eq!(Encoding::parse(""), None);
    }

    #[test]
    fn test_gzip() {
        let out = decode("gzip", &gzip(b"hello world"), 1024).unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn test_deflate_zlib_and_raw() {
        let mut z = ZlibEncoder::new(Vec::new(), Compression::default());
        z.write_all(b"zlib body").unwrap();
        assert_eq!(decode("deflate", &z.finish().unwrap(), 1024).unwrap(), b"zlib body");

        let mut d = DeflateEncoder::new(Vec::new(), Compression::default());
        d.write_all(b"raw body").unwrap();
        assert_eq!(decode("deflate", &d.finish().unwrap(), 1024).unwrap(), b"raw body");
    }

    #[test]
    fn test_corrupt_and_unknown_fail() {
        assert!(decode("gzip", b"not gzip at all", 1024).is_err());
        assert!(decode("br", b"whatever", 1024).is_err());
    }

    #[test]
    fn test_cap() {
        let bomb = gzip(&vec![0u8; 10_000]);
        assert!(matches!(decode("gzip", &bomb, 1_000), Err(Error::Decode { .. })));
        assert_eq!(decode("gzip", &bomb, 10_000).unwrap().len(), 10_000);
    }
}
