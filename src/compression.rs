//! Producer-side tile codecs.
//!
//! The storage engine treats compression as an opaque codec *name* resolved
//! through the compression registry; it never touches payload bytes. These
//! helpers are for producers (the CLI, render pipelines) that pick a codec
//! before calling `write_tile` and undo it after `read_tile`.

use std::io::{Read, Write};

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Codec name as stored in the compression registry.
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Zstd => "zstd",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Compression::None),
            "gzip" => Some(Compression::Gzip),
            "zstd" => Some(Compression::Zstd),
            _ => None,
        }
    }

    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let mut enc =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
                enc.write_all(data)
                    .and_then(|_| enc.finish())
                    .map_err(|e| StorageError::Backend(format!("gzip encode: {}", e)))
            }
            Compression::Zstd => zstd::encode_all(data, 0)
                .map_err(|e| StorageError::Backend(format!("zstd encode: {}", e))),
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Gzip => {
                let mut dec = flate2::read::GzDecoder::new(data);
                let mut out = Vec::new();
                dec.read_to_end(&mut out)
                    .map_err(|e| StorageError::Backend(format!("gzip decode: {}", e)))?;
                Ok(out)
            }
            Compression::Zstd => zstd::decode_all(data)
                .map_err(|e| StorageError::Backend(format!("zstd decode: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for c in [Compression::None, Compression::Gzip, Compression::Zstd] {
            assert_eq!(Compression::from_name(c.name()), Some(c));
        }
        assert_eq!(Compression::from_name("lzma"), None);
    }

    #[test]
    fn gzip_roundtrip() {
        let data = b"tile payload tile payload tile payload".to_vec();
        let packed = Compression::Gzip.compress(&data).expect("compress");
        assert_ne!(packed, data);
        let unpacked = Compression::Gzip.decompress(&packed).expect("decompress");
        assert_eq!(unpacked, data);
    }

    #[test]
    fn zstd_roundtrip() {
        let data = vec![7u8; 4096];
        let packed = Compression::Zstd.compress(&data).expect("compress");
        assert!(packed.len() < data.len());
        let unpacked = Compression::Zstd.decompress(&packed).expect("decompress");
        assert_eq!(unpacked, data);
    }
}
