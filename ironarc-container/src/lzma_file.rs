//! Standalone `.lzma` file support.
//!
//! The legacy `.lzma` format is a 13-byte header (properties byte,
//! little-endian dictionary size, little-endian uncompressed size) followed
//! directly by one raw LZMA stream. There is no magic number and no
//! checksum, so validation is limited to the header fields themselves.

use ironarc_core::bytes::ByteReader;
use ironarc_core::error::Result;
use ironarc_lzma::LzmaProperties;

/// Parsed `.lzma` header.
#[derive(Debug, Clone, Copy)]
pub struct LzmaFileInfo {
    /// Stream parameters from the properties byte.
    pub props: LzmaProperties,
    /// Declared dictionary size in bytes.
    pub dict_size: u32,
    /// Declared uncompressed size; `None` when the stream ends with the
    /// end-of-stream marker instead.
    pub unpacked_size: Option<u64>,
}

/// Parse the header of a `.lzma` file without decoding the stream.
pub fn info(data: &[u8]) -> Result<LzmaFileInfo> {
    let mut reader = ByteReader::new(data);
    let props = LzmaProperties::from_byte(reader.read_u8()?)?;
    let dict_size = reader.read_u32_le()?;
    let unpacked_size = match reader.read_u64_le()? {
        u64::MAX => None,
        size => Some(size),
    };
    Ok(LzmaFileInfo {
        props,
        dict_size,
        unpacked_size,
    })
}

/// Decompress a `.lzma` file to its contents.
pub fn unpack(data: &[u8]) -> Result<Vec<u8>> {
    ironarc_lzma::decompress(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironarc_core::error::IronArcError;

    // "A", compressed by liblzma with lc=3 lp=0 pb=2 and a 64 KiB
    // dictionary, marker-terminated.
    const LZMA_A: [u8; 24] = [
        0x5D, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFF, 0xFF, 0x00, 0x20, 0xC1, 0xFB, 0xFF, 0xFF, 0xFF, 0xE0, 0x00,
        0x00, 0x00,
    ];

    #[test]
    fn test_info() {
        let info = info(&LZMA_A).unwrap();
        assert_eq!(info.props, LzmaProperties::new(3, 0, 2).unwrap());
        assert_eq!(info.dict_size, 1 << 16);
        assert_eq!(info.unpacked_size, None);
    }

    #[test]
    fn test_unpack() {
        assert_eq!(unpack(&LZMA_A).unwrap(), b"A");
    }

    #[test]
    fn test_info_rejects_short_header() {
        let err = info(&LZMA_A[..7]).unwrap_err();
        assert!(matches!(err, IronArcError::TruncatedInput { .. }));
    }
}
