//! Sequential byte cursor over an in-memory buffer.
//!
//! All decoders in this workspace consume their input through [`ByteReader`]:
//! a position-tracking cursor with explicit truncation errors. Reading past
//! the end of the buffer is always [`IronArcError::TruncatedInput`] - an
//! in-memory source that runs dry mid-decode means the stream is corrupt,
//! not that the caller should retry.

use crate::error::{IronArcError, Result};

/// A cursor over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check whether the reader is exhausted.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.data.len() {
            return Err(IronArcError::truncated(1));
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Read a big-endian 16-bit value.
    pub fn read_u16_be(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian 32-bit value.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian 64-bit value.
    pub fn read_u64_le(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Read exactly `count` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(IronArcError::truncated(count - self.remaining()));
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Skip `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16_be().unwrap(), 0x0203);
        assert_eq!(reader.read_u32_le().unwrap(), 0x0706_0504);
        assert!(reader.is_empty());
        assert_eq!(reader.offset(), 7);
    }

    #[test]
    fn test_truncated_read() {
        let mut reader = ByteReader::new(&[0xAA]);
        assert_eq!(reader.read_u8().unwrap(), 0xAA);

        let err = reader.read_u8().unwrap_err();
        assert!(matches!(
            err,
            IronArcError::TruncatedInput { needed: 1 }
        ));

        let mut reader = ByteReader::new(&[0xAA]);
        let err = reader.read_u32_le().unwrap_err();
        assert!(matches!(
            err,
            IronArcError::TruncatedInput { needed: 3 }
        ));
    }

    #[test]
    fn test_read_bytes_and_skip() {
        let data = b"!<arch>\nrest";
        let mut reader = ByteReader::new(data);

        assert_eq!(reader.read_bytes(8).unwrap(), b"!<arch>\n");
        reader.skip(2).unwrap();
        assert_eq!(reader.remaining(), 2);
    }
}
