//! LZMA2 chunked-stream decoder.
//!
//! LZMA2 wraps LZMA in a sequence of self-describing chunks so streams can
//! be flushed, resumed, and mixed with stored data:
//!
//! - `0x00` terminates the stream
//! - `0x01`/`0x02` introduce an uncompressed chunk (16-bit big-endian
//!   size minus one); `0x01` also resets the dictionary
//! - `0x80..=0xFF` introduce an LZMA chunk: bits 0-4 are the high bits of
//!   the unpacked size minus one, followed by 16 more unpacked-size bits,
//!   a 16-bit packed size minus one, and bits 5-6 select the reset level
//!   (0 = none, 1 = state, 2 = state + new properties byte, 3 = state +
//!   new properties + dictionary)
//!
//! The dictionary survives chunk boundaries unless a reset discards it, so
//! matches can reach back into earlier chunks, including stored ones.

use ironarc_core::bytes::ByteReader;
use ironarc_core::error::{IronArcError, Result};

use crate::decoder::{DICT_SIZE_MIN, LoopEnd, run_loop};
use crate::model::{LzmaModel, LzmaProperties, State};
use crate::rangecoder::RangeDecoder;
use crate::window::OutputWindow;

/// Decoder for an LZMA2 chunk sequence.
#[derive(Debug)]
pub struct Lzma2Decoder {
    window: OutputWindow,
    model: Option<LzmaModel>,
    state: State,
    reps: [u32; 4],
}

impl Lzma2Decoder {
    /// Create a decoder with the given dictionary size.
    pub fn new(dict_size: u32) -> Self {
        Self {
            window: OutputWindow::new(dict_size.max(DICT_SIZE_MIN)),
            model: None,
            state: State::new(),
            reps: [0; 4],
        }
    }

    /// Decode a complete chunk sequence through the `0x00` terminator and
    /// return the uncompressed bytes.
    pub fn decompress(mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut reader = ByteReader::new(data);
        loop {
            let control = reader.read_u8()?;
            if control == 0x00 {
                break;
            }
            if control < 0x80 {
                self.uncompressed_chunk(&mut reader, control)?;
            } else {
                self.lzma_chunk(&mut reader, control)?;
            }
        }
        Ok(self.window.into_output())
    }

    fn uncompressed_chunk(&mut self, reader: &mut ByteReader<'_>, control: u8) -> Result<()> {
        if control > 0x02 {
            return Err(IronArcError::corrupted(
                reader.offset() as u64 - 1,
                format!("invalid LZMA2 control byte 0x{control:02X}"),
            ));
        }
        let size = usize::from(reader.read_u16_be()?) + 1;
        if control == 0x01 {
            self.window.reset();
        }
        let chunk = reader.read_bytes(size)?;
        for &byte in chunk {
            self.window.append(byte);
        }
        Ok(())
    }

    fn lzma_chunk(&mut self, reader: &mut ByteReader<'_>, control: u8) -> Result<()> {
        let unpacked =
            (u64::from(control & 0x1F) << 16) + u64::from(reader.read_u16_be()?) + 1;
        let packed = usize::from(reader.read_u16_be()?) + 1;
        let reset = (control >> 5) & 0x3;

        let model = match reset {
            2 | 3 => {
                let props = LzmaProperties::from_byte(reader.read_u8()?)?;
                self.state = State::new();
                self.reps = [0; 4];
                self.model.insert(LzmaModel::new(props))
            }
            1 => {
                let model = self.model.as_mut().ok_or_else(|| {
                    IronArcError::corrupted(
                        reader.offset() as u64,
                        "LZMA2 chunk decoded before any properties were set",
                    )
                })?;
                model.reset();
                self.state = State::new();
                self.reps = [0; 4];
                model
            }
            _ => self.model.as_mut().ok_or_else(|| {
                IronArcError::corrupted(
                    reader.offset() as u64,
                    "LZMA2 chunk decoded before any properties were set",
                )
            })?,
        };
        if reset == 3 {
            self.window.reset();
        }

        let chunk_offset = reader.offset() as u64;
        let packed_data = reader.read_bytes(packed)?;
        let mut rc = RangeDecoder::new(ByteReader::new(packed_data))?;
        let target = self.window.total_produced() + unpacked;
        let end = run_loop(
            &mut rc,
            model,
            &mut self.state,
            &mut self.reps,
            &mut self.window,
            Some(target),
        )?;
        if end == LoopEnd::Marker {
            return Err(IronArcError::corrupted(
                chunk_offset,
                "end-of-stream marker inside an LZMA2 chunk",
            ));
        }
        Ok(())
    }
}

/// Decode the dictionary-size byte used by LZMA2 filter properties:
/// `2 | (bits & 1)` shifted by `bits / 2 + 11`, with 40 meaning 4 GiB - 1.
pub fn dict_size_from_props(byte: u8) -> Result<u32> {
    if byte > 40 {
        return Err(IronArcError::invalid_header(format!(
            "invalid LZMA2 dictionary-size byte {byte}"
        )));
    }
    if byte == 40 {
        return Ok(u32::MAX);
    }
    Ok((2 | (u32::from(byte) & 1)) << (u32::from(byte) / 2 + 11))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stream() {
        let decoder = Lzma2Decoder::new(1 << 16);
        assert_eq!(decoder.decompress(&[0x00]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_uncompressed_chunks() {
        // Two stored chunks, the first with a dictionary reset.
        let data = [
            0x01, 0x00, 0x02, b'a', b'b', b'c', 0x02, 0x00, 0x01, b'd', b'e', 0x00,
        ];
        let decoder = Lzma2Decoder::new(1 << 16);
        assert_eq!(decoder.decompress(&data).unwrap(), b"abcde");
    }

    #[test]
    fn test_invalid_control_byte() {
        let decoder = Lzma2Decoder::new(1 << 16);
        let err = decoder.decompress(&[0x7F, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, IronArcError::CorruptedData { offset: 0, .. }));
    }

    #[test]
    fn test_lzma_chunk_without_properties() {
        // Reset level 0: no properties byte follows, and none were ever set.
        let decoder = Lzma2Decoder::new(1 << 16);
        let err = decoder
            .decompress(&[0x80, 0x00, 0x00, 0x00, 0x04, 0, 0, 0, 0, 0, 0x00])
            .unwrap_err();
        assert!(matches!(err, IronArcError::CorruptedData { .. }));
    }

    #[test]
    fn test_missing_terminator() {
        let decoder = Lzma2Decoder::new(1 << 16);
        let err = decoder
            .decompress(&[0x02, 0x00, 0x00, b'x'])
            .unwrap_err();
        assert!(matches!(err, IronArcError::TruncatedInput { .. }));
    }

    #[test]
    fn test_dict_size_props() {
        assert_eq!(dict_size_from_props(0).unwrap(), 4096);
        assert_eq!(dict_size_from_props(1).unwrap(), 6144);
        assert_eq!(dict_size_from_props(2).unwrap(), 8192);
        assert_eq!(dict_size_from_props(40).unwrap(), u32::MAX);
        assert!(dict_size_from_props(41).is_err());
    }
}
