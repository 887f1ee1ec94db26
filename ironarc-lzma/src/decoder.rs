//! LZMA stream decoder.
//!
//! Ties the range decoder, the probability model, the state machine, and
//! the output window together into the main symbol loop, and parses the
//! 13-byte `.lzma` header for standalone streams.

use std::cmp::Ordering;

use ironarc_core::bytes::ByteReader;
use ironarc_core::error::{IronArcError, Result};

use crate::model::{END_OF_STREAM_MARKER, LzmaModel, LzmaProperties, MATCH_LEN_MIN, State};
use crate::rangecoder::RangeDecoder;
use crate::window::OutputWindow;

/// Smallest dictionary size the format permits; headers declaring less are
/// rounded up.
pub const DICT_SIZE_MIN: u32 = 4096;

/// Why the symbol loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopEnd {
    /// The end-of-stream marker distance was decoded.
    Marker,
    /// The output reached the caller's byte target.
    LimitReached,
}

/// Decoder for a single raw LZMA stream.
#[derive(Debug)]
pub struct LzmaDecoder<'a> {
    rc: RangeDecoder<'a>,
    model: LzmaModel,
    state: State,
    reps: [u32; 4],
    window: OutputWindow,
    unpacked_size: Option<u64>,
}

impl<'a> LzmaDecoder<'a> {
    /// Create a decoder over raw range-coded data (no header).
    ///
    /// `unpacked_size` of `None` selects end-marker termination.
    pub fn new(
        data: &'a [u8],
        props: LzmaProperties,
        dict_size: u32,
        unpacked_size: Option<u64>,
    ) -> Result<Self> {
        props.validate()?;
        Ok(Self {
            rc: RangeDecoder::new(ByteReader::new(data))?,
            model: LzmaModel::new(props),
            state: State::new(),
            reps: [0; 4],
            window: OutputWindow::new(dict_size.max(DICT_SIZE_MIN)),
            unpacked_size,
        })
    }

    /// Create a decoder from a standalone `.lzma` stream: a 13-byte header
    /// (properties byte, little-endian u32 dictionary size, little-endian
    /// u64 uncompressed size with `u64::MAX` meaning unknown) followed by
    /// the range-coded data.
    pub fn from_header(data: &'a [u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let props = LzmaProperties::from_byte(reader.read_u8()?)?;
        let dict_size = reader.read_u32_le()?;
        let unpacked_size = match reader.read_u64_le()? {
            u64::MAX => None,
            size => Some(size),
        };
        Self::new(&data[13..], props, dict_size, unpacked_size)
    }

    /// Decode the whole stream and return the uncompressed bytes.
    pub fn decompress(mut self) -> Result<Vec<u8>> {
        let end = run_loop(
            &mut self.rc,
            &mut self.model,
            &mut self.state,
            &mut self.reps,
            &mut self.window,
            self.unpacked_size,
        )?;
        if end == LoopEnd::Marker {
            if self.unpacked_size.is_some() {
                return Err(IronArcError::unsupported(
                    "end-of-stream marker inside a sized LZMA stream",
                ));
            }
            if !self.rc.is_finished()? {
                return Err(IronArcError::corrupted(
                    self.window.total_produced(),
                    "range coder not drained after the end-of-stream marker",
                ));
            }
        }
        Ok(self.window.into_output())
    }
}

/// The main symbol loop, shared between raw LZMA and per-chunk LZMA2
/// decoding. Runs until the end marker or until the window's produced-byte
/// count reaches `limit`.
pub(crate) fn run_loop(
    rc: &mut RangeDecoder<'_>,
    model: &mut LzmaModel,
    state: &mut State,
    reps: &mut [u32; 4],
    window: &mut OutputWindow,
    limit: Option<u64>,
) -> Result<LoopEnd> {
    loop {
        if let Some(limit) = limit {
            match window.total_produced().cmp(&limit) {
                Ordering::Equal => return Ok(LoopEnd::LimitReached),
                Ordering::Greater => {
                    return Err(IronArcError::corrupted(
                        window.total_produced(),
                        "decoded output overran the declared size",
                    ));
                }
                Ordering::Less => {}
            }
        }

        let pos = window.total_produced();
        let pos_state = (pos & model.props.pos_mask()) as usize;

        if rc.decode_bit(&mut model.is_match[state.index()][pos_state])? == 0 {
            // Literal. After a match the previously matched data predicts
            // the next byte, so the decoder mixes in the byte at rep0.
            let match_byte = if state.is_literal() {
                None
            } else {
                Some(window.byte_at(reps[0]))
            };
            let prev_byte = window.byte_at(0);
            let byte = model.literal.decode(rc, pos, prev_byte, match_byte)?;
            window.append(byte);
            state.update_literal();
            continue;
        }

        let (dist, len) = if rc.decode_bit(&mut model.is_rep[state.index()])? == 0 {
            // Plain match: new length, new distance.
            let len = model.match_len.decode(rc, pos_state)?;
            let dist = model.distance.decode(rc, len)?;

            if dist == END_OF_STREAM_MARKER {
                return Ok(LoopEnd::Marker);
            }

            reps[3] = reps[2];
            reps[2] = reps[1];
            reps[1] = reps[0];
            reps[0] = dist;
            state.update_match();
            (dist, len)
        } else if rc.decode_bit(&mut model.is_rep_g0[state.index()])? == 0 {
            if rc.decode_bit(&mut model.is_rep0_long[state.index()][pos_state])? == 0 {
                // Short rep: one byte at rep0, no length code.
                window.copy_match(reps[0], 1)?;
                state.update_short_rep();
                continue;
            }
            let len = model.rep_len.decode(rc, pos_state)?;
            state.update_rep();
            (reps[0], len)
        } else {
            // Promote the selected older distance to the front of the
            // queue, shifting the younger entries down.
            let dist = if rc.decode_bit(&mut model.is_rep_g1[state.index()])? == 0 {
                let dist = reps[1];
                reps[1] = reps[0];
                dist
            } else if rc.decode_bit(&mut model.is_rep_g2[state.index()])? == 0 {
                let dist = reps[2];
                reps[2] = reps[1];
                reps[1] = reps[0];
                dist
            } else {
                let dist = reps[3];
                reps[3] = reps[2];
                reps[2] = reps[1];
                reps[1] = reps[0];
                dist
            };
            reps[0] = dist;
            let len = model.rep_len.decode(rc, pos_state)?;
            state.update_rep();
            (dist, len)
        };

        window.copy_match(dist, len + MATCH_LEN_MIN)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_rejects_short_input() {
        let err = LzmaDecoder::from_header(&[0x5D, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, IronArcError::TruncatedInput { .. }));
    }

    #[test]
    fn test_from_header_rejects_bad_properties() {
        // 225 is the smallest invalid properties byte.
        let mut header = [0u8; 18];
        header[0] = 225;
        let err = LzmaDecoder::from_header(&header).unwrap_err();
        assert!(matches!(err, IronArcError::InvalidHeader { .. }));
    }

    #[test]
    fn test_header_unknown_size_selects_marker_mode() {
        let mut data = [0xFFu8; 18];
        data[0] = 0x5D;
        data[1..5].copy_from_slice(&0x0001_0000u32.to_le_bytes());
        data[13] = 0x00;
        let decoder = LzmaDecoder::from_header(&data).unwrap();
        assert!(decoder.unpacked_size.is_none());
    }

    #[test]
    fn test_zero_sized_stream_decodes_empty() {
        let data = [0u8; 16];
        let props = LzmaProperties::default();
        let decoder = LzmaDecoder::new(&data, props, 1 << 16, Some(0)).unwrap();
        assert_eq!(decoder.decompress().unwrap(), Vec::<u8>::new());
    }
}
