//! Binary range decoder for LZMA decompression.
//!
//! The range coder is an arithmetic-coding variant that operates on integer
//! ranges instead of fractions. LZMA uses a specific flavor:
//! - 32-bit `range` and `code` registers
//! - renormalization whenever `range` drops below 2^24
//! - 11-bit adaptive probabilities (2048 = certainty, 1024 = 50%)
//!
//! Every probability counter is an 11-bit fixed-point estimate of "the next
//! bit is 0". Decoding a bit through a counter also rewrites it, shifting
//! the estimate toward the observed outcome by `1/32` of the gap. That
//! update is the sole adaptive mechanism in the whole format.

use ironarc_core::bytes::ByteReader;
use ironarc_core::error::{IronArcError, Result};

/// Number of bits in the probability model.
pub const PROB_BITS: u32 = 11;

/// Initial probability value (50%).
pub const PROB_INIT: u16 = 1 << (PROB_BITS - 1);

/// Maximum probability value.
pub const PROB_MAX: u16 = 1 << PROB_BITS;

/// Adaptation shift: counters move by `gap >> MOVE_BITS` per decoded bit.
pub const MOVE_BITS: u32 = 5;

/// Renormalization threshold.
const TOP_VALUE: u32 = 1 << 24;

/// Symbol accumulation order for bit-tree decoding.
///
/// The tree node index always walks most-significant-bit first; only the
/// order in which decoded bits enter the result differs. Keeping both
/// orders in one routine avoids two near-duplicate code paths drifting
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Decoded bits form the symbol most-significant-bit first.
    MsbFirst,
    /// Decoded bits enter the symbol at increasing significance.
    LsbFirst,
}

/// Range decoder over an in-memory byte cursor.
///
/// The decoder owns its cursor; a consumed decoder cannot be rewound.
#[derive(Debug)]
pub struct RangeDecoder<'a> {
    reader: ByteReader<'a>,
    range: u32,
    code: u32,
}

impl<'a> RangeDecoder<'a> {
    /// Create a range decoder, consuming the 5-byte initialization sequence:
    /// one reserved byte (required to be zero) followed by the initial
    /// `code` register, big-endian.
    pub fn new(mut reader: ByteReader<'a>) -> Result<Self> {
        if reader.remaining() < 5 {
            return Err(IronArcError::truncated(5 - reader.remaining()));
        }
        if reader.read_u8()? != 0 {
            return Err(IronArcError::invalid_header(
                "nonzero first byte of LZMA range-coded data",
            ));
        }

        let mut code = 0u32;
        for _ in 0..4 {
            code = (code << 8) | u32::from(reader.read_u8()?);
        }

        Ok(Self {
            reader,
            range: 0xFFFF_FFFF,
            code,
        })
    }

    /// Shift one more input byte into `code` when the range gets small.
    fn normalize(&mut self) -> Result<()> {
        if self.range < TOP_VALUE {
            self.range <<= 8;
            self.code = (self.code << 8) | u32::from(self.reader.read_u8()?);
        }
        Ok(())
    }

    /// Decode a single bit through an adaptive probability counter.
    pub fn decode_bit(&mut self, prob: &mut u16) -> Result<u32> {
        self.normalize()?;

        let bound = (self.range >> PROB_BITS) * u32::from(*prob);
        if self.code < bound {
            self.range = bound;
            *prob += (PROB_MAX - *prob) >> MOVE_BITS;
            Ok(0)
        } else {
            self.range -= bound;
            self.code -= bound;
            *prob -= *prob >> MOVE_BITS;
            Ok(1)
        }
    }

    /// Decode a single bit with a fixed 50% probability.
    pub fn decode_direct_bit(&mut self) -> Result<u32> {
        self.normalize()?;

        self.range >>= 1;
        self.code = self.code.wrapping_sub(self.range);
        if (self.code as i32) < 0 {
            self.code = self.code.wrapping_add(self.range);
            Ok(0)
        } else {
            Ok(1)
        }
    }

    /// Decode `count` fixed-probability bits, most-significant-bit first.
    pub fn decode_direct_bits(&mut self, count: u32) -> Result<u32> {
        let mut result = 0u32;
        for _ in 0..count {
            result = (result << 1) | self.decode_direct_bit()?;
        }
        Ok(result)
    }

    /// Check that the code register has drained to zero, which a
    /// well-formed marker-terminated stream guarantees after its final
    /// symbol. Catches up any pending renormalization first.
    pub fn is_finished(&mut self) -> Result<bool> {
        self.normalize()?;
        Ok(self.code == 0)
    }

    /// Decode an `num_bits`-wide symbol through a bit-tree of `2^num_bits`
    /// probability counters (`probs[0]` is unused; the root is `probs[1]`).
    pub fn decode_tree(
        &mut self,
        probs: &mut [u16],
        num_bits: u32,
        order: BitOrder,
    ) -> Result<u32> {
        let mut node = 1usize;
        let mut symbol = 0u32;

        for step in 0..num_bits {
            let bit = self.decode_bit(&mut probs[node])?;
            node = (node << 1) | bit as usize;
            if order == BitOrder::LsbFirst {
                symbol |= bit << step;
            }
        }

        match order {
            BitOrder::MsbFirst => Ok(node as u32 - (1 << num_bits)),
            BitOrder::LsbFirst => Ok(symbol),
        }
    }
}
