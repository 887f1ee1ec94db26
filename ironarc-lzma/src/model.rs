//! LZMA probability models and the symbol sub-decoders built on them.
//!
//! LZMA drives everything through context-selected banks of adaptive
//! probability counters:
//! - literal coding (context = position alignment + high bits of the
//!   previous output byte)
//! - match length coding (a ternary short/medium/long split)
//! - match distance coding (slot + direct bits + aligned bits)
//! - the 12-state symbol-class state machine
//!
//! Each decoder instance owns one complete set of counters; nothing is
//! shared between streams, and a reset restores every counter to 1024.

use crate::rangecoder::{BitOrder, PROB_INIT, RangeDecoder};
use ironarc_core::error::{IronArcError, Result};

/// Number of states in the LZMA state machine.
pub const NUM_STATES: usize = 12;

/// Maximum number of position states (`pb` <= 4).
pub const POS_STATES_MAX: usize = 1 << 4;

/// Minimum match length; decoded lengths are zero-based relative to this.
pub const MATCH_LEN_MIN: u32 = 2;

/// Number of bits in a low/mid length tree.
const LEN_LOW_BITS: u32 = 3;
/// Number of bits in the high length tree.
const LEN_HIGH_BITS: u32 = 8;

/// Number of distance slots.
pub const DIST_SLOTS: usize = 64;

/// Number of length buckets selecting a distance-slot tree.
const LEN_TO_DIST_BUCKETS: usize = 4;

/// Number of low bits of a distance decoded through the aligned tree.
const DIST_ALIGN_BITS: u32 = 4;
/// Size of the aligned tree.
const DIST_ALIGN_SIZE: usize = 1 << DIST_ALIGN_BITS;

/// Slots below this index take their trailing bits from the `special` bank.
const END_POS_MODEL_INDEX: u32 = 14;
/// Largest distance fully covered by the `special` bank.
const FULL_DISTANCES: usize = 128;

/// Distance value reserved as the end-of-stream marker.
pub const END_OF_STREAM_MARKER: u32 = 0xFFFF_FFFF;

// State transitions, indexed by the current state. States 0-6 follow a
// literal, states 7-11 follow a match/rep; the literal successor walks the
// state back toward 0 so literal context decays over a few symbols.
const NEXT_AFTER_LITERAL: [u8; NUM_STATES] = [0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 4, 5];
const NEXT_AFTER_MATCH: [u8; NUM_STATES] = [7, 7, 7, 7, 7, 7, 7, 10, 10, 10, 10, 10];
const NEXT_AFTER_REP: [u8; NUM_STATES] = [8, 8, 8, 8, 8, 8, 8, 11, 11, 11, 11, 11];
const NEXT_AFTER_SHORT_REP: [u8; NUM_STATES] = [9, 9, 9, 9, 9, 9, 9, 11, 11, 11, 11, 11];

/// LZMA state machine state (0-11), encoding the class of the last one or
/// two decoded symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State(u8);

impl State {
    /// Initial state: clean start, literal decoding uses no match-byte mixing.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Index into state-selected probability banks.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// States 0-6 follow a literal; 7-11 follow a match or rep.
    pub fn is_literal(self) -> bool {
        self.0 < 7
    }

    /// Transition after decoding a literal.
    pub fn update_literal(&mut self) {
        self.0 = NEXT_AFTER_LITERAL[self.0 as usize];
    }

    /// Transition after decoding a plain match.
    pub fn update_match(&mut self) {
        self.0 = NEXT_AFTER_MATCH[self.0 as usize];
    }

    /// Transition after decoding a long rep.
    pub fn update_rep(&mut self) {
        self.0 = NEXT_AFTER_REP[self.0 as usize];
    }

    /// Transition after decoding a single-byte short rep.
    pub fn update_short_rep(&mut self) {
        self.0 = NEXT_AFTER_SHORT_REP[self.0 as usize];
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// LZMA stream parameters (lc, lp, pb).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaProperties {
    /// Literal context bits (0-8).
    pub lc: u32,
    /// Literal position bits (0-4).
    pub lp: u32,
    /// Position bits (0-4).
    pub pb: u32,
}

impl LzmaProperties {
    /// Create properties from explicit values, bounds-checked.
    pub fn new(lc: u32, lp: u32, pb: u32) -> Result<Self> {
        let props = Self { lc, lp, pb };
        props.validate()?;
        Ok(props)
    }

    /// Parse the packed properties byte (`(pb * 5 + lp) * 9 + lc`).
    pub fn from_byte(byte: u8) -> Result<Self> {
        let pb = u32::from(byte) / 45;
        let remaining = u32::from(byte) - pb * 45;
        let lp = remaining / 9;
        let lc = remaining - lp * 9;
        Self::new(lc, lp, pb)
    }

    /// Encode to the packed properties byte.
    pub fn to_byte(self) -> u8 {
        ((self.pb * 5 + self.lp) * 9 + self.lc) as u8
    }

    /// Bounds check per the format: lc <= 8, lp <= 4, pb <= 4.
    pub fn validate(self) -> Result<()> {
        if self.lc > 8 || self.lp > 4 || self.pb > 4 {
            return Err(IronArcError::invalid_header(format!(
                "LZMA properties out of range: lc={} lp={} pb={}",
                self.lc, self.lp, self.pb
            )));
        }
        Ok(())
    }

    /// Mask selecting the position state from the output position.
    pub fn pos_mask(self) -> u64 {
        (1 << self.pb) - 1
    }

    /// Number of position states.
    pub fn num_pos_states(self) -> usize {
        1 << self.pb
    }

    /// Number of literal probability sub-banks.
    pub fn num_literal_banks(self) -> usize {
        1 << (self.lc + self.lp)
    }
}

impl Default for LzmaProperties {
    fn default() -> Self {
        Self {
            lc: 3,
            lp: 0,
            pb: 2,
        }
    }
}

/// Match length decoder.
///
/// A ternary fallback models the empirical skew toward short lengths:
/// `choice = 0` selects a per-pos-state 3-bit tree (0-7), `choice2 = 0` a
/// per-pos-state 3-bit tree offset by 8, and the rest goes through one
/// shared 8-bit tree offset by 16.
#[derive(Debug, Clone)]
pub struct LengthModel {
    choice: u16,
    choice2: u16,
    low: [[u16; 1 << LEN_LOW_BITS]; POS_STATES_MAX],
    mid: [[u16; 1 << LEN_LOW_BITS]; POS_STATES_MAX],
    high: [u16; 1 << LEN_HIGH_BITS],
}

impl LengthModel {
    /// Create a fresh model with all counters at the midpoint.
    pub fn new() -> Self {
        Self {
            choice: PROB_INIT,
            choice2: PROB_INIT,
            low: [[PROB_INIT; 1 << LEN_LOW_BITS]; POS_STATES_MAX],
            mid: [[PROB_INIT; 1 << LEN_LOW_BITS]; POS_STATES_MAX],
            high: [PROB_INIT; 1 << LEN_HIGH_BITS],
        }
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Decode a zero-based match length (0-271). Callers add
    /// [`MATCH_LEN_MIN`] to obtain the absolute length.
    pub fn decode(&mut self, rc: &mut RangeDecoder<'_>, pos_state: usize) -> Result<u32> {
        if rc.decode_bit(&mut self.choice)? == 0 {
            rc.decode_tree(&mut self.low[pos_state], LEN_LOW_BITS, BitOrder::MsbFirst)
        } else if rc.decode_bit(&mut self.choice2)? == 0 {
            let len = rc.decode_tree(&mut self.mid[pos_state], LEN_LOW_BITS, BitOrder::MsbFirst)?;
            Ok(len + 8)
        } else {
            let len = rc.decode_tree(&mut self.high, LEN_HIGH_BITS, BitOrder::MsbFirst)?;
            Ok(len + 16)
        }
    }
}

impl Default for LengthModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Literal decoder.
///
/// One 0x300-counter sub-bank per `(position alignment, previous byte)`
/// context: 0x100 counters for the plain tree walk and two further banks
/// indexed by the match-byte bit for the matched-literal mode.
#[derive(Debug, Clone)]
pub struct LiteralModel {
    banks: Vec<[u16; 0x300]>,
    lc: u32,
    lp: u32,
}

impl LiteralModel {
    /// Create the sub-banks for the given properties.
    pub fn new(props: LzmaProperties) -> Self {
        Self {
            banks: vec![[PROB_INIT; 0x300]; props.num_literal_banks()],
            lc: props.lc,
            lp: props.lp,
        }
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        for bank in &mut self.banks {
            bank.fill(PROB_INIT);
        }
    }

    fn bank_index(&self, pos: u64, prev_byte: u8) -> usize {
        let lit_pos = (pos & ((1 << self.lp) - 1)) as usize;
        (lit_pos << self.lc) + ((prev_byte as usize) >> (8 - self.lc as usize))
    }

    /// Decode one literal byte.
    ///
    /// `match_byte` is the byte at the current `rep0` distance and enables
    /// the matched-literal mode: each decoded bit is conditioned on the
    /// corresponding match-byte bit until they first disagree, after which
    /// decoding falls back to the plain tree for the remaining bits.
    pub fn decode(
        &mut self,
        rc: &mut RangeDecoder<'_>,
        pos: u64,
        prev_byte: u8,
        match_byte: Option<u8>,
    ) -> Result<u8> {
        let index = self.bank_index(pos, prev_byte);
        let bank = &mut self.banks[index];
        let mut symbol = 1usize;

        if let Some(match_byte) = match_byte {
            let mut match_byte = match_byte as usize;
            while symbol < 0x100 {
                let match_bit = (match_byte >> 7) & 1;
                match_byte <<= 1;

                let bit = rc.decode_bit(&mut bank[0x100 + (match_bit << 8) + symbol])?;
                symbol = (symbol << 1) | bit as usize;

                if bit as usize != match_bit {
                    break;
                }
            }
        }

        while symbol < 0x100 {
            let bit = rc.decode_bit(&mut bank[symbol])?;
            symbol = (symbol << 1) | bit as usize;
        }

        Ok((symbol - 0x100) as u8)
    }
}

/// Match distance decoder.
///
/// A 6-bit slot (tree selected by a length bucket) encodes the distance
/// magnitude; small slots carry the trailing bits in per-slot reverse
/// trees, large slots in fixed-probability direct bits plus the shared
/// 4-bit aligned tree.
#[derive(Debug, Clone)]
pub struct DistanceModel {
    slot: [[u16; DIST_SLOTS]; LEN_TO_DIST_BUCKETS],
    special: [u16; FULL_DISTANCES - END_POS_MODEL_INDEX as usize + 1],
    align: [u16; DIST_ALIGN_SIZE],
}

impl DistanceModel {
    /// Create a fresh model with all counters at the midpoint.
    pub fn new() -> Self {
        Self {
            slot: [[PROB_INIT; DIST_SLOTS]; LEN_TO_DIST_BUCKETS],
            special: [PROB_INIT; FULL_DISTANCES - END_POS_MODEL_INDEX as usize + 1],
            align: [PROB_INIT; DIST_ALIGN_SIZE],
        }
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Decode a zero-based match distance given the zero-based match
    /// length. May return [`END_OF_STREAM_MARKER`].
    pub fn decode(&mut self, rc: &mut RangeDecoder<'_>, len: u32) -> Result<u32> {
        let bucket = (len as usize).min(LEN_TO_DIST_BUCKETS - 1);
        let slot = rc.decode_tree(&mut self.slot[bucket], 6, BitOrder::MsbFirst)?;

        if slot < 4 {
            return Ok(slot);
        }

        let num_direct = (slot >> 1) - 1;
        let mut dist = (2 | (slot & 1)) << num_direct;

        if slot < END_POS_MODEL_INDEX {
            // The special bank is shared by slots 4-13; each slot's reverse
            // tree starts at (base distance - slot).
            let base = (dist - slot) as usize;
            let tree = &mut self.special[base..base + (1 << num_direct)];
            dist += rc.decode_tree(tree, num_direct, BitOrder::LsbFirst)?;
        } else {
            dist += rc.decode_direct_bits(num_direct - DIST_ALIGN_BITS)? << DIST_ALIGN_BITS;
            dist += rc.decode_tree(&mut self.align, DIST_ALIGN_BITS, BitOrder::LsbFirst)?;
        }

        Ok(dist)
    }
}

impl Default for DistanceModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete LZMA probability model: every counter bank one stream needs.
#[derive(Debug, Clone)]
pub struct LzmaModel {
    /// Stream parameters.
    pub props: LzmaProperties,

    /// Symbol-class decision: literal vs match.
    pub is_match: [[u16; POS_STATES_MAX]; NUM_STATES],
    /// Plain match vs repeat.
    pub is_rep: [u16; NUM_STATES],
    /// Repeat of rep0 vs older distances.
    pub is_rep_g0: [u16; NUM_STATES],
    /// rep1 vs rep2/rep3.
    pub is_rep_g1: [u16; NUM_STATES],
    /// rep2 vs rep3.
    pub is_rep_g2: [u16; NUM_STATES],
    /// Single-byte short rep vs full-length rep0.
    pub is_rep0_long: [[u16; POS_STATES_MAX]; NUM_STATES],

    /// Length decoder for plain matches.
    pub match_len: LengthModel,
    /// Length decoder for repeats.
    pub rep_len: LengthModel,
    /// Literal decoder.
    pub literal: LiteralModel,
    /// Distance decoder.
    pub distance: DistanceModel,
}

impl LzmaModel {
    /// Create a fresh model for the given properties.
    pub fn new(props: LzmaProperties) -> Self {
        Self {
            props,
            is_match: [[PROB_INIT; POS_STATES_MAX]; NUM_STATES],
            is_rep: [PROB_INIT; NUM_STATES],
            is_rep_g0: [PROB_INIT; NUM_STATES],
            is_rep_g1: [PROB_INIT; NUM_STATES],
            is_rep_g2: [PROB_INIT; NUM_STATES],
            is_rep0_long: [[PROB_INIT; POS_STATES_MAX]; NUM_STATES],
            match_len: LengthModel::new(),
            rep_len: LengthModel::new(),
            literal: LiteralModel::new(props),
            distance: DistanceModel::new(),
        }
    }

    /// Reset every counter to its initial value, keeping the properties.
    pub fn reset(&mut self) {
        for bank in &mut self.is_match {
            bank.fill(PROB_INIT);
        }
        self.is_rep.fill(PROB_INIT);
        self.is_rep_g0.fill(PROB_INIT);
        self.is_rep_g1.fill(PROB_INIT);
        self.is_rep_g2.fill(PROB_INIT);
        for bank in &mut self.is_rep0_long {
            bank.fill(PROB_INIT);
        }
        self.match_len.reset();
        self.rep_len.reset();
        self.literal.reset();
        self.distance.reset();
    }
}
