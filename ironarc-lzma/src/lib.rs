//! # IronArc LZMA
//!
//! LZMA and LZMA2 decompression for the IronArc library.
//!
//! LZMA combines LZ77 match/literal parsing with a binary range coder over
//! adaptive probability models. This crate implements the decoding side:
//!
//! - [`rangecoder`]: the binary range decoder and bit-tree primitives
//! - [`model`]: probability banks, the literal/length/distance decoders,
//!   and the 12-state symbol state machine
//! - [`window`]: the sliding output window match copies read from
//! - [`decoder`]: the symbol loop and the standalone `.lzma` header
//! - [`lzma2`]: the chunked LZMA2 layer used by `.xz` and `.7z`
//!
//! ## Example
//!
//! ```rust
//! // A standalone .lzma stream holding the single byte "A".
//! let data = [
//!     0x5D, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
//!     0xFF, 0xFF, 0x00, 0x20, 0xC1, 0xFB, 0xFF, 0xFF, 0xFF, 0xE0, 0x00,
//!     0x00, 0x00,
//! ];
//! let decoded = ironarc_lzma::decompress(&data).unwrap();
//! assert_eq!(decoded, b"A");
//! ```
//!
//! Compression is not implemented; streams produced by any conforming
//! encoder decode here.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decoder;
pub mod lzma2;
pub mod model;
pub mod rangecoder;
pub mod window;

pub use decoder::LzmaDecoder;
pub use lzma2::{Lzma2Decoder, dict_size_from_props};
pub use model::LzmaProperties;

use ironarc_core::error::Result;

/// Decompress a standalone `.lzma` stream (13-byte header plus range-coded
/// data).
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    LzmaDecoder::from_header(data)?.decompress()
}

/// Decompress headerless LZMA data with explicit parameters.
///
/// `unpacked_size` of `None` decodes until the end-of-stream marker.
pub fn decompress_raw(
    data: &[u8],
    props: LzmaProperties,
    dict_size: u32,
    unpacked_size: Option<u64>,
) -> Result<Vec<u8>> {
    LzmaDecoder::new(data, props, dict_size, unpacked_size)?.decompress()
}

/// Decompress an LZMA2 chunk sequence.
pub fn decode_lzma2(data: &[u8], dict_size: u32) -> Result<Vec<u8>> {
    Lzma2Decoder::new(dict_size).decompress(data)
}
