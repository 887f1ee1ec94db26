//! # IronArc Core
//!
//! Core components for the IronArc compression/archive library.
//!
//! This crate provides the fundamental building blocks shared by the codec
//! and container crates:
//!
//! - [`bytes`]: sequential byte cursor over in-memory input
//! - [`entry`]: container entry metadata
//! - [`error`]: the workspace error taxonomy
//!
//! ## Architecture
//!
//! IronArc is designed as a layered stack:
//!
//! ```text
//! +---------------------------------------------------+
//! | Container: AR archives, .lzma single-file framing |
//! +---------------------------------------------------+
//! | Codec: the LZMA/LZMA2 decompression engine        |
//! +---------------------------------------------------+
//! | Core (this crate): ByteReader, Entry, errors      |
//! +---------------------------------------------------+
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ironarc_core::bytes::ByteReader;
//!
//! let mut reader = ByteReader::new(&[0x5D, 0x00, 0x00, 0x01, 0x00]);
//! let props = reader.read_u8().unwrap();
//! let dict_size = reader.read_u32_le().unwrap();
//! assert_eq!(props, 0x5D);
//! assert_eq!(dict_size, 0x0001_0000);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bytes;
pub mod entry;
pub mod error;

// Re-exports for convenience
pub use bytes::ByteReader;
pub use entry::{Entry, EntryType, FileAttributes};
pub use error::{IronArcError, Result};
