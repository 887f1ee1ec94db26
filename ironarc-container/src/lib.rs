//! # IronArc Container
//!
//! Container format support for IronArc.
//!
//! This crate provides reading and writing of the container formats that
//! sit above the codec layer:
//!
//! - **AR**: the Unix archiver format used by static libraries and `.deb`
//!   packages, including BSD 4.4 extended names
//! - **LZMA**: standalone `.lzma` single-file compression
//!
//! ## Example
//!
//! ```rust
//! use ironarc_container::ar::{ArWriter, read_archive};
//! use ironarc_core::Entry;
//!
//! let mut writer = ArWriter::new();
//! writer.add(&Entry::new("greeting", 5), b"hello");
//! let archive = writer.finish();
//!
//! let members = read_archive(&archive).unwrap();
//! assert_eq!(members[0].0.name, "greeting");
//! assert_eq!(members[0].1, b"hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod ar;
pub mod lzma_file;

// Re-exports
pub use ar::{ArFormat, ArReader, ArWriter};
pub use lzma_file::LzmaFileInfo;
