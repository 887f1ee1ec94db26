//! AR (Unix archiver) container support.
//!
//! AR is the flat, uncompressed container used by static libraries and
//! Debian packages: a signature, then a sequence of members, each a 60-byte
//! ASCII header followed by the member data, padded to 2-byte alignment.
//!
//! Two BSD dialects are handled: plain headers carry the name in the
//! 16-byte name field, and the BSD 4.4 extension (`#1/<len>`) stores longer
//! names at the start of the member data.

mod header;

pub use header::{AR_SIGNATURE, ArHeader, HEADER_SIZE, HeaderFields};

use ironarc_core::bytes::ByteReader;
use ironarc_core::error::{IronArcError, Result};
use ironarc_core::{Entry, FileAttributes};

/// AR dialect of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArFormat {
    /// Plain headers only.
    Bsd,
    /// At least one member uses a `#1/` extended name.
    Bsd44,
}

/// Streaming AR reader over an in-memory archive.
#[derive(Debug)]
pub struct ArReader<'a> {
    reader: ByteReader<'a>,
    format: ArFormat,
}

impl<'a> ArReader<'a> {
    /// Open an archive, validating the signature.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let signature = reader.read_bytes(AR_SIGNATURE.len())?;
        if signature != AR_SIGNATURE {
            return Err(IronArcError::invalid_header(
                "missing AR archive signature",
            ));
        }
        Ok(Self {
            reader,
            format: ArFormat::Bsd,
        })
    }

    /// Dialect observed so far; final once the whole archive has been
    /// walked.
    pub fn format(&self) -> ArFormat {
        self.format
    }

    /// Read the next member, or `None` at the end of the archive.
    pub fn next_entry(&mut self) -> Result<Option<(Entry, &'a [u8])>> {
        if self.reader.is_empty() {
            return Ok(None);
        }

        let header = ArHeader::read(&mut self.reader)?;
        let data = self.reader.read_bytes(header.size)?;
        if header.size % 2 == 1 && !self.reader.is_empty() {
            self.reader.skip(1)?;
        }

        let (name, data) = if header.extended_name_len > 0 {
            self.format = ArFormat::Bsd44;
            let (name_bytes, data) = data.split_at(header.extended_name_len);
            let name = std::str::from_utf8(name_bytes)
                .map_err(|_| {
                    IronArcError::corrupted(
                        self.reader.offset() as u64,
                        "non-UTF-8 extended member name",
                    )
                })?
                .trim_end_matches('\0');
            (name.to_string(), data)
        } else {
            (header.name, data)
        };

        let mut entry = Entry::new(name, data.len() as u64);
        entry.mtime = header.mtime;
        entry.attributes = FileAttributes {
            unix_mode: header.mode,
            uid: header.uid,
            gid: header.gid,
        };
        Ok(Some((entry, data)))
    }
}

/// Read all members of an archive.
pub fn read_archive(data: &[u8]) -> Result<Vec<(Entry, Vec<u8>)>> {
    let mut reader = ArReader::new(data)?;
    let mut entries = Vec::new();
    while let Some((entry, data)) = reader.next_entry()? {
        entries.push((entry, data.to_vec()));
    }
    Ok(entries)
}

/// List member metadata without copying any data.
pub fn list_entries(data: &[u8]) -> Result<Vec<Entry>> {
    let mut reader = ArReader::new(data)?;
    let mut entries = Vec::new();
    while let Some((entry, _)) = reader.next_entry()? {
        entries.push(entry);
    }
    Ok(entries)
}

/// Determine the dialect of an archive by walking all member headers.
pub fn detect_format(data: &[u8]) -> Result<ArFormat> {
    let mut reader = ArReader::new(data)?;
    while reader.next_entry()?.is_some() {}
    Ok(reader.format())
}

/// AR archive writer.
///
/// Members whose names fit the 16-byte field (and contain no spaces) get
/// plain headers; everything else uses the BSD 4.4 extended form.
#[derive(Debug)]
pub struct ArWriter {
    out: Vec<u8>,
}

impl ArWriter {
    /// Start a new archive.
    pub fn new() -> Self {
        Self {
            out: AR_SIGNATURE.to_vec(),
        }
    }

    /// Append one member.
    pub fn add(&mut self, entry: &Entry, data: &[u8]) {
        let fields = HeaderFields {
            mtime: entry.mtime,
            uid: entry.attributes.uid,
            gid: entry.attributes.gid,
            mode: entry.attributes.unix_mode,
        };

        let plain = entry.name.len() <= 16 && !entry.name.contains(' ');
        if plain {
            ArHeader::write(&mut self.out, &entry.name, &fields, data.len());
        } else {
            let name_field = format!("#1/{}", entry.name.len());
            ArHeader::write(&mut self.out, &name_field, &fields, entry.name.len() + data.len());
            self.out.extend_from_slice(entry.name.as_bytes());
        }
        self.out.extend_from_slice(data);
        if self.out.len() % 2 == 1 {
            self.out.push(b'\n');
        }
    }

    /// Finish and return the archive bytes.
    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

impl Default for ArWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an archive from entries in one call.
pub fn create_archive(members: &[(Entry, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ArWriter::new();
    for (entry, data) in members {
        writer.add(entry, data);
    }
    writer.finish()
}
