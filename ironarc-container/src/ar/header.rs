//! AR member header parsing and writing.

use ironarc_core::bytes::ByteReader;
use ironarc_core::error::{IronArcError, Result};

/// Archive signature at offset zero.
pub const AR_SIGNATURE: &[u8; 8] = b"!<arch>\n";

/// Fixed member header size.
pub const HEADER_SIZE: usize = 60;

/// Header terminator bytes.
const HEADER_END: &[u8; 2] = b"`\n";

/// Prefix marking a BSD 4.4 extended name ("#1/<len>", name stored at the
/// start of the member data).
const BSD44_NAME_PREFIX: &str = "#1/";

/// Parsed AR member header.
///
/// All numeric fields are ASCII in the file (decimal except the octal
/// mode) and may be blank, which historical tools emit for special
/// members.
#[derive(Debug, Clone)]
pub struct ArHeader {
    /// Member name. Empty until resolved when the name is stored in the
    /// data area ([`Self::extended_name_len`] is nonzero).
    pub name: String,
    /// Modification time as seconds since the Unix epoch.
    pub mtime: Option<u64>,
    /// Owner user ID.
    pub uid: Option<u32>,
    /// Owner group ID.
    pub gid: Option<u32>,
    /// Unix mode bits.
    pub mode: Option<u32>,
    /// Size of the data area, including any extended name it starts with.
    pub size: usize,
    /// Length of the extended name at the start of the data area, zero for
    /// plain names.
    pub extended_name_len: usize,
}

impl ArHeader {
    /// Read one 60-byte member header.
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let offset = reader.offset() as u64;
        let block = reader.read_bytes(HEADER_SIZE)?;
        if &block[58..60] != HEADER_END {
            return Err(IronArcError::corrupted(
                offset,
                "AR member header missing its terminator",
            ));
        }

        let raw_name = field_str(&block[0..16], offset)?;
        let (name, extended_name_len) = if let Some(len) = raw_name.strip_prefix(BSD44_NAME_PREFIX)
        {
            let len = len.parse::<usize>().map_err(|_| {
                IronArcError::corrupted(offset, format!("invalid extended name length {len:?}"))
            })?;
            (String::new(), len)
        } else {
            (raw_name.to_string(), 0)
        };

        let header = Self {
            name,
            mtime: parse_decimal(&block[16..28], offset)?,
            uid: parse_decimal(&block[28..34], offset)?.map(|v| v as u32),
            gid: parse_decimal(&block[34..40], offset)?.map(|v| v as u32),
            mode: parse_octal(&block[40..48], offset)?,
            size: parse_decimal(&block[48..58], offset)?.ok_or_else(|| {
                IronArcError::corrupted(offset, "AR member header has no size field")
            })? as usize,
            extended_name_len,
        };
        if header.extended_name_len > header.size {
            return Err(IronArcError::corrupted(
                offset,
                "extended name longer than the member data",
            ));
        }
        Ok(header)
    }

    /// Write a 60-byte member header. `data_size` is the full data-area
    /// size, extended name included.
    pub fn write(out: &mut Vec<u8>, name_field: &str, entry: &HeaderFields, data_size: usize) {
        push_field(out, name_field, 16);
        push_field(out, &entry.mtime.unwrap_or(0).to_string(), 12);
        push_field(out, &entry.uid.unwrap_or(0).to_string(), 6);
        push_field(out, &entry.gid.unwrap_or(0).to_string(), 6);
        push_field(out, &format!("{:o}", entry.mode.unwrap_or(0o644)), 8);
        push_field(out, &data_size.to_string(), 10);
        out.extend_from_slice(HEADER_END);
    }
}

/// Metadata fields a writer places into a member header.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderFields {
    /// Modification time.
    pub mtime: Option<u64>,
    /// Owner user ID.
    pub uid: Option<u32>,
    /// Owner group ID.
    pub gid: Option<u32>,
    /// Unix mode bits.
    pub mode: Option<u32>,
}

fn field_str(bytes: &[u8], offset: u64) -> Result<&str> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| IronArcError::corrupted(offset, "non-ASCII bytes in AR header field"))?;
    Ok(text.trim_end_matches(' '))
}

fn parse_decimal(bytes: &[u8], offset: u64) -> Result<Option<u64>> {
    let text = field_str(bytes, offset)?;
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u64>()
        .map(Some)
        .map_err(|_| IronArcError::corrupted(offset, format!("invalid decimal field {text:?}")))
}

fn parse_octal(bytes: &[u8], offset: u64) -> Result<Option<u32>> {
    let text = field_str(bytes, offset)?;
    if text.is_empty() {
        return Ok(None);
    }
    u32::from_str_radix(text, 8)
        .map(Some)
        .map_err(|_| IronArcError::corrupted(offset, format!("invalid octal field {text:?}")))
}

fn push_field(out: &mut Vec<u8>, value: &str, width: usize) {
    out.extend_from_slice(value.as_bytes());
    for _ in value.len()..width {
        out.push(b' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Vec<u8> {
        let mut block = Vec::new();
        push_field(&mut block, "hello.txt", 16);
        push_field(&mut block, "1700000000", 12);
        push_field(&mut block, "1000", 6);
        push_field(&mut block, "1000", 6);
        push_field(&mut block, "100644", 8);
        push_field(&mut block, "13", 10);
        block.extend_from_slice(HEADER_END);
        block
    }

    #[test]
    fn test_parse_plain_header() {
        let block = sample_header();
        let header = ArHeader::read(&mut ByteReader::new(&block)).unwrap();
        assert_eq!(header.name, "hello.txt");
        assert_eq!(header.mtime, Some(1_700_000_000));
        assert_eq!(header.mode, Some(0o100644));
        assert_eq!(header.size, 13);
        assert_eq!(header.extended_name_len, 0);
    }

    #[test]
    fn test_parse_extended_name_header() {
        let mut block = sample_header();
        block[0..16].copy_from_slice(b"#1/24           ");
        block[48..58].copy_from_slice(b"37        ");
        let header = ArHeader::read(&mut ByteReader::new(&block)).unwrap();
        assert_eq!(header.extended_name_len, 24);
        assert_eq!(header.size, 37);
        assert!(header.name.is_empty());
    }

    #[test]
    fn test_blank_numeric_fields() {
        let mut block = sample_header();
        block[16..28].fill(b' ');
        block[28..34].fill(b' ');
        let header = ArHeader::read(&mut ByteReader::new(&block)).unwrap();
        assert_eq!(header.mtime, None);
        assert_eq!(header.uid, None);
    }

    #[test]
    fn test_missing_terminator() {
        let mut block = sample_header();
        block[58] = b'x';
        let err = ArHeader::read(&mut ByteReader::new(&block)).unwrap_err();
        assert!(matches!(err, IronArcError::CorruptedData { offset: 0, .. }));
    }

    #[test]
    fn test_extended_name_cannot_exceed_data() {
        let mut block = sample_header();
        block[0..16].copy_from_slice(b"#1/99           ");
        let err = ArHeader::read(&mut ByteReader::new(&block)).unwrap_err();
        assert!(matches!(err, IronArcError::CorruptedData { .. }));
    }
}
