//! End-to-end container tests: AR archives carrying compressed members.

use ironarc_container::ar::{ArFormat, ArWriter, detect_format, list_entries, read_archive};
use ironarc_container::lzma_file;
use ironarc_core::Entry;

// "Hello, Hello, Hello, World!" as a marker-terminated .lzma file
// (liblzma, lc=3 lp=0 pb=2, 64 KiB dictionary).
const LZMA_HELLO: [u8; 38] = [
    0x5D, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x00, 0x24, 0x19, 0x49, 0x98, 0x6F, 0x16, 0x02, 0xA6, 0xFD, 0x66,
    0x86, 0xBC, 0x55, 0x9A, 0x34, 0xA4, 0x93, 0xB7, 0xFF, 0xFF, 0xD5, 0x34,
    0x00, 0x00,
];

fn entry(name: &str, mtime: u64, mode: u32, size: usize) -> Entry {
    let mut entry = Entry::new(name, size as u64);
    entry.mtime = Some(mtime);
    entry.attributes.unix_mode = Some(mode);
    entry.attributes.uid = Some(0);
    entry.attributes.gid = Some(0);
    entry
}

#[test]
fn test_deb_shaped_archive() {
    // A .deb is an AR archive whose first member is "debian-binary".
    let mut writer = ArWriter::new();
    writer.add(&entry("debian-binary", 1_700_000_000, 0o644, 4), b"2.0\n");
    writer.add(
        &entry("control.tar.lzma", 1_700_000_000, 0o644, LZMA_HELLO.len()),
        &LZMA_HELLO,
    );
    let archive = writer.finish();

    let names: Vec<String> = list_entries(&archive)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, ["debian-binary", "control.tar.lzma"]);

    let members = read_archive(&archive).unwrap();
    assert_eq!(members[0].1, b"2.0\n");

    // The second member is itself a .lzma file; unpack it through the
    // codec layer.
    let unpacked = lzma_file::unpack(&members[1].1).unwrap();
    assert_eq!(unpacked, b"Hello, Hello, Hello, World!");
}

#[test]
fn test_mixed_name_lengths_and_metadata() {
    let long_name = "usr/lib/libsomething-very-long.a";
    let mut writer = ArWriter::new();
    writer.add(&entry("short", 1, 0o755, 3), b"abc");
    writer.add(&entry(long_name, 2, 0o400, 5), b"xyzzy");
    let archive = writer.finish();

    assert_eq!(detect_format(&archive).unwrap(), ArFormat::Bsd44);

    let members = read_archive(&archive).unwrap();
    assert_eq!(members[0].0.name, "short");
    assert_eq!(members[0].0.attributes.unix_mode, Some(0o755));
    assert_eq!(members[1].0.name, long_name);
    assert_eq!(members[1].0.size, 5);
    assert_eq!(members[1].1, b"xyzzy");
    assert!(members[1].0.attributes.is_readonly());
}

#[test]
fn test_many_members() {
    let mut writer = ArWriter::new();
    for i in 0..50 {
        let data = format!("member number {i}");
        writer.add(&entry(&format!("m{i}"), i, 0o644, data.len()), data.as_bytes());
    }
    let archive = writer.finish();

    let members = read_archive(&archive).unwrap();
    assert_eq!(members.len(), 50);
    assert_eq!(members[17].0.name, "m17");
    assert_eq!(members[17].1, b"member number 17");
}
