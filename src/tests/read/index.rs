// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::dsig::RawDigitalSignature;
use crate::core::edf::{ExtensibleDataField, INFO_ZIP_UNICODE_PATH};
use crate::core::ARCHIVE_EXTRA_DATA_SIGNATURE;
use crate::error::ZipError;
use crate::tests::fixture::{ArchiveBuilder, FixtureEntry};
use crate::tests::init_logger;
use crate::{Archive, StringEncoding};

use futures_lite::io::AsyncReadExt;

/// Builds an Info-ZIP Unicode Path extra field, where `crc32` is that of the raw name it replaces.
fn unicode_path(crc32: u32, unicode: &str) -> Vec<u8> {
    let mut data = vec![1];
    data.extend_from_slice(&crc32.to_le_bytes());
    data.extend_from_slice(unicode.as_bytes());

    ExtensibleDataField { header_id: INFO_ZIP_UNICODE_PATH, data: &data }.encode()
}

#[tokio::test]
async fn index_preserves_directory_order() {
    init_logger();

    let built = ArchiveBuilder::new()
        .stored("b.txt", b"second")
        .stored("dir/", b"")
        .entry(FixtureEntry::stored("a.txt", b"first").comment(b"note"))
        .comment(b"archive comment")
        .build();

    let archive = Archive::open(built.cursor()).await.unwrap();
    let names: Vec<_> = archive.entries().iter().map(|entry| entry.filename().as_str().unwrap().to_owned()).collect();

    assert_eq!(names, ["b.txt", "dir/", "a.txt"]);
    assert_eq!(archive.comment().as_str().unwrap(), "archive comment");
    assert_eq!(archive.index().directory(), built.directory..built.eocdr);

    let entry = archive.entry(2).unwrap();
    assert_eq!(entry.comment().as_str().unwrap(), "note");
    assert_eq!(entry.compressed_size(), 5);
    assert_eq!(entry.uncompressed_size(), 5);
    assert_eq!(entry.crc32(), crc32fast::hash(b"first"));
    assert_eq!(entry.local_header_offset(), built.local_headers[2]);
    assert_eq!(entry.version_made_by(), 0x031E);
    assert_eq!(entry.external_file_attribute(), 0o100644 << 16);
    assert_eq!(entry.last_modification_date().year(), 2024);
    assert!(!entry.is_dir());
    assert!(!entry.is_streamed());
    assert!(!entry.zip64());
    assert!(entry.defect().is_none());

    assert!(archive.entry(1).unwrap().is_dir());
    assert!(matches!(archive.entry(3), Err(ZipError::EntryIndexOutOfBounds)));
}

#[tokio::test]
async fn index_keeps_duplicate_names() {
    init_logger();

    let built = ArchiveBuilder::new().stored("same.txt", b"first").stored("same.txt", b"second").build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.entries().len(), 2);

    let found = archive.find("same.txt").cloned().unwrap();
    assert_eq!(&found, archive.entry(0).unwrap());
    assert!(archive.find("missing.txt").is_none());

    let mut data = Vec::new();
    archive.open_payload(&found).await.unwrap().read_to_end(&mut data).await.unwrap();
    assert_eq!(data, b"first");

    let second = archive.entry(1).unwrap().clone();
    let mut data = Vec::new();
    archive.open_payload(&second).await.unwrap().read_to_end(&mut data).await.unwrap();
    assert_eq!(data, b"second");
}

#[tokio::test]
async fn index_truncated_central_directory() {
    init_logger();

    let built =
        ArchiveBuilder::new().stored("a", b"1").stored("b", b"2").stored("c", b"3").declared_entries(5).build();

    match Archive::open(built.cursor()).await {
        Err(ZipError::TruncatedCentralDirectory { declared, found }) => {
            assert_eq!(declared, 5);
            assert_eq!(found, 3);
        }
        Err(err) => panic!("expected a truncated central directory, got {err:?}"),
        Ok(_) => panic!("expected a truncated central directory"),
    }
}

#[tokio::test]
async fn index_encrypted_central_directory() {
    init_logger();

    let mut built = ArchiveBuilder::new().stored("a.txt", b"abc").build();
    let directory = built.directory;
    built.patch(directory, &ARCHIVE_EXTRA_DATA_SIGNATURE.to_le_bytes());

    assert!(matches!(Archive::open(built.cursor()).await, Err(ZipError::Unsupported(_))));
}

#[tokio::test]
async fn index_skips_digital_signature() {
    init_logger();

    let mut built = ArchiveBuilder::new().stored("a.txt", b"abc").build();
    let signature = RawDigitalSignature { size_of_data: 0 }.encode();
    let size_of_cd = (built.eocdr - built.directory) as u32 + signature.len() as u32;

    let eocdr = built.eocdr as usize;
    built.bytes.splice(eocdr..eocdr, signature.iter().copied());
    built.patch(eocdr as u64 + signature.len() as u64 + 12, &size_of_cd.to_le_bytes());

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.entries().len(), 1);
    assert_eq!(archive.index().directory(), built.directory..built.directory + size_of_cd as u64);

    let entry = archive.entries()[0].clone();
    let mut data = Vec::new();
    archive.open_payload(&entry).await.unwrap().read_to_end(&mut data).await.unwrap();
    assert_eq!(data, b"abc");
}

#[tokio::test]
async fn index_unicode_path_extra_field() {
    init_logger();

    let raw = vec![0x82, 0xA0];
    let verified = FixtureEntry {
        name: raw.clone(),
        extra: unicode_path(crc32fast::hash(&raw), "あ"),
        ..FixtureEntry::stored("", b"abc")
    };
    let stale = FixtureEntry { name: raw.clone(), extra: unicode_path(0xDEADBEEF, "あ"), ..verified.clone() };

    let built = ArchiveBuilder::new().entry(verified).entry(stale).build();
    let mut archive = Archive::open(built.cursor()).await.unwrap();

    let entry = archive.entry(0).unwrap().clone();
    assert_eq!(entry.filename().encoding(), StringEncoding::Raw);
    assert_eq!(entry.filename().as_bytes(), &raw[..]);
    assert_eq!(entry.filename().alternative(), Some("あ"));
    assert_eq!(entry.filename().as_str().unwrap(), "あ");
    assert_eq!(archive.find("あ"), Some(&entry));

    // A CRC over different bytes means the extra field describes an older name.
    let entry = archive.entry(1).unwrap();
    assert_eq!(entry.filename().alternative(), None);
    assert!(matches!(entry.filename().as_str(), Err(ZipError::StringNotUtf8)));

    let entry = archive.entry(0).unwrap().clone();
    archive.resolve(&entry).await.unwrap();
}

#[tokio::test]
async fn index_utf8_flag() {
    init_logger();

    let entry = FixtureEntry::stored("ünïcödé.txt", b"abc").flags(crate::GeneralPurposeFlags::UTF8);
    let built = ArchiveBuilder::new().entry(entry).build();

    let archive = Archive::open(built.cursor()).await.unwrap();
    let entry = archive.entry(0).unwrap();

    assert!(entry.flags().utf8());
    assert_eq!(entry.filename().encoding(), StringEncoding::Utf8);
    assert_eq!(entry.filename().as_str().unwrap(), "ünïcödé.txt");
}
