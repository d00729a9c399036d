// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::eocdr::RawEndOfCentralDirectoryRecord;
use crate::cursor::reverse_search_buffer;
use crate::error::ZipError;
use crate::tests::fixture::ArchiveBuilder;
use crate::tests::init_logger;
use crate::Archive;

use futures_lite::io::{AsyncReadExt, Cursor};

#[test]
fn search_one_byte_test() {
    let buffer: &[u8] = &[0x0, 0x0, 0x0, 0x0, 0x0, 0x0];
    let signature: &[u8] = &[0x1];

    let matched = reverse_search_buffer(buffer, signature);
    assert!(matched.is_none());

    let buffer: &[u8] = &[0x2, 0x1, 0x0, 0x0, 0x0, 0x0];
    let signature: &[u8] = &[0x1];

    let matched = reverse_search_buffer(buffer, signature);
    assert_eq!(matched, Some(1));
}

#[test]
fn search_returns_start_of_last_match() {
    let buffer: &[u8] = b"PK\x05\x06xxPK\x05\x06yy";
    assert_eq!(reverse_search_buffer(buffer, b"PK\x05\x06"), Some(6));
    assert_eq!(reverse_search_buffer(&buffer[..9], b"PK\x05\x06"), Some(0));
    assert_eq!(reverse_search_buffer(b"K\x05\x06", b"PK\x05\x06"), None);
}

#[tokio::test]
async fn locator_empty_test() {
    init_logger();

    let built = ArchiveBuilder::new().build();
    assert_eq!(built.bytes.len(), RawEndOfCentralDirectoryRecord::LENGTH);

    let archive = Archive::open(built.cursor()).await.unwrap();
    assert!(archive.is_empty());
    assert!(!archive.zip64());
    assert_eq!(archive.base_offset(), 0);
    assert_eq!(archive.index().directory(), 0..0);
}

#[tokio::test]
async fn locator_empty_max_comment_test() {
    init_logger();

    let comment = vec![b'c'; u16::MAX as usize];
    let built = ArchiveBuilder::new().stored("a.txt", b"a").comment(&comment).build();

    let archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.entries().len(), 1);
    assert_eq!(archive.comment().as_bytes(), &comment[..]);
}

#[tokio::test]
async fn locator_rejects_signature_within_comment() {
    init_logger();

    // A complete record whose declared comment overruns the source.
    let fake = RawEndOfCentralDirectoryRecord { zip_file_comment_length: 500, ..Default::default() }.encode();
    let mut comment = b"before ".to_vec();
    comment.extend(fake);

    let built = ArchiveBuilder::new().stored("a.txt", b"abc").comment(&comment).build();

    let archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.entries().len(), 1);
    assert_eq!(archive.comment().as_bytes(), &comment[..]);
}

#[tokio::test]
async fn locator_rejects_fitting_record_within_comment() {
    init_logger();

    // An empty record which fits exactly at the end of the comment, and so of the source.
    let mut comment = b"note ".to_vec();
    comment.extend(RawEndOfCentralDirectoryRecord::default().encode());

    let built = ArchiveBuilder::new().stored("a.txt", b"abc").stored("b.txt", b"defg").comment(&comment).build();

    let archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.entries().len(), 2);
    assert_eq!(archive.base_offset(), 0);
    assert_eq!(archive.comment().as_bytes(), &comment[..]);
}

#[tokio::test]
async fn locator_tolerates_trailing_junk() {
    init_logger();

    let built = ArchiveBuilder::new().stored("a.txt", b"abc").suffix(&[0xA5; 10 * 1024]).build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    let entry = archive.entries()[0].clone();

    let mut data = Vec::new();
    archive.open_payload(&entry).await.unwrap().read_to_end(&mut data).await.unwrap();
    assert_eq!(data, b"abc");
}

#[tokio::test]
async fn locator_not_a_zip() {
    init_logger();

    let sources = [
        Vec::new(),
        vec![0; RawEndOfCentralDirectoryRecord::LENGTH - 1],
        (0..4096).map(|i| (i * 7 % 251) as u8).collect(),
    ];

    for source in sources {
        let length = source.len();
        match Archive::open(Cursor::new(source)).await {
            Err(ZipError::NotAZipArchive) => (),
            Err(err) => panic!("expected a non-archive for {length} bytes, got {err:?}"),
            Ok(_) => panic!("expected a non-archive for {length} bytes"),
        }
    }
}

#[tokio::test]
async fn locator_sentinel_without_zip64_records() {
    init_logger();

    let mut built = ArchiveBuilder::new().stored("a.txt", b"abc").build();
    let eocdr = built.eocdr;
    built.patch(eocdr + 8, &[0xFF, 0xFF, 0xFF, 0xFF]);

    assert!(matches!(Archive::open(built.cursor()).await, Err(ZipError::Malformed(_))));
}

#[tokio::test]
async fn locator_spanned_archive() {
    init_logger();

    let mut built = ArchiveBuilder::new().stored("a.txt", b"abc").build();
    let eocdr = built.eocdr;
    built.patch(eocdr + 4, &1u16.to_le_bytes());

    assert!(matches!(Archive::open(built.cursor()).await, Err(ZipError::Unsupported(_))));
}

#[tokio::test]
async fn locator_self_extracting_prefix() {
    init_logger();

    let built = ArchiveBuilder::new().prefix(&[0x4D; 1000]).stored("a.txt", b"abc").stored("b.txt", b"defg").build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.base_offset(), 1000);
    assert_eq!(archive.entries()[0].local_header_offset(), 0);

    let entries = archive.entries().to_vec();
    for (entry, expected) in entries.iter().zip([&b"abc"[..], &b"defg"[..]]) {
        let payload = archive.resolve(entry).await.unwrap();
        assert!(payload.data_offset() > 1000);

        let mut data = Vec::new();
        archive.open_payload(entry).await.unwrap().read_to_end(&mut data).await.unwrap();
        assert_eq!(data, expected);
    }
}

#[tokio::test]
async fn locator_zip64_self_extracting_prefix() {
    init_logger();

    let built = ArchiveBuilder::new().prefix(&[0x4D; 500]).stored("a.txt", b"abc").zip64_trailer().build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    assert!(archive.zip64());
    assert_eq!(archive.base_offset(), 500);

    let entry = archive.entries()[0].clone();
    let mut data = Vec::new();
    archive.open_payload(&entry).await.unwrap().read_to_end(&mut data).await.unwrap();
    assert_eq!(data, b"abc");
}

#[tokio::test]
async fn locator_padded_directory() {
    init_logger();

    let mut built = ArchiveBuilder::new().stored("a.txt", b"abc").stored("b.txt", b"defg").build();

    // Padding between the directory and its trailer shifts the trailer without any prefix.
    let eocdr = built.eocdr as usize;
    built.bytes.splice(eocdr..eocdr, [0; 16]);

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.base_offset(), 0);
    assert_eq!(archive.entries().len(), 2);

    let entries = archive.entries().to_vec();
    for (entry, expected) in entries.iter().zip([&b"abc"[..], &b"defg"[..]]) {
        let mut data = Vec::new();
        archive.open_payload(entry).await.unwrap().read_to_end(&mut data).await.unwrap();
        assert_eq!(data, expected);
    }
}

#[tokio::test]
async fn locator_directory_declared_beyond_trailer() {
    init_logger();

    let mut built = ArchiveBuilder::new().stored("a.txt", b"abc").build();
    let eocdr = built.eocdr;
    let directory = built.directory as u32;
    built.patch(eocdr + 16, &(directory + 2).to_le_bytes());

    assert!(matches!(Archive::open(built.cursor()).await, Err(ZipError::Malformed(_))));
}
