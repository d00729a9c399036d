// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// Copyright (c) 2023 Cognite AS
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;
use crate::tests::fixture::{ArchiveBuilder, Descriptor, FixtureEntry};
use crate::tests::init_logger;
use crate::{Archive, SizeResolution, SizeSource};

use futures_lite::io::AsyncReadExt;

const ZIP64_ZIP_CONTENTS: &str = "Hello World!\n";

/// Tests an archive with more entries than the end of central directory record can count.
#[tokio::test]
async fn test_read_zip64_entry_count() {
    init_logger();

    let mut builder = ArchiveBuilder::new().zip64_trailer();
    for index in 0..70_000 {
        builder = builder.stored(&format!("{index}.txt"), b"");
    }
    let built = builder.build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    assert!(archive.zip64());
    assert_eq!(archive.entries().len(), 70_000);
    assert_eq!(archive.entry(69_999).unwrap().filename().as_str().unwrap(), "69999.txt");

    let last = archive.entry(69_999).unwrap().clone();
    assert_eq!(archive.resolve(&last).await.unwrap().data_offset(), built.data_offsets[69_999]);
}

/// Tests reading an entry whose sizes and offset were deferred to its Zip64 extra fields.
#[tokio::test]
async fn test_read_zip64_entry() {
    init_logger();

    let built = ArchiveBuilder::new()
        .stored("-", b"padding")
        .entry(FixtureEntry::stored("zip64", ZIP64_ZIP_CONTENTS.as_bytes()).zip64())
        .zip64_trailer()
        .build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    let entry = archive.entry(1).unwrap().clone();

    assert!(entry.zip64());
    assert_eq!(entry.compressed_size(), ZIP64_ZIP_CONTENTS.len() as u64);
    assert_eq!(entry.uncompressed_size(), ZIP64_ZIP_CONTENTS.len() as u64);
    assert_eq!(entry.local_header_offset(), built.local_headers[1]);

    let mut read_data = String::new();
    archive.open_payload(&entry).await.unwrap().read_to_string(&mut read_data).await.expect("read failed");
    assert_eq!(read_data, ZIP64_ZIP_CONTENTS);
}

/// Tests a streamed entry whose data descriptor uses 64-bit sizes.
#[tokio::test]
async fn test_read_zip64_streamed_entry() {
    init_logger();

    let entry = FixtureEntry::stored("zip64", ZIP64_ZIP_CONTENTS.as_bytes()).zip64().streamed(Descriptor::Signed);
    let built = ArchiveBuilder::new().entry(entry).build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    let entry = archive.entry(0).unwrap().clone();
    let payload = archive.resolve(&entry).await.unwrap();

    match payload.resolution() {
        SizeResolution::Deferred { resolve_via, descriptor_offset, located_by } => {
            assert_eq!(resolve_via.compressed_size, ZIP64_ZIP_CONTENTS.len() as u64);
            assert_eq!(descriptor_offset, built.data_offsets[0] + ZIP64_ZIP_CONTENTS.len() as u64);
            assert_eq!(located_by, SizeSource::CentralDirectory);
        }
        other => panic!("expected a deferred resolution, got {other:?}"),
    }
}

/// Tests that an entry missing its Zip64 override is indexed with a defect while its siblings remain readable.
#[tokio::test]
async fn test_read_zip64_missing_extra_field() {
    init_logger();

    let built = ArchiveBuilder::new()
        .stored("before", b"one")
        .entry(FixtureEntry::stored("broken", b"two").zip64().without_central_zip64_extra())
        .stored("after", b"three")
        .build();

    let mut archive = Archive::open(built.cursor()).await.unwrap();
    assert_eq!(archive.entries().len(), 3);

    let broken = archive.entry(1).unwrap().clone();
    assert!(broken.defect().is_some());
    assert!(matches!(archive.resolve(&broken).await, Err(ZipError::Malformed(_))));

    for (index, expected) in [(0, &b"one"[..]), (2, &b"three"[..])] {
        let entry = archive.entry(index).unwrap().clone();
        assert!(entry.defect().is_none());

        let mut data = Vec::new();
        archive.open_payload(&entry).await.unwrap().read_to_end(&mut data).await.unwrap();
        assert_eq!(data, expected);
    }
}
