// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#![allow(dead_code)]

use std::io::Write;

use futures_lite::io::{AsyncRead, AsyncSeek};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use zip_index::{Archive, Builtin};

pub const FILE_LIST: &[(&str, &str)] = &[
    ("sample_data/alpha/back_to_front.txt", "zyxwvutsrqponmlkjihgfedcba\n"),
    ("sample_data/alpha/front_to_back.txt", "abcdefghijklmnopqrstuvwxyz\n"),
    ("sample_data/numeric/forward.txt", "0123456789\n"),
    ("sample_data/numeric/reverse.txt", "9876543210\n"),
];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Trace).try_init();
}

/// Writes the sample files (and their parent directories) with the given method via the `zip` crate.
pub fn compress_to_mem(method: CompressionMethod) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    writer.add_directory("sample_data/", options).unwrap();

    for (fname, content) in FILE_LIST {
        // Repeated so that compressed entries are smaller than their contents.
        writer.start_file(*fname, options).unwrap();
        writer.write_all(content.repeat(64).as_bytes()).unwrap();
    }

    writer.set_comment("sample data");
    writer.finish().unwrap().into_inner()
}

pub fn expected(fname: &str) -> String {
    let (_, content) = FILE_LIST.iter().find(|(name, _)| *name == fname).expect("unexpected entry name");
    content.repeat(64)
}

/// Reads back every file entry through the builtin decompressor, checking its contents and CRC.
pub async fn check_decompress<R>(mut archive: Archive<R>)
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let entries = archive.entries().to_vec();
    assert_eq!(entries.len(), FILE_LIST.len() + 1);
    assert_eq!(archive.comment().as_str().unwrap(), "sample data");

    for entry in entries {
        if entry.is_dir() {
            continue;
        }

        let fname = entry.filename().as_str().unwrap().to_owned();
        let mut output = String::new();
        let mut reader = archive.open_entry(&entry, &Builtin, None).await.unwrap();
        let _ = reader.read_to_string_checked(&mut output).await.unwrap();

        assert_eq!(output, expected(&fname), "for {fname}, expect zip data to match file data");
    }
}
