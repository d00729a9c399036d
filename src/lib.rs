// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! # zip_index
//!
//! An asynchronous, runtime-agnostic reader for ZIP archives over any seekable source.
//!
//! ## Features
//! - Locates the end of central directory record (and its Zip64 counterparts) behind comments, trailing junk, and
//!   self-extracting stubs.
//! - Indexes the central directory without loading payloads, resolving Zip64 overrides per entry.
//! - Correlates each entry with its local file header, including streamed entries whose sizes trail their payloads.
//! - Leaves decompression and decryption to pluggable [`Decompressor`]s and [`Decryptor`]s, with an
//!   `async-compression` adapter for Deflate, Deflate64, bzip2, LZMA, zstd, and xz behind feature flags.
//! - Aims for reasonable [specification](https://pkware.cachefly.net/webdocs/casestudies/APPNOTE.TXT) compliance.
//!
//! ## Example
//! ```no_run
//! # use zip_index::{Archive, ReadOptions};
//! # use zip_index::error::ZipError;
//! # use futures_lite::io::{AsyncReadExt, Cursor};
//! #
//! # async fn run(data: Vec<u8>) -> Result<(), ZipError> {
//! let mut archive = Archive::open_with(Cursor::new(data), ReadOptions::default().with_strict(false)).await?;
//! let entry = archive.find("data.bin").cloned().ok_or(ZipError::EntryIndexOutOfBounds)?;
//!
//! let mut compressed = Vec::new();
//! archive.open_payload(&entry).await?.read_to_end(&mut compressed).await?;
//! #   Ok(())
//! # }
//! ```

pub mod core;
pub mod cursor;
pub mod date;
pub mod entry;
pub mod error;
pub mod opts;
pub mod read;
pub mod spec;
pub mod string;

pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod tests;

pub use crate::core::dd::DataDescriptor;
pub use crate::core::GeneralPurposeFlags;
pub use crate::date::ZipDateTime;
pub use crate::entry::Entry;
pub use crate::opts::{ReadOptions, SizeAuthority};
pub use crate::read::codec::{Builtin, Decompressor, Decryptor};
pub use crate::read::index::ArchiveIndex;
pub use crate::read::resolver::{ResolvedPayload, SizeResolution, SizeSource};
pub use crate::read::{Archive, EntryReader, PayloadReader};
pub use crate::spec::{Compression, EncryptionKind};
pub use crate::string::{StringEncoding, ZipString};
