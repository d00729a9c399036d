// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Correlating an entry's central directory record with its local file header.
//!
//! The central directory is authoritative. The local file header is decoded only to find where the payload starts
//! (its name and extra field lengths may differ from the central record's) and is otherwise cross-checked. Entries
//! with the data descriptor flag set deferred their CRC and sizes to a descriptor after the payload, which is either
//! read from where the central directory says the payload ends, or found by scanning.

use crate::core::dd::DataDescriptor;
use crate::core::lfh::{self, RawLocalFileHeader};
use crate::core::zip64::extra::{self, Zip64ExtendedInformation, Zip64Sentinels};
use crate::core::{cdr, dsig, edf, NON_ZIP64_MAX_SIZE, SIGNATURE_LENGTH};
use crate::cursor::ByteCursor;
use crate::entry::Entry;
use crate::error::{Result, ZipError};
use crate::opts::{ReadOptions, SizeAuthority};
use crate::read::index::ArchiveIndex;

use std::fmt::Display;
use std::ops::Range;

use futures_lite::io::{AsyncRead, AsyncSeek};

/// The number of payload positions examined per read while scanning for a data descriptor.
const SCAN_CHUNK_SIZE: u64 = 64 * 1024;

/// The bytes beyond each chunk needed to decode a descriptor starting at its last position, plus the signature
/// which must follow it.
const SCAN_OVERLAP: u64 = (DataDescriptor::length(true, true) + SIGNATURE_LENGTH) as u64;

/// Which record an entry's sizes were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSource {
    /// The central directory record, cross-checked against the local file header or data descriptor.
    CentralDirectory,
    /// A data descriptor found by scanning forward from the start of the payload.
    DescriptorScan,
}

/// How an entry's CRC and sizes were resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeResolution {
    /// The data descriptor flag was clear, so the central directory's values were authoritative.
    Authoritative { from: SizeSource },
    /// The data descriptor flag was set, so the values were deferred to the descriptor following the payload.
    Deferred {
        resolve_via: DataDescriptor,
        /// The absolute offset of the descriptor.
        descriptor_offset: u64,
        located_by: SizeSource,
    },
}

/// The location and verified metadata of an entry's compressed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPayload {
    data_offset: u64,
    compressed_size: u64,
    uncompressed_size: u64,
    crc32: u32,
    resolution: SizeResolution,
}

impl ResolvedPayload {
    /// Returns the absolute offset of the first byte of the compressed payload.
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Returns the size of the compressed payload.
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// Returns the size of the entry once decompressed.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Returns the CRC32 of the decompressed contents.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Returns how the CRC and sizes were resolved.
    pub fn resolution(&self) -> SizeResolution {
        self.resolution
    }

    /// Returns the absolute byte range of the compressed payload.
    pub fn range(&self) -> Range<u64> {
        self.data_offset..self.data_offset + self.compressed_size
    }
}

/// Resolves the payload of an entry.
#[tracing::instrument(level = "debug", skip_all, fields(offset = entry.local_header_offset()))]
pub(crate) async fn resolve<R>(
    cursor: &mut ByteCursor<R>,
    index: &ArchiveIndex,
    entry: &Entry,
    options: &ReadOptions,
) -> Result<ResolvedPayload>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    entry.check()?;

    let header_offset = index
        .base_offset
        .checked_add(entry.local_header_offset)
        .filter(|offset| *offset < cursor.len())
        .ok_or_else(|| {
            ZipError::Malformed(format!(
                "local file header offset {} lies beyond the archive length of {}",
                entry.local_header_offset,
                cursor.len()
            ))
        })?;

    let mut bytes = cursor.read_at(header_offset, RawLocalFileHeader::LENGTH).await?;
    let raw = RawLocalFileHeader::decode(&bytes)?;
    let trailing_offset = header_offset + RawLocalFileHeader::LENGTH as u64;
    bytes.extend(cursor.read_at(trailing_offset, raw.trailing_length()).await?);

    let header = lfh::decode(&bytes)?;
    let data_offset = trailing_offset + raw.trailing_length() as u64;
    let checker = Checker { strict: options.strict };

    checker.reconcile(
        "file name",
        String::from_utf8_lossy(entry.filename.as_bytes()),
        String::from_utf8_lossy(header.file_name),
    )?;
    checker.reconcile("compression method", entry.compression_method, raw.compression_method)?;
    checker.reconcile("data descriptor flag", entry.is_streamed(), raw.flags().data_descriptor())?;

    let payload = if entry.is_streamed() {
        let zip64 = entry.zip64 || edf::find(header.extra_field, extra::HEADER_ID).ok().flatten().is_some();
        let absent = entry.crc32 == 0 && entry.compressed_size == 0 && entry.uncompressed_size == 0;

        if options.streamed_sizes == SizeAuthority::DataDescriptor || absent {
            scan(cursor, index, entry, data_offset, zip64, !absent).await?
        } else {
            descriptor(cursor, index, entry, data_offset, zip64, &checker).await?
        }
    } else {
        let (compressed_size, uncompressed_size) = local_sizes(&raw, header.extra_field);

        checker.reconcile("CRC32", Hex(entry.crc32), Hex(raw.crc_32))?;
        checker.reconcile("compressed size", entry.compressed_size, compressed_size)?;
        checker.reconcile("uncompressed size", entry.uncompressed_size, uncompressed_size)?;

        ResolvedPayload {
            data_offset,
            compressed_size: entry.compressed_size,
            uncompressed_size: entry.uncompressed_size,
            crc32: entry.crc32,
            resolution: SizeResolution::Authoritative { from: SizeSource::CentralDirectory },
        }
    };

    if payload.data_offset.checked_add(payload.compressed_size).map_or(true, |end| end > index.directory.start) {
        return Err(ZipError::Malformed(format!(
            "payload of {} bytes at offset {} overruns the central directory at offset {}",
            payload.compressed_size, payload.data_offset, index.directory.start
        )));
    }

    tracing::debug!(data_offset = payload.data_offset, size = payload.compressed_size, "resolved payload");
    Ok(payload)
}

/// Reports disagreements between the central directory and a local record, erroring only when strict.
struct Checker {
    strict: bool,
}

impl Checker {
    fn reconcile<T>(&self, field: &'static str, central: T, local: T) -> Result<()>
    where
        T: PartialEq + Display,
    {
        if central == local {
            return Ok(());
        }

        if self.strict {
            let (central, local) = (central.to_string(), local.to_string());
            return Err(ZipError::InconsistentMetadata { field, central, local });
        }

        tracing::warn!(field, %central, %local, "local record disagrees with the central directory, trusting it");
        Ok(())
    }
}

#[derive(PartialEq)]
struct Hex(u32);

impl Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Returns the local file header's sizes, applying its Zip64 extra field where either size is a sentinel.
fn local_sizes(raw: &RawLocalFileHeader, extra_field: &[u8]) -> (u64, u64) {
    let mut sizes = (raw.compressed_size.into(), raw.uncompressed_size.into());

    if !raw.has_sentinel() {
        return sizes;
    }

    let Ok(Some(data)) = edf::find(extra_field, extra::HEADER_ID) else {
        return sizes;
    };

    // Local headers should carry both sizes whenever either is deferred, but some writers only carry the one.
    let sentinels = if data.len() >= 16 {
        Zip64Sentinels::local()
    } else {
        Zip64Sentinels {
            uncompressed_size: raw.uncompressed_size == NON_ZIP64_MAX_SIZE,
            compressed_size: raw.compressed_size == NON_ZIP64_MAX_SIZE,
            ..Default::default()
        }
    };

    if let Ok(information) = Zip64ExtendedInformation::decode(data, sentinels) {
        sizes.0 = information.compressed_size.unwrap_or(sizes.0);
        sizes.1 = information.uncompressed_size.unwrap_or(sizes.1);
    }

    sizes
}

/// Reads the data descriptor from where the central directory says the payload ends, and cross-checks it.
async fn descriptor<R>(
    cursor: &mut ByteCursor<R>,
    index: &ArchiveIndex,
    entry: &Entry,
    data_offset: u64,
    zip64: bool,
    checker: &Checker,
) -> Result<ResolvedPayload>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let descriptor_offset = data_offset.checked_add(entry.compressed_size).filter(|end| *end < index.directory.start);
    let descriptor_offset = descriptor_offset.ok_or_else(|| {
        ZipError::Malformed(format!(
            "data descriptor after {} bytes at offset {data_offset} lies within the central directory",
            entry.compressed_size
        ))
    })?;

    let available = (index.directory.start - descriptor_offset).min(DataDescriptor::length(zip64, true) as u64);
    let bytes = cursor.read_at(descriptor_offset, available as usize).await?;
    let (descriptor, _) = DataDescriptor::decode(&bytes, zip64, Some(entry.crc32))?;

    checker.reconcile("CRC32", Hex(entry.crc32), Hex(descriptor.crc_32))?;
    checker.reconcile("compressed size", entry.compressed_size, descriptor.compressed_size)?;
    checker.reconcile("uncompressed size", entry.uncompressed_size, descriptor.uncompressed_size)?;

    Ok(ResolvedPayload {
        data_offset,
        compressed_size: entry.compressed_size,
        uncompressed_size: entry.uncompressed_size,
        crc32: entry.crc32,
        resolution: SizeResolution::Deferred {
            resolve_via: descriptor,
            descriptor_offset,
            located_by: SizeSource::CentralDirectory,
        },
    })
}

/// Scans forward from the start of the payload for the entry's data descriptor.
///
/// A position holds a candidate when a descriptor decoded there declares a compressed size equal to its distance from
/// the payload's start and is immediately followed by another record (or by the central directory itself). When the
/// central directory's CRC is known, the descriptor must also match it. Exactly one candidate must be found.
async fn scan<R>(
    cursor: &mut ByteCursor<R>,
    index: &ArchiveIndex,
    entry: &Entry,
    data_offset: u64,
    zip64: bool,
    crc_known: bool,
) -> Result<ResolvedPayload>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let limit = index.directory.start;
    let expected_crc = crc_known.then_some(entry.crc32);
    let mut candidates = Vec::new();
    let mut position = data_offset;

    tracing::debug!(data_offset, limit, zip64, "scanning for data descriptor");

    while position < limit {
        let length = (SCAN_CHUNK_SIZE + SCAN_OVERLAP).min(limit - position);
        let buffer = cursor.read_at(position, length as usize).await?;
        let positions = SCAN_CHUNK_SIZE.min(limit - position);

        for relative in 0..positions as usize {
            let offset = position + relative as u64;
            let Ok((descriptor, consumed)) = DataDescriptor::decode(&buffer[relative..], zip64, expected_crc) else {
                continue;
            };

            if descriptor.compressed_size != offset - data_offset {
                continue;
            }
            if expected_crc.is_some_and(|crc| crc != descriptor.crc_32) {
                continue;
            }
            if !followed_by_record(&buffer[relative + consumed..], offset + consumed as u64 == limit) {
                continue;
            }

            tracing::trace!(offset, ?descriptor, "data descriptor candidate");
            candidates.push((offset, descriptor));
        }

        position += positions;
    }

    let [(descriptor_offset, descriptor)] = candidates[..] else {
        return Err(ZipError::AmbiguousStreamedEntry { candidates: candidates.len() });
    };

    Ok(ResolvedPayload {
        data_offset,
        compressed_size: descriptor.compressed_size,
        uncompressed_size: descriptor.uncompressed_size,
        crc32: descriptor.crc_32,
        resolution: SizeResolution::Deferred {
            resolve_via: descriptor,
            descriptor_offset,
            located_by: SizeSource::DescriptorScan,
        },
    })
}

/// Whether the bytes following a candidate descriptor begin another record.
fn followed_by_record(following: &[u8], at_directory: bool) -> bool {
    if at_directory {
        return true;
    }

    let Some(signature) = following.get(..SIGNATURE_LENGTH) else {
        return false;
    };

    [lfh::SIGNATURE, cdr::SIGNATURE, dsig::SIGNATURE].iter().any(|expected| signature == expected.to_le_bytes())
}
