// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#4316>
//!
//! As with other ZIP libraries, we face the predicament that the end of central directory record may contain a
//! variable-length file comment. As a result, we cannot just make the assumption that the start of this record is
//! 22 bytes offset from the end of the data - we must locate it ourselves.
//!
//! The record can only start within the final `22 + u16::MAX` bytes, so that window is read in once and searched in
//! reverse. Each signature match is only a candidate: a comment may itself contain the signature bytes, so a match is
//! accepted only when the comment length it declares fits within the bytes which follow it, and a match lying wholly
//! within an earlier match's comment is discarded in favour of that earlier match. Anything after the comment is
//! tolerated as trailing junk.

use crate::core::eocdr::{self, RawEndOfCentralDirectoryRecord};
use crate::core::zip64::eocdr::RawZip64EndOfCentralDirectoryRecord;
use crate::core::zip64::locator::RawZip64EndOfCentralDirectoryLocator;
use crate::core::{cdr, SIGNATURE_LENGTH};
use crate::cursor::{reverse_search_buffer, ByteCursor};
use crate::error::{Result, ZipError};

use std::ops::Range;

use futures_lite::io::{AsyncRead, AsyncSeek};

/// The size of the window searched for the end of central directory record.
const SEARCH_WINDOW: u64 = RawEndOfCentralDirectoryRecord::LENGTH as u64 + u16::MAX as u64;

/// The archive-level values combined from the end of central directory record and, when present, its Zip64
/// counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Trailer {
    pub(crate) total_entries: u64,
    pub(crate) size_of_cd: u64,
    pub(crate) offset_of_cd: u64,
    pub(crate) comment: Vec<u8>,
    pub(crate) zip64: bool,
    /// The number of bytes of unrelated data preceding the archive proper.
    pub(crate) base_offset: u64,
    /// The absolute offset of the first trailer record (the Zip64 record where present, else the EOCDR).
    pub(crate) trailer_offset: u64,
}

impl Trailer {
    /// Combines a plain end of central directory record with no Zip64 counterpart.
    fn from_eocdr(record: &eocdr::EndOfCentralDirectoryRecord, offset: u64) -> Self {
        Self {
            total_entries: record.raw.total_entries.into(),
            size_of_cd: record.raw.size_of_cd.into(),
            offset_of_cd: record.raw.offset_of_cd.into(),
            comment: record.zip_file_comment.to_vec(),
            zip64: false,
            base_offset: 0,
            trailer_offset: offset,
        }
    }

    /// Combines an end of central directory record with its Zip64 counterpart, which is authoritative for every
    /// field it carries.
    fn combine(
        record: &eocdr::EndOfCentralDirectoryRecord,
        zip64: &RawZip64EndOfCentralDirectoryRecord,
        offset: u64,
    ) -> Self {
        Self {
            total_entries: zip64.total_entries,
            size_of_cd: zip64.size_of_cd,
            offset_of_cd: zip64.offset_of_cd,
            comment: record.zip_file_comment.to_vec(),
            zip64: true,
            base_offset: 0,
            trailer_offset: offset,
        }
    }

    /// The absolute offset of the first central directory record.
    pub(crate) fn directory_start(&self) -> u64 {
        self.base_offset + self.offset_of_cd
    }

    /// The absolute offset one past the last central directory record.
    pub(crate) fn directory_end(&self) -> u64 {
        self.directory_start() + self.size_of_cd
    }
}

/// Locates and combines the archive's trailer records, computing the base offset of the archive proper.
#[tracing::instrument(level = "debug", skip_all, fields(length = cursor.len()))]
pub(crate) async fn locate<R>(cursor: &mut ByteCursor<R>) -> Result<Trailer>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let (eocdr_offset, record) = eocdr(cursor).await?;
    let eocdr = eocdr::decode(&record)?;
    tracing::debug!(offset = eocdr_offset, "located end of central directory record");

    let mut trailer = match zip64(cursor, eocdr_offset).await? {
        Some((offset, zip64)) => {
            if zip64.number_of_this_disk != zip64.disk_with_start_of_cd
                || zip64.entries_on_this_disk != zip64.total_entries
            {
                return Err(ZipError::Unsupported("spanned archives".into()));
            }

            Trailer::combine(&eocdr, &zip64, offset)
        }
        None if eocdr.raw.has_sentinel() => {
            return Err(ZipError::Malformed(
                "end of central directory record defers to a Zip64 record which is not present".into(),
            ));
        }
        None => {
            if eocdr.raw.number_of_this_disk != eocdr.raw.disk_with_start_of_cd
                || eocdr.raw.entries_on_this_disk != eocdr.raw.total_entries
            {
                return Err(ZipError::Unsupported("spanned archives".into()));
            }

            Trailer::from_eocdr(&eocdr, eocdr_offset)
        }
    };

    trailer.base_offset = base_offset(cursor, &trailer).await?;

    if trailer.directory_start().checked_add(trailer.size_of_cd).map_or(true, |end| end > trailer.trailer_offset) {
        return Err(ZipError::Malformed(format!(
            "central directory ({} bytes at offset {}) overlaps the trailer at offset {}",
            trailer.size_of_cd,
            trailer.directory_start(),
            trailer.trailer_offset
        )));
    }

    tracing::debug!(
        entries = trailer.total_entries,
        directory = trailer.directory_start(),
        base = trailer.base_offset,
        zip64 = trailer.zip64,
        "combined trailer records"
    );
    Ok(trailer)
}

/// Locates the end of central directory record, returning its offset and its bytes through to the end of the source.
async fn eocdr<R>(cursor: &mut ByteCursor<R>) -> Result<(u64, Vec<u8>)>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    if cursor.len() < RawEndOfCentralDirectoryRecord::LENGTH as u64 {
        return Err(ZipError::NotAZipArchive);
    }

    let (start, mut window) = cursor.read_tail(SEARCH_WINDOW).await?;
    let signature = RawEndOfCentralDirectoryRecord::SIGNATURE.to_le_bytes();
    let mut end = window.len();
    let mut found: Option<Range<usize>> = None;

    while let Some(index) = reverse_search_buffer(&window[..end], &signature) {
        match eocdr::decode(&window[index..]) {
            Ok(record) => {
                let candidate = index..index + RawEndOfCentralDirectoryRecord::LENGTH + record.zip_file_comment.len();

                // A later candidate lying wholly within this one's comment is part of that comment.
                let comment_start = candidate.start + RawEndOfCentralDirectoryRecord::LENGTH;
                let encloses =
                    found.as_ref().map_or(true, |inner| comment_start <= inner.start && inner.end <= candidate.end);

                if encloses {
                    if let Some(inner) = &found {
                        tracing::trace!(offset = start + inner.start as u64, "candidate lies within a comment");
                    }
                    found = Some(candidate);
                }
            }
            Err(err) => tracing::trace!(offset = start + index as u64, %err, "rejected candidate"),
        }

        // Any earlier match must start before this one, so it ends at most one byte short of this one's end.
        end = index + SIGNATURE_LENGTH - 1;
    }

    let index = found.ok_or(ZipError::NotAZipArchive)?.start;
    window.drain(..index);

    Ok((start + index as u64, window))
}

/// Reads the Zip64 end of central directory record if a locator immediately precedes the EOCDR.
///
/// Returns the record alongside its absolute offset.
async fn zip64<R>(
    cursor: &mut ByteCursor<R>,
    eocdr_offset: u64,
) -> Result<Option<(u64, RawZip64EndOfCentralDirectoryRecord)>>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let Some(locator_offset) = eocdr_offset.checked_sub(RawZip64EndOfCentralDirectoryLocator::LENGTH as u64) else {
        return Ok(None);
    };

    let bytes = cursor.read_at(locator_offset, RawZip64EndOfCentralDirectoryLocator::LENGTH).await?;
    let locator = match RawZip64EndOfCentralDirectoryLocator::decode(&bytes) {
        Ok(locator) => locator,
        Err(ZipError::BadSignature { .. }) => return Ok(None),
        Err(err) => return Err(err),
    };

    tracing::debug!(offset = locator_offset, record = locator.relative_offset_eocdr, "located Zip64 locator");
    if locator.total_disks > 1 {
        return Err(ZipError::Unsupported("spanned archives".into()));
    }

    // The locator's offset is relative to the archive proper, so any prefixed data shifts the record. Without an
    // extensible data sector it sits immediately before the locator.
    let adjacent = locator_offset.checked_sub(RawZip64EndOfCentralDirectoryRecord::LENGTH as u64);
    let mut last_error = None;

    for offset in std::iter::once(locator.relative_offset_eocdr).chain(adjacent) {
        let record = match cursor.read_at(offset, RawZip64EndOfCentralDirectoryRecord::LENGTH).await {
            Ok(bytes) => RawZip64EndOfCentralDirectoryRecord::decode(&bytes),
            Err(err) => Err(err),
        };

        match record {
            Ok(record) => {
                tracing::debug!(offset, "located Zip64 end of central directory record");
                return Ok(Some((offset, record)));
            }
            Err(err @ (ZipError::BadSignature { .. } | ZipError::Malformed(_))) => {
                tracing::trace!(offset, %err, "no Zip64 end of central directory record");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_error.unwrap_or(ZipError::Malformed("Zip64 locator points outside of the archive".into())))
}

/// Computes the number of bytes of prefixed data (eg. a self-extracting stub) before the archive proper.
///
/// The trailer physically follows the central directory, so the directory's observed start is the trailer's offset
/// less the directory's size. Its distance from the declared start is the prefix.
async fn base_offset<R>(cursor: &mut ByteCursor<R>, trailer: &Trailer) -> Result<u64>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let observed = trailer.trailer_offset.checked_sub(trailer.size_of_cd).ok_or_else(|| {
        ZipError::Malformed(format!(
            "central directory size {} exceeds the trailer offset {}",
            trailer.size_of_cd, trailer.trailer_offset
        ))
    })?;

    let base = observed.checked_sub(trailer.offset_of_cd).ok_or_else(|| {
        ZipError::Malformed(format!(
            "central directory declared at offset {} but observed at offset {observed}",
            trailer.offset_of_cd
        ))
    })?;

    if base == 0 || trailer.total_entries == 0 {
        return Ok(base);
    }

    // Some writers pad between the directory and its trailer. Where the declared offset holds a record but the
    // adjusted one doesn't, the declared offset is trusted as is.
    if !has_cdr_signature(cursor, observed).await? && has_cdr_signature(cursor, trailer.offset_of_cd).await? {
        tracing::debug!(base, "adjusted offset holds no central directory record, ignoring prefix");
        return Ok(0);
    }

    tracing::debug!(base, "archive is prefixed");
    Ok(base)
}

async fn has_cdr_signature<R>(cursor: &mut ByteCursor<R>, offset: u64) -> Result<bool>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    match cursor.read_at(offset, SIGNATURE_LENGTH).await {
        Ok(bytes) => Ok(bytes == cdr::SIGNATURE.to_le_bytes()),
        Err(ZipError::Malformed(_)) => Ok(false),
        Err(err) => Err(err),
    }
}
