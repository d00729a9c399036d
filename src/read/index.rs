// Copyright (c) 2022-2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Walking the central directory into an ordered index of entries.

use crate::core::cdr::{self, CentralDirectoryRecord, RawCentralDirectoryRecord};
use crate::core::dsig::RawDigitalSignature;
use crate::core::edf::{self, INFO_ZIP_UNICODE_COMMENT, INFO_ZIP_UNICODE_PATH};
use crate::core::zip64::extra::{self, Zip64ExtendedInformation};
use crate::core::{ARCHIVE_EXTRA_DATA_SIGNATURE, SIGNATURE_LENGTH};
use crate::cursor::ByteCursor;
use crate::date::ZipDateTime;
use crate::entry::Entry;
use crate::error::{Result, ZipError};
use crate::read::locator::Trailer;
use crate::string::{StringEncoding, ZipString};
use crate::utils::read_bytes;

use std::io::ErrorKind;
use std::ops::Range;

use futures_lite::io::{AsyncRead, AsyncReadExt, AsyncSeek, BufReader};

/// The max buffer size used when parsing the central directory, equal to 20MiB.
const MAX_CD_BUFFER_SIZE: usize = 20 * 1024 * 1024;

/// The immutable result of indexing an archive.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    pub(crate) entries: Vec<Entry>,
    pub(crate) comment: ZipString,
    pub(crate) zip64: bool,
    pub(crate) base_offset: u64,
    pub(crate) directory: Range<u64>,
}

impl ArchiveIndex {
    /// Returns the archive's entries in central directory order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the archive's comment.
    pub fn comment(&self) -> &ZipString {
        &self.comment
    }

    /// Returns whether the archive's trailer used Zip64 records.
    pub fn zip64(&self) -> bool {
        self.zip64
    }

    /// Returns the number of bytes of prefixed data before the archive proper.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Returns the absolute byte range occupied by the central directory.
    pub fn directory(&self) -> Range<u64> {
        self.directory.clone()
    }
}

/// Walks the central directory described by the trailer.
#[tracing::instrument(level = "debug", skip_all, fields(entries = trailer.total_entries))]
pub(crate) async fn index<R>(cursor: &mut ByteCursor<R>, trailer: &Trailer) -> Result<ArchiveIndex>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let start = trailer.directory_start();
    let declared = trailer.total_entries;

    if declared > 0 && trailer.size_of_cd >= SIGNATURE_LENGTH as u64 {
        let signature = cursor.read_at(start, SIGNATURE_LENGTH).await?;

        if signature == ARCHIVE_EXTRA_DATA_SIGNATURE.to_le_bytes() {
            return Err(ZipError::Unsupported("encrypted central directory".into()));
        }
    }

    cursor.seek_to(start).await?;

    // To avoid lots of small reads to the cursor when parsing the central directory, we use a BufReader that can read
    // the whole central directory at once. The size is attacker-controlled, so is capped at MAX_CD_BUFFER_SIZE.
    let capacity = (trailer.size_of_cd as usize).clamp(RawCentralDirectoryRecord::LENGTH, MAX_CD_BUFFER_SIZE);
    let mut reader = BufReader::with_capacity(capacity, (&mut *cursor).take(trailer.size_of_cd));

    // A forged count cannot force an allocation larger than the directory could possibly hold.
    let bound = trailer.size_of_cd / RawCentralDirectoryRecord::LENGTH as u64;
    let mut entries = Vec::with_capacity(declared.min(bound) as usize);

    for _ in 0..declared {
        match record(&mut reader).await {
            Ok(entry) => entries.push(entry),
            Err(err) if is_truncation(&err) => {
                tracing::debug!(%err, found = entries.len(), "central directory ended early");
                return Err(ZipError::TruncatedCentralDirectory { declared, found: entries.len() as u64 });
            }
            Err(err) => return Err(err),
        }
    }

    let mut leftover = Vec::new();
    (&mut reader).take(RawDigitalSignature::LENGTH as u64).read_to_end(&mut leftover).await?;

    match RawDigitalSignature::decode(&leftover) {
        Ok(signature) => tracing::trace!(size = signature.size_of_data, "skipping digital signature"),
        Err(_) if !leftover.is_empty() => tracing::trace!("ignoring data following the central directory records"),
        Err(_) => (),
    }

    Ok(ArchiveIndex {
        entries,
        comment: ZipString::new(trailer.comment.clone(), StringEncoding::Utf8),
        zip64: trailer.zip64,
        base_offset: trailer.base_offset,
        directory: start..trailer.directory_end(),
    })
}

fn is_truncation(err: &ZipError) -> bool {
    match err {
        ZipError::BadSignature { .. } | ZipError::Malformed(_) => true,
        ZipError::UpstreamReadError(err) => err.kind() == ErrorKind::UnexpectedEof,
        _ => false,
    }
}

/// Reads a single central directory record and converts it into an entry.
async fn record<R>(mut reader: R) -> Result<Entry>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = read_bytes(&mut reader, RawCentralDirectoryRecord::LENGTH).await?;
    let raw = RawCentralDirectoryRecord::decode(&bytes)?;
    bytes.extend(read_bytes(&mut reader, raw.trailing_length()).await?);

    Ok(entry(&cdr::decode(&bytes)?))
}

/// Builds an entry from a decoded record, applying any Zip64 overrides.
///
/// A missing or malformed override doesn't abort indexing; the entry is kept with its defect recorded.
fn entry(record: &CentralDirectoryRecord) -> Entry {
    let raw = &record.raw;
    let sentinels = raw.zip64_sentinels();

    let mut entry = Entry {
        filename: detect_string(record.file_name, raw.flags().utf8(), record.extra_field, INFO_ZIP_UNICODE_PATH),
        compression_method: raw.compression_method,
        flags: raw.flags(),
        crc32: raw.crc_32,
        compressed_size: raw.compressed_size.into(),
        uncompressed_size: raw.uncompressed_size.into(),
        last_modification_date: ZipDateTime { date: raw.last_mod_file_date, time: raw.last_mod_file_time },
        version_made_by: raw.version_made_by,
        version_needed: raw.version_needed_to_extract,
        internal_file_attribute: raw.internal_file_attributes,
        external_file_attribute: raw.external_file_attributes,
        extra_field: record.extra_field.to_vec(),
        comment: detect_string(record.file_comment, raw.flags().utf8(), record.extra_field, INFO_ZIP_UNICODE_COMMENT),
        local_header_offset: raw.relative_offset_of_local_header.into(),
        zip64: false,
        defect: None,
    };

    if !sentinels.any() {
        return entry;
    }

    let information = edf::find(record.extra_field, extra::HEADER_ID).and_then(|data| {
        let data = data.ok_or_else(|| ZipError::Malformed("Zip64 extra field is missing".into()))?;
        Zip64ExtendedInformation::decode(data, sentinels)
    });

    match information {
        Ok(information) => {
            entry.uncompressed_size = information.uncompressed_size.unwrap_or(entry.uncompressed_size);
            entry.compressed_size = information.compressed_size.unwrap_or(entry.compressed_size);
            entry.local_header_offset = information.local_header_offset.unwrap_or(entry.local_header_offset);
            entry.zip64 = true;
        }
        Err(err) => {
            tracing::warn!(filename = ?entry.filename.as_str().ok(), %err, "unable to resolve Zip64 overrides");
            entry.defect = Some(err.to_string());
        }
    }

    entry
}

/// Detects the encoding of a file name or comment, preferring a verified Info-ZIP Unicode extra field when the UTF-8
/// flag is clear.
fn detect_string(basic: &[u8], basic_is_utf8: bool, extra_field: &[u8], header_id: u16) -> ZipString {
    if basic_is_utf8 {
        return ZipString::new(basic.to_vec(), StringEncoding::Utf8);
    }

    // Do not treat as UTF-8 if UTF-8 flags are not set, some string in MBCS may be valid UTF-8 in form, but they are
    // not in truth. A valid ASCII string is always a valid UTF-8 string however.
    let encoding = if basic.is_ascii() { StringEncoding::Utf8 } else { StringEncoding::Raw };

    let unicode = edf::find(extra_field, header_id)
        .ok()
        .flatten()
        .and_then(edf::info_zip_unicode)
        .filter(|(crc32, _)| *crc32 == crc32fast::hash(basic))
        .and_then(|(_, unicode)| String::from_utf8(unicode.to_vec()).ok());

    match unicode {
        Some(unicode) => ZipString::new_with_alternative(basic.to_vec(), encoding, unicode),
        None => ZipString::new(basic.to_vec(), encoding),
    }
}
