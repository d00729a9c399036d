// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::{raw, NON_ZIP64_MAX_NUM_FILES, NON_ZIP64_MAX_SIZE};
use crate::error::Result;
use crate::utils::FieldReader;

pub const SIGNATURE: u32 = 0x6054b50;

raw! {
    RawEndOfCentralDirectoryRecord, SIGNATURE, {
        number_of_this_disk, u16,
        disk_with_start_of_cd, u16,
        entries_on_this_disk, u16,
        total_entries, u16,
        size_of_cd, u32,
        offset_of_cd, u32,
        zip_file_comment_length, u16
    }
}

impl RawEndOfCentralDirectoryRecord {
    /// Whether any field was deferred to the Zip64 end of central directory record.
    pub fn has_sentinel(&self) -> bool {
        self.total_entries == NON_ZIP64_MAX_NUM_FILES
            || self.entries_on_this_disk == NON_ZIP64_MAX_NUM_FILES
            || self.size_of_cd == NON_ZIP64_MAX_SIZE
            || self.offset_of_cd == NON_ZIP64_MAX_SIZE
    }
}

#[derive(Clone, Debug)]
pub struct EndOfCentralDirectoryRecord<'a> {
    pub raw: RawEndOfCentralDirectoryRecord,
    pub zip_file_comment: &'a [u8],
}

/// Decodes the end of central directory record from the given bytes.
///
/// This function does so by:
/// - asserting the signature of the end of central directory record
/// - decoding the raw end of central directory record
/// - slicing the zip file comment by its declared length
#[tracing::instrument(level = "trace", skip(bytes))]
pub fn decode(bytes: &[u8]) -> Result<EndOfCentralDirectoryRecord<'_>> {
    let raw = RawEndOfCentralDirectoryRecord::decode(bytes)?;
    let mut reader = FieldReader::new(&bytes[RawEndOfCentralDirectoryRecord::LENGTH..]);
    let zip_file_comment = reader.take(raw.zip_file_comment_length as usize)?;

    Ok(EndOfCentralDirectoryRecord { raw, zip_file_comment })
}

/// Encodes the end of central directory record, including the zip file comment.
pub fn encode(record: &EndOfCentralDirectoryRecord) -> Vec<u8> {
    let mut bytes = record.raw.encode();
    bytes.extend_from_slice(record.zip_file_comment);
    bytes
}
