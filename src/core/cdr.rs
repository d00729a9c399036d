// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::zip64::extra::Zip64Sentinels;
use crate::core::{raw, GeneralPurposeFlags, NON_ZIP64_MAX_NUM_FILES, NON_ZIP64_MAX_SIZE};
use crate::error::Result;
use crate::utils::FieldReader;

pub const SIGNATURE: u32 = 0x2014b50;

raw! {
    RawCentralDirectoryRecord, SIGNATURE, {
        version_made_by, u16,
        version_needed_to_extract, u16,
        general_purpose_flags, u16,
        compression_method, u16,
        last_mod_file_time, u16,
        last_mod_file_date, u16,
        crc_32, u32,
        compressed_size, u32,
        uncompressed_size, u32,
        file_name_length, u16,
        extra_field_length, u16,
        file_comment_length, u16,
        disk_number_start, u16,
        internal_file_attributes, u16,
        external_file_attributes, u32,
        relative_offset_of_local_header, u32
    }
}

impl RawCentralDirectoryRecord {
    pub fn flags(&self) -> GeneralPurposeFlags {
        GeneralPurposeFlags(self.general_purpose_flags)
    }

    /// The combined length of the file name, extra field, and file comment which follow this record.
    pub fn trailing_length(&self) -> usize {
        self.file_name_length as usize + self.extra_field_length as usize + self.file_comment_length as usize
    }

    /// Which of this record's fields hold a sentinel and so expect an override from the Zip64 extra field.
    pub fn zip64_sentinels(&self) -> Zip64Sentinels {
        Zip64Sentinels {
            uncompressed_size: self.uncompressed_size == NON_ZIP64_MAX_SIZE,
            compressed_size: self.compressed_size == NON_ZIP64_MAX_SIZE,
            local_header_offset: self.relative_offset_of_local_header == NON_ZIP64_MAX_SIZE,
            disk_start: self.disk_number_start == NON_ZIP64_MAX_NUM_FILES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CentralDirectoryRecord<'a> {
    pub raw: RawCentralDirectoryRecord,
    pub file_name: &'a [u8],
    pub extra_field: &'a [u8],
    pub file_comment: &'a [u8],
}

/// Decodes a central directory record from the given bytes.
///
/// This function does so by:
/// - asserting the signature of the central directory record
/// - decoding the raw central directory record
/// - slicing the file name, extra field, and file comment by their declared lengths
#[tracing::instrument(level = "trace", skip(bytes))]
pub fn decode(bytes: &[u8]) -> Result<CentralDirectoryRecord<'_>> {
    let raw = RawCentralDirectoryRecord::decode(bytes)?;
    let mut reader = FieldReader::new(&bytes[RawCentralDirectoryRecord::LENGTH..]);

    let file_name = reader.take(raw.file_name_length as usize)?;
    let extra_field = reader.take(raw.extra_field_length as usize)?;
    let file_comment = reader.take(raw.file_comment_length as usize)?;

    Ok(CentralDirectoryRecord { raw, file_name, extra_field, file_comment })
}

/// Encodes a central directory record.
///
/// This function does so by:
/// - encoding the signature and raw central directory record
/// - appending the file name
/// - appending the extra field
/// - appending the file comment
pub fn encode(record: &CentralDirectoryRecord) -> Vec<u8> {
    let mut bytes = record.raw.encode();
    bytes.extend_from_slice(record.file_name);
    bytes.extend_from_slice(record.extra_field);
    bytes.extend_from_slice(record.file_comment);
    bytes
}
