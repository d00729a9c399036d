// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::{raw, GeneralPurposeFlags, NON_ZIP64_MAX_SIZE};
use crate::error::Result;
use crate::utils::FieldReader;

pub const SIGNATURE: u32 = 0x4034b50;

raw! {
    RawLocalFileHeader, SIGNATURE, {
        version_needed_to_extract, u16,
        general_purpose_flags, u16,
        compression_method, u16,
        last_mod_file_time, u16,
        last_mod_file_date, u16,
        crc_32, u32,
        compressed_size, u32,
        uncompressed_size, u32,
        file_name_length, u16,
        extra_field_length, u16
    }
}

impl RawLocalFileHeader {
    pub fn flags(&self) -> GeneralPurposeFlags {
        GeneralPurposeFlags(self.general_purpose_flags)
    }

    /// The combined length of the file name and extra field which follow this header.
    pub fn trailing_length(&self) -> usize {
        self.file_name_length as usize + self.extra_field_length as usize
    }

    /// Whether either size was deferred to a Zip64 extended information extra field.
    pub fn has_sentinel(&self) -> bool {
        self.compressed_size == NON_ZIP64_MAX_SIZE || self.uncompressed_size == NON_ZIP64_MAX_SIZE
    }
}

#[derive(Clone, Debug)]
pub struct LocalFileHeader<'a> {
    pub raw: RawLocalFileHeader,
    pub file_name: &'a [u8],
    pub extra_field: &'a [u8],
}

/// Decodes a local file header from the given bytes.
///
/// This function does so by:
/// - asserting the signature of the local file header
/// - decoding the raw local file header
/// - slicing the file name and extra field by their declared lengths
#[tracing::instrument(level = "trace", skip(bytes))]
pub fn decode(bytes: &[u8]) -> Result<LocalFileHeader<'_>> {
    let raw = RawLocalFileHeader::decode(bytes)?;
    let mut reader = FieldReader::new(&bytes[RawLocalFileHeader::LENGTH..]);

    let file_name = reader.take(raw.file_name_length as usize)?;
    let extra_field = reader.take(raw.extra_field_length as usize)?;

    Ok(LocalFileHeader { raw, file_name, extra_field })
}

/// Encodes a local file header.
///
/// This function does so by:
/// - encoding the signature and raw local file header
/// - appending the file name
/// - appending the extra field
pub fn encode(header: &LocalFileHeader) -> Vec<u8> {
    let mut bytes = header.raw.encode();
    bytes.extend_from_slice(header.file_name);
    bytes.extend_from_slice(header.extra_field);
    bytes
}
