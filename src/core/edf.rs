// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};
use crate::utils::FieldReader;

/// The length of an extensible data field's header (ID and data size).
pub const HEADER_LENGTH: usize = 4;

/// Info-ZIP Unicode Path Extra Field.
pub const INFO_ZIP_UNICODE_PATH: u16 = 0x7075;

/// Info-ZIP Unicode Comment Extra Field.
pub const INFO_ZIP_UNICODE_COMMENT: u16 = 0x6375;

/// A single extensible data field borrowed from an extra field blob.
///
/// <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#452>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensibleDataField<'a> {
    pub header_id: u16,
    pub data: &'a [u8],
}

impl ExtensibleDataField<'_> {
    /// Encodes this field, including its header.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LENGTH + self.data.len());
        bytes.extend_from_slice(&self.header_id.to_le_bytes());
        bytes.extend_from_slice(&(self.data.len() as u16).to_le_bytes());
        bytes.extend_from_slice(self.data);
        bytes
    }
}

/// Splits an extra field blob into its extensible data fields.
///
/// Fewer than four trailing bytes are treated as padding (as written by alignment tools) and ignored. A field whose
/// declared data size overruns the blob is malformed.
pub fn split(blob: &[u8]) -> Result<Vec<ExtensibleDataField<'_>>> {
    let mut reader = FieldReader::new(blob);
    let mut fields = Vec::new();

    while reader.remaining().len() >= HEADER_LENGTH {
        let header_id = reader.read::<u16>()?;
        let data_size = reader.read::<u16>()?;
        let data = reader.take(data_size as usize).map_err(|_| {
            ZipError::Malformed(format!("extra field {header_id:#06x} declares {data_size} bytes beyond its blob"))
        })?;

        fields.push(ExtensibleDataField { header_id, data });
    }

    if !reader.remaining().is_empty() {
        tracing::trace!(padding = reader.remaining().len(), "ignoring trailing extra field padding");
    }

    Ok(fields)
}

/// Finds the data of the first field with the given header ID.
pub fn find(blob: &[u8], header_id: u16) -> Result<Option<&[u8]>> {
    Ok(split(blob)?.into_iter().find(|field| field.header_id == header_id).map(|field| field.data))
}

/// Decodes an Info-ZIP Unicode Path/Comment field's data into the CRC of the value it replaces and its UTF-8 bytes.
///
/// Only version 1 is defined; any other version yields `None`.
pub fn info_zip_unicode(data: &[u8]) -> Option<(u32, &[u8])> {
    let mut reader = FieldReader::new(data);

    match reader.read::<u8>().ok()? {
        1 => Some((reader.read::<u32>().ok()?, reader.remaining())),
        _ => None,
    }
}
