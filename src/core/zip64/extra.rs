// Copyright (c) 2023 Cognite AS
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! The Zip64 extended information extra field.
//!
//! Unlike other records, this field has no fixed layout: it holds only those 64-bit values whose 32-bit counterpart
//! in the owning record was a sentinel, always in the order below. Reading it as a fixed struct misreads every field
//! after the first absent one, so it is consumed one typed field at a time.
//!
//! <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#453>

use crate::error::{Result, ZipError};
use crate::utils::FieldReader;

pub const HEADER_ID: u16 = 0x0001;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zip64Field {
    UncompressedSize,
    CompressedSize,
    LocalHeaderOffset,
    DiskStart,
}

const FIELD_ORDER: [Zip64Field; 4] =
    [Zip64Field::UncompressedSize, Zip64Field::CompressedSize, Zip64Field::LocalHeaderOffset, Zip64Field::DiskStart];

/// Which fields of the owning record held their sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Zip64Sentinels {
    pub uncompressed_size: bool,
    pub compressed_size: bool,
    pub local_header_offset: bool,
    pub disk_start: bool,
}

impl Zip64Sentinels {
    /// Sentinels for a local file header, where both sizes are always present together.
    pub fn local() -> Self {
        Self { uncompressed_size: true, compressed_size: true, ..Default::default() }
    }

    pub fn any(&self) -> bool {
        self.uncompressed_size || self.compressed_size || self.local_header_offset || self.disk_start
    }

    fn expects(&self, field: Zip64Field) -> bool {
        match field {
            Zip64Field::UncompressedSize => self.uncompressed_size,
            Zip64Field::CompressedSize => self.compressed_size,
            Zip64Field::LocalHeaderOffset => self.local_header_offset,
            Zip64Field::DiskStart => self.disk_start,
        }
    }
}

/// The 64-bit overrides carried by a Zip64 extended information extra field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Zip64ExtendedInformation {
    pub uncompressed_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub local_header_offset: Option<u64>,
    pub disk_start: Option<u32>,
}

impl Zip64ExtendedInformation {
    /// Decodes the field's data (excluding its header), consuming only the overrides the sentinels call for.
    ///
    /// Surplus trailing bytes are tolerated; a missing expected override is malformed.
    pub fn decode(data: &[u8], sentinels: Zip64Sentinels) -> Result<Self> {
        let mut reader = FieldReader::new(data);
        let mut information = Self::default();

        for field in FIELD_ORDER.into_iter().filter(|field| sentinels.expects(*field)) {
            let missing = |_| ZipError::Malformed(format!("Zip64 extra field is missing its {field:?} override"));

            match field {
                Zip64Field::UncompressedSize => information.uncompressed_size = Some(reader.read().map_err(missing)?),
                Zip64Field::CompressedSize => information.compressed_size = Some(reader.read().map_err(missing)?),
                Zip64Field::LocalHeaderOffset => {
                    information.local_header_offset = Some(reader.read().map_err(missing)?)
                }
                Zip64Field::DiskStart => information.disk_start = Some(reader.read().map_err(missing)?),
            }
        }

        Ok(information)
    }

    /// Encodes the present overrides as a complete extra field, including its header.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(28);

        if let Some(size) = self.uncompressed_size {
            data.extend_from_slice(&size.to_le_bytes());
        }
        if let Some(size) = self.compressed_size {
            data.extend_from_slice(&size.to_le_bytes());
        }
        if let Some(offset) = self.local_header_offset {
            data.extend_from_slice(&offset.to_le_bytes());
        }
        if let Some(disk) = self.disk_start {
            data.extend_from_slice(&disk.to_le_bytes());
        }

        crate::core::edf::ExtensibleDataField { header_id: HEADER_ID, data: &data }.encode()
    }
}
