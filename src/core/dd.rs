// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::SIGNATURE_LENGTH;
use crate::error::Result;
use crate::utils::FieldReader;

pub const SIGNATURE: u32 = 0x8074b50;

/// The CRC and sizes of a streamed entry, recorded after its payload.
///
/// Both sizes are widened to u64 regardless of whether the descriptor used the 32-bit or Zip64 layout.
///
/// <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#439>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataDescriptor {
    pub crc_32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

impl DataDescriptor {
    /// The length in bytes of a descriptor with the given layout.
    pub const fn length(zip64: bool, signed: bool) -> usize {
        let fields = if zip64 { 4 + 8 + 8 } else { 4 + 4 + 4 };
        if signed {
            fields + SIGNATURE_LENGTH
        } else {
            fields
        }
    }

    /// Decodes a data descriptor from the start of the given bytes, probing for its optional signature.
    ///
    /// Returns the descriptor alongside the number of bytes it occupied. The signature is optional, so a CRC which
    /// happens to equal it is indistinguishable by the first word alone. When the expected CRC is known and collides
    /// with the signature, the second word decides: a signed descriptor repeats the CRC there.
    #[tracing::instrument(level = "trace", skip(bytes))]
    pub fn decode(bytes: &[u8], zip64: bool, expected_crc: Option<u32>) -> Result<(DataDescriptor, usize)> {
        let mut reader = FieldReader::new(bytes);
        let first = reader.read::<u32>()?;

        let signed = first == SIGNATURE
            && (expected_crc != Some(SIGNATURE) || FieldReader::new(reader.remaining()).read::<u32>()? == SIGNATURE);

        let crc_32 = if signed { reader.read::<u32>()? } else { first };
        let (compressed_size, uncompressed_size) = if zip64 {
            (reader.read::<u64>()?, reader.read::<u64>()?)
        } else {
            (reader.read::<u32>()?.into(), reader.read::<u32>()?.into())
        };

        let descriptor = DataDescriptor { crc_32, compressed_size, uncompressed_size };
        Ok((descriptor, Self::length(zip64, signed)))
    }

    /// Encodes this data descriptor with the given layout.
    ///
    /// Sizes are truncated when the 32-bit layout is requested.
    pub fn encode(&self, zip64: bool, signed: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::length(zip64, signed));

        if signed {
            bytes.extend_from_slice(&SIGNATURE.to_le_bytes());
        }

        bytes.extend_from_slice(&self.crc_32.to_le_bytes());

        if zip64 {
            bytes.extend_from_slice(&self.compressed_size.to_le_bytes());
            bytes.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        } else {
            bytes.extend_from_slice(&(self.compressed_size as u32).to_le_bytes());
            bytes.extend_from_slice(&(self.uncompressed_size as u32).to_le_bytes());
        }

        bytes
    }
}
