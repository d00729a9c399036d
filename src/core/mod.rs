// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! Pure encoding and decoding of each fixed-layout ZIP record.
//!
//! Nothing within this module performs IO. Each record decodes from the start of a byte slice, asserting its
//! signature before any other field, and reports the lengths of any variable-length fields which follow it so that
//! callers can fetch exactly those bytes.
//!
//! <https://pkware.cachefly.net/webdocs/casestudies/APPNOTE.TXT>

pub mod cdr;
pub mod dd;
pub mod dsig;
pub mod edf;
pub mod eocdr;
pub mod lfh;
pub mod zip64;

/// The length in bytes of a signature. All signatures are u32s, so 4 bytes long.
pub const SIGNATURE_LENGTH: usize = 4;

/// The 32-bit sentinel which defers a size or offset to a Zip64 record.
pub const NON_ZIP64_MAX_SIZE: u32 = 0xFFFFFFFF;

/// The 16-bit sentinel which defers an entry count or disk number to a Zip64 record.
pub const NON_ZIP64_MAX_NUM_FILES: u16 = 0xFFFF;

/// The signature of the archive extra data record, which precedes an encrypted central directory.
pub const ARCHIVE_EXTRA_DATA_SIGNATURE: u32 = 0x08064b50;

/// The general purpose bit flag shared by local file headers and central directory records.
///
/// <https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#444>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeneralPurposeFlags(pub u16);

impl GeneralPurposeFlags {
    pub const ENCRYPTED: u16 = 1 << 0;
    pub const DATA_DESCRIPTOR: u16 = 1 << 3;
    pub const STRONG_ENCRYPTION: u16 = 1 << 6;
    pub const UTF8: u16 = 1 << 11;

    /// Whether the sizes and CRC were deferred to a data descriptor following the payload.
    pub fn data_descriptor(&self) -> bool {
        self.0 & Self::DATA_DESCRIPTOR != 0
    }

    /// Whether the file name and comment are encoded as UTF-8.
    pub fn utf8(&self) -> bool {
        self.0 & Self::UTF8 != 0
    }
}

macro_rules! raw {
    ($name:ident, $signature:expr, { $($field:ident, $type:ty),* }) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            $(pub $field : $type),*
        }

        impl $name {
            pub const SIGNATURE: u32 = $signature;

            /// The fixed length of this record in bytes, including its signature.
            pub const LENGTH: usize = crate::core::SIGNATURE_LENGTH $(+ std::mem::size_of::<$type>())*;

            /// Decodes the fixed-length portion of this record from the start of the given bytes.
            ///
            /// The signature is asserted before any other field is read.
            pub fn decode(bytes: &[u8]) -> crate::error::Result<Self> {
                let mut reader = crate::utils::FieldReader::new(bytes);
                reader.signature(Self::SIGNATURE)?;

                Ok(Self {
                    $($field : reader.read::<$type>()?),*
                })
            }

            /// Encodes the fixed-length portion of this record, including its signature.
            pub fn encode(&self) -> Vec<u8> {
                let mut bytes = Vec::with_capacity(Self::LENGTH);
                bytes.extend_from_slice(&Self::SIGNATURE.to_le_bytes());
                $(bytes.extend_from_slice(&self.$field.to_le_bytes());)*
                bytes
            }
        }
    };
}

pub(crate) use raw;
