// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::GeneralPurposeFlags;
use crate::date::ZipDateTime;
use crate::error::{Result, ZipError};
use crate::spec::{Compression, EncryptionKind};
use crate::string::ZipString;

/// An entry within an archive, as described by its central directory record.
///
/// Any 32-bit size or offset which deferred to a Zip64 extra field has already been replaced by its 64-bit override.
/// Entries are immutable and hold no reference to the archive's source, so they may be cloned and shared freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub(crate) filename: ZipString,
    pub(crate) compression_method: u16,
    pub(crate) flags: GeneralPurposeFlags,
    pub(crate) crc32: u32,
    pub(crate) compressed_size: u64,
    pub(crate) uncompressed_size: u64,
    pub(crate) last_modification_date: ZipDateTime,
    pub(crate) version_made_by: u16,
    pub(crate) version_needed: u16,
    pub(crate) internal_file_attribute: u16,
    pub(crate) external_file_attribute: u32,
    pub(crate) extra_field: Vec<u8>,
    pub(crate) comment: ZipString,
    pub(crate) local_header_offset: u64,
    pub(crate) zip64: bool,
    pub(crate) defect: Option<String>,
}

impl Entry {
    /// Returns the entry's filename.
    ///
    /// # Note
    /// This will return the raw filename stored during ZIP creation. If calling this method on entries retrieved from
    /// untrusted ZIP files, the filename should be sanitised before being used as a path to prevent [directory
    /// travesal attacks](https://en.wikipedia.org/wiki/Directory_traversal_attack).
    pub fn filename(&self) -> &ZipString {
        &self.filename
    }

    /// Returns the entry's raw compression method.
    pub fn compression_method(&self) -> u16 {
        self.compression_method
    }

    /// Returns the entry's compression method, if it is one this crate recognises.
    pub fn compression(&self) -> Result<Compression> {
        Compression::try_from(self.compression_method)
    }

    /// Returns the entry's general purpose flags.
    pub fn flags(&self) -> GeneralPurposeFlags {
        self.flags
    }

    /// Classifies the entry's encryption from its general purpose flags.
    pub fn encryption(&self) -> Result<EncryptionKind> {
        EncryptionKind::classify(self.flags)
    }

    /// Returns the entry's CRC32 value.
    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Returns the entry's compressed size.
    pub fn compressed_size(&self) -> u64 {
        self.compressed_size
    }

    /// Returns the entry's uncompressed size.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Returns the entry's last modification time & date.
    pub fn last_modification_date(&self) -> &ZipDateTime {
        &self.last_modification_date
    }

    /// Returns the version and host system of the software which wrote the entry.
    pub fn version_made_by(&self) -> u16 {
        self.version_made_by
    }

    /// Returns the minimum version needed to extract the entry.
    pub fn version_needed(&self) -> u16 {
        self.version_needed
    }

    /// Returns the entry's internal file attribute.
    pub fn internal_file_attribute(&self) -> u16 {
        self.internal_file_attribute
    }

    /// Returns the entry's external file attribute
    pub fn external_file_attribute(&self) -> u32 {
        self.external_file_attribute
    }

    /// Returns the entry's raw extra field blob.
    pub fn extra_field(&self) -> &[u8] {
        &self.extra_field
    }

    /// Returns the entry's file comment.
    pub fn comment(&self) -> &ZipString {
        &self.comment
    }

    /// Returns the offset of the entry's local file header, as declared by the central directory.
    ///
    /// This is relative to the start of the archive proper, not the source; see
    /// [`Archive::base_offset()`](crate::Archive::base_offset).
    pub fn local_header_offset(&self) -> u64 {
        self.local_header_offset
    }

    /// Whether any of this entry's fields were taken from a Zip64 extra field.
    pub fn zip64(&self) -> bool {
        self.zip64
    }

    /// Whether the entry's CRC and sizes were deferred to a data descriptor following its payload.
    pub fn is_streamed(&self) -> bool {
        self.flags.data_descriptor()
    }

    /// Returns whether or not the entry represents a directory.
    pub fn is_dir(&self) -> bool {
        self.filename.as_bytes().ends_with(b"/")
    }

    /// Returns why this entry could not be fully resolved while indexing, if it couldn't.
    pub fn defect(&self) -> Option<&str> {
        self.defect.as_deref()
    }

    /// Fails with the entry's recorded defect, if any.
    pub(crate) fn check(&self) -> Result<()> {
        match &self.defect {
            Some(defect) => Err(ZipError::Malformed(defect.clone())),
            None => Ok(()),
        }
    }
}
