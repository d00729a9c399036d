// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::GeneralPurposeFlags;
use crate::error::{Result, ZipError};

/// The encryption scheme applied to an entry's payload, as declared by its general purpose flags.
///
/// This crate never decrypts; the classification exists so a caller can pick a
/// [`Decryptor`](crate::Decryptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncryptionKind {
    None,
    /// Traditional PKWARE encryption (bit 0 only).
    Weak,
    /// Strong encryption (bits 0 and 6).
    Strong,
}

impl EncryptionKind {
    /// Classifies the encryption declared by the given flags.
    ///
    /// The strong encryption bit without the encrypted bit is contradictory and so malformed.
    pub fn classify(flags: GeneralPurposeFlags) -> Result<Self> {
        const MASK: u16 = GeneralPurposeFlags::ENCRYPTED | GeneralPurposeFlags::STRONG_ENCRYPTION;

        match flags.0 & MASK {
            0 => Ok(EncryptionKind::None),
            GeneralPurposeFlags::ENCRYPTED => Ok(EncryptionKind::Weak),
            MASK => Ok(EncryptionKind::Strong),
            _ => Err(ZipError::Malformed(format!(
                "general purpose flags {:#06x} declare strong encryption without the encrypted bit",
                flags.0
            ))),
        }
    }

    /// Returns whether the entry is encrypted in any way.
    pub fn is_encrypted(&self) -> bool {
        !matches!(self, EncryptionKind::None)
    }
}
