// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::ZipError;
use crate::{EncryptionKind, GeneralPurposeFlags};

#[test]
fn classify_encryption() {
    assert_eq!(EncryptionKind::classify(GeneralPurposeFlags(0x0808)).unwrap(), EncryptionKind::None);
    assert_eq!(EncryptionKind::classify(GeneralPurposeFlags(0x0001)).unwrap(), EncryptionKind::Weak);
    assert_eq!(EncryptionKind::classify(GeneralPurposeFlags(0x0041)).unwrap(), EncryptionKind::Strong);

    assert!(!EncryptionKind::None.is_encrypted());
    assert!(EncryptionKind::Weak.is_encrypted());
}

#[test]
fn strong_bit_alone_is_malformed() {
    assert!(matches!(EncryptionKind::classify(GeneralPurposeFlags(0x0040)), Err(ZipError::Malformed(_))));
}
