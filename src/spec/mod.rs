// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub mod compression;
pub mod encryption;

pub use compression::Compression;
pub use encryption::EncryptionKind;
