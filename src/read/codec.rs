// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! The seams through which payloads are decompressed and decrypted.
//!
//! This crate implements neither. [`Builtin`] adapts the codecs of `async-compression` enabled by this crate's
//! features; anything else is supplied by the caller.

use crate::error::Result;
use crate::read::io::compressed::CompressedReader;
use crate::spec::{Compression, EncryptionKind};

use std::pin::Pin;

use futures_lite::io::{AsyncBufRead, AsyncRead};

/// Decompresses a payload according to its compression method.
pub trait Decompressor {
    /// Wraps the compressed input in a reader which yields its decompressed contents.
    ///
    /// Unknown or unavailable methods should be reported as
    /// [`ZipError::UnsupportedCompression`](crate::error::ZipError::UnsupportedCompression).
    fn decompress<'a>(
        &self,
        method: u16,
        input: Pin<Box<dyn AsyncBufRead + 'a>>,
    ) -> Result<Pin<Box<dyn AsyncRead + 'a>>>;
}

/// Decrypts a payload according to its encryption kind.
pub trait Decryptor {
    /// Wraps the encrypted input in a reader which yields its decrypted (but still compressed) contents.
    fn decrypt<'a>(
        &self,
        kind: EncryptionKind,
        key: &[u8],
        input: Pin<Box<dyn AsyncBufRead + 'a>>,
    ) -> Result<Pin<Box<dyn AsyncRead + 'a>>>;
}

/// A [`Decompressor`] over the `async-compression` codecs enabled by this crate's features.
///
/// Stored entries are always supported.
#[derive(Debug, Default, Clone, Copy)]
pub struct Builtin;

impl Decompressor for Builtin {
    fn decompress<'a>(
        &self,
        method: u16,
        input: Pin<Box<dyn AsyncBufRead + 'a>>,
    ) -> Result<Pin<Box<dyn AsyncRead + 'a>>> {
        let compression = Compression::try_from(method)?;
        Ok(Box::pin(CompressedReader::new(input, compression)?))
    }
}
