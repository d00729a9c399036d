// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};

use futures_lite::io::{AsyncRead, AsyncReadExt};

/// A fixed-width little-endian integer which may appear within a ZIP record.
pub(crate) trait LeField: Sized {
    const SIZE: usize;

    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! le_field {
    ($($type:ty),*) => {
        $(
            impl LeField for $type {
                const SIZE: usize = std::mem::size_of::<$type>();

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buffer = [0; std::mem::size_of::<$type>()];
                    buffer.copy_from_slice(&bytes[..Self::SIZE]);
                    <$type>::from_le_bytes(buffer)
                }
            }
        )*
    };
}

le_field!(u8, u16, u32, u64);

/// A forward-only reader over a byte slice used when decoding records.
///
/// Every read is bounds-checked; running off the end of the slice is reported as [`ZipError::Malformed`] rather than
/// panicking, as the slice lengths are ultimately attacker-controlled.
pub(crate) struct FieldReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub(crate) fn read<T: LeField>(&mut self) -> Result<T> {
        Ok(T::from_le_slice(self.take(T::SIZE)?))
    }

    /// Reads a four-byte signature and asserts that it matches the expected value.
    pub(crate) fn signature(&mut self, expected: u32) -> Result<()> {
        match self.read::<u32>()? {
            actual if actual == expected => Ok(()),
            actual => Err(ZipError::BadSignature { expected, found: actual }),
        }
    }

    pub(crate) fn take(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(length).filter(|end| *end <= self.bytes.len()).ok_or_else(|| {
            ZipError::Malformed(format!(
                "record truncated: {length} bytes requested at byte {} of {}",
                self.position,
                self.bytes.len()
            ))
        })?;

        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }
}

/// Read and return an exact length vector of bytes from a reader which impls AsyncRead.
///
/// Unlike a plain `take().read_to_end()`, a short read is reported as [`std::io::ErrorKind::UnexpectedEof`].
pub(crate) async fn read_bytes(reader: impl AsyncRead + Unpin, length: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(length);
    reader.take(length as u64).read_to_end(&mut buffer).await?;

    if buffer.len() != length {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }

    Ok(buffer)
}
