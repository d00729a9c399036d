// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};
use crate::read::io::hashed::HashedReader;
use crate::read::resolver::ResolvedPayload;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_lite::io::{AsyncRead, AsyncReadExt};
use pin_project::pin_project;

/// A reader over an entry's decrypted and decompressed contents.
///
/// Output is hashed as it's read so the CRC32 recorded for the entry can be verified once EOF has been reached.
#[pin_project]
pub struct EntryReader<'a> {
    #[pin]
    reader: HashedReader<Pin<Box<dyn AsyncRead + 'a>>>,
    payload: ResolvedPayload,
}

impl<'a> EntryReader<'a> {
    pub(crate) fn new(reader: Pin<Box<dyn AsyncRead + 'a>>, payload: ResolvedPayload) -> Self {
        Self { reader: HashedReader::new(reader), payload }
    }

    /// Returns the resolved location and metadata of the payload being read.
    pub fn payload(&self) -> &ResolvedPayload {
        &self.payload
    }

    /// Computes and returns the CRC32 hash of bytes read by this reader so far.
    ///
    /// This hash should only be computed once EOF has been reached.
    pub fn compute_hash(&mut self) -> u32 {
        self.reader.swap_and_compute_hash()
    }

    /// Reads all bytes until EOF has been reached, appending them to buf, and verifies the CRC32 values.
    ///
    /// This is a helper function synonymous to [`AsyncReadExt::read_to_end()`].
    pub async fn read_to_end_checked(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let read = self.read_to_end(buf).await?;
        self.verify()?;

        Ok(read)
    }

    /// Reads all bytes until EOF has been reached, placing them into buf, and verifies the CRC32 values.
    ///
    /// This is a helper function synonymous to [`AsyncReadExt::read_to_string()`].
    pub async fn read_to_string_checked(&mut self, buf: &mut String) -> Result<usize> {
        let read = self.read_to_string(buf).await?;
        self.verify()?;

        Ok(read)
    }

    fn verify(&mut self) -> Result<()> {
        let read = self.reader.bytes_read();

        if self.compute_hash() != self.payload.crc32() {
            return Err(ZipError::CRC32CheckError);
        }
        if read != self.payload.uncompressed_size() {
            return Err(ZipError::Malformed(format!(
                "entry decompressed to {read} bytes but declares {}",
                self.payload.uncompressed_size()
            )));
        }

        Ok(())
    }
}

impl AsyncRead for EntryReader<'_> {
    fn poll_read(self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        self.project().reader.poll_read(c, b)
    }
}
