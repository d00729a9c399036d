// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A seekable byte source with a known length and an optional cancellation token.
//!
//! All archive IO flows through [`ByteCursor`]. Every poll first checks the token, so a source which never completes
//! a read (eg. a stalled network stream) surfaces [`ZipError::Cancelled`] once the token is cancelled rather than
//! hanging the caller.

use crate::error::{cancelled_read, Result, ZipError};

use std::future::Future;
use std::io::SeekFrom;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_lite::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

struct Cancellation {
    token: CancellationToken,
    waiter: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl Cancellation {
    fn new(token: CancellationToken) -> Self {
        let waiter = Box::pin(token.clone().cancelled_owned());
        Self { token, waiter }
    }

    /// Returns whether the token has been cancelled, registering the task to be woken if it later is.
    fn poll_cancelled(&mut self, cx: &mut Context<'_>) -> bool {
        self.token.is_cancelled() || self.waiter.as_mut().poll(cx).is_ready()
    }
}

/// A seekable byte source with a known length.
pub struct ByteCursor<R> {
    reader: R,
    length: u64,
    cancellation: Option<Cancellation>,
}

impl<R> ByteCursor<R>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    /// Wraps a seekable source, measuring its length by seeking to its end.
    pub async fn new(reader: R, token: Option<CancellationToken>) -> Result<Self> {
        let mut cursor = Self { reader, length: 0, cancellation: token.map(Cancellation::new) };
        cursor.length = cursor.seek(SeekFrom::End(0)).await?;

        tracing::trace!(length = cursor.length, "measured source");
        Ok(cursor)
    }

    /// Returns the total length of the source in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Returns whether the source holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Seeks to an absolute position.
    pub async fn seek_to(&mut self, position: u64) -> Result<()> {
        self.seek(SeekFrom::Start(position)).await?;
        Ok(())
    }

    /// Seeks relative to the current position, returning the new absolute position.
    pub async fn seek_by(&mut self, delta: i64) -> Result<u64> {
        Ok(self.seek(SeekFrom::Current(delta)).await?)
    }

    /// Reads exactly `length` bytes starting at an absolute position.
    ///
    /// The range is checked against the source's length before any IO takes place, so an offset taken from the
    /// archive can never cause a read beyond its end.
    pub async fn read_at(&mut self, position: u64, length: usize) -> Result<Vec<u8>> {
        let end = position.checked_add(length as u64).filter(|end| *end <= self.length).ok_or_else(|| {
            ZipError::Malformed(format!(
                "a read of {length} bytes at offset {position} exceeds the archive length of {}",
                self.length
            ))
        })?;

        tracing::trace!(position, end, "bounded read");
        self.seek_to(position).await?;
        crate::utils::read_bytes(&mut *self, length).await
    }

    /// Reads a fixed-size array from the current position.
    pub async fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buffer = [0; N];
        self.read_exact(&mut buffer).await?;
        Ok(buffer)
    }

    /// Reads the final `min(window, len)` bytes of the source, returning them alongside their starting offset.
    pub async fn read_tail(&mut self, window: u64) -> Result<(u64, Vec<u8>)> {
        let window = window.min(self.length);
        let start = self.length - window;
        let buffer = self.read_at(start, window as usize).await?;

        Ok((start, buffer))
    }

    /// Returns the inner source by consuming self.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> AsyncRead for ByteCursor<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<std::io::Result<usize>> {
        if self.cancellation.as_mut().is_some_and(|cancellation| cancellation.poll_cancelled(cx)) {
            return Poll::Ready(Err(cancelled_read()));
        }

        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

impl<R> AsyncSeek for ByteCursor<R>
where
    R: AsyncSeek + Unpin,
{
    fn poll_seek(mut self: Pin<&mut Self>, cx: &mut Context<'_>, pos: SeekFrom) -> Poll<std::io::Result<u64>> {
        if self.cancellation.as_mut().is_some_and(|cancellation| cancellation.poll_cancelled(cx)) {
            return Poll::Ready(Err(cancelled_read()));
        }

        Pin::new(&mut self.reader).poll_seek(cx, pos)
    }
}

/// A naive reverse linear search along the buffer for the specified signature bytes.
///
/// Returns the index of the first byte of the last match. This is already surprisingly performant. For instance,
/// using memchr::memchr() to match for the first byte of the signature, and then manual byte comparisons for the
/// remaining signature bytes was actually slower by a factor of 2.25.
pub(crate) fn reverse_search_buffer(buffer: &[u8], signature: &[u8]) -> Option<usize> {
    'outer: for index in (0..buffer.len()).rev() {
        for (signature_index, signature_byte) in signature.iter().rev().enumerate() {
            if let Some(next_index) = index.checked_sub(signature_index) {
                if buffer[next_index] != *signature_byte {
                    continue 'outer;
                }
            } else {
                break 'outer;
            }
        }
        return Some(index + 1 - signature.len());
    }
    None
}
