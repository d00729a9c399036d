// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::cursor::ByteCursor;
use crate::read::resolver::ResolvedPayload;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_lite::io::{AsyncBufRead, AsyncRead, AsyncReadExt, BufReader, Take};
use pin_project::pin_project;

/// A wrapping reader which holds an owned cursor or a mutable borrow to one.
///
/// A borrow serialises payload reads through the archive's own cursor, whereas an owned cursor wraps an independent
/// handle onto the same bytes and so may be read alongside others.
#[pin_project(project = PayloadSourceProj)]
pub(crate) enum PayloadSource<'a, R> {
    Owned(#[pin] BufReader<ByteCursor<R>>),
    Borrow(#[pin] BufReader<&'a mut ByteCursor<R>>),
}

impl<R> AsyncBufRead for PayloadSource<'_, R>
where
    R: AsyncRead + Unpin,
{
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<&[u8]>> {
        match self.project() {
            PayloadSourceProj::Owned(inner) => inner.poll_fill_buf(cx),
            PayloadSourceProj::Borrow(inner) => inner.poll_fill_buf(cx),
        }
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        match self.project() {
            PayloadSourceProj::Owned(inner) => inner.consume(amt),
            PayloadSourceProj::Borrow(inner) => inner.consume(amt),
        }
    }
}

impl<R> AsyncRead for PayloadSource<'_, R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        match self.project() {
            PayloadSourceProj::Owned(inner) => inner.poll_read(c, b),
            PayloadSourceProj::Borrow(inner) => inner.poll_read(c, b),
        }
    }
}

/// A reader over exactly the compressed bytes of a single entry's payload.
///
/// No decompression or decryption takes place; see [`Archive::open_entry()`](crate::Archive::open_entry) for that.
#[pin_project]
pub struct PayloadReader<'a, R> {
    #[pin]
    reader: Take<PayloadSource<'a, R>>,
    payload: ResolvedPayload,
}

impl<'a, R> PayloadReader<'a, R>
where
    R: AsyncRead + Unpin,
{
    /// Constructs a payload reader over an owned cursor already positioned at the payload's start.
    pub(crate) fn new_with_owned(cursor: ByteCursor<R>, payload: ResolvedPayload) -> Self {
        let reader = PayloadSource::Owned(BufReader::new(cursor)).take(payload.compressed_size());
        Self { reader, payload }
    }

    /// Constructs a payload reader over a borrowed cursor already positioned at the payload's start.
    pub(crate) fn new_with_borrow(cursor: &'a mut ByteCursor<R>, payload: ResolvedPayload) -> Self {
        let reader = PayloadSource::Borrow(BufReader::new(cursor)).take(payload.compressed_size());
        Self { reader, payload }
    }

    /// Returns the resolved location and metadata of the payload being read.
    pub fn payload(&self) -> &ResolvedPayload {
        &self.payload
    }

    /// Returns the number of compressed bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.reader.limit()
    }
}

impl<R> AsyncRead for PayloadReader<'_, R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(self: Pin<&mut Self>, c: &mut Context<'_>, b: &mut [u8]) -> Poll<std::io::Result<usize>> {
        self.project().reader.poll_read(c, b)
    }
}

impl<R> AsyncBufRead for PayloadReader<'_, R>
where
    R: AsyncRead + Unpin,
{
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<&[u8]>> {
        self.project().reader.poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        self.project().reader.consume(amt)
    }
}
