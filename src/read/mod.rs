// Copyright (c) 2022-2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which supports reading ZIP files.
//!
//! # Example
//! ```no_run
//! # use zip_index::{Archive, Builtin};
//! # use zip_index::error::ZipError;
//! # use futures_lite::io::Cursor;
//! #
//! # async fn run(data: Vec<u8>) -> Result<(), ZipError> {
//! let mut archive = Archive::open(Cursor::new(data)).await?;
//!
//! for entry in archive.entries().to_vec() {
//!     let mut contents = Vec::new();
//!     let mut reader = archive.open_entry(&entry, &Builtin, None).await?;
//!     reader.read_to_end_checked(&mut contents).await?;
//! }
//! #   Ok(())
//! # }
//! ```

pub mod codec;
pub mod index;
pub mod resolver;

pub(crate) mod io;
pub(crate) mod locator;

pub use crate::read::io::entry::EntryReader;
pub use crate::read::io::payload::PayloadReader;

use crate::cursor::ByteCursor;
use crate::entry::Entry;
use crate::error::{Result, ZipError};
use crate::opts::ReadOptions;
use crate::read::codec::{Decompressor, Decryptor};
use crate::read::index::ArchiveIndex;
use crate::read::resolver::ResolvedPayload;
use crate::spec::EncryptionKind;
use crate::string::ZipString;

use std::pin::Pin;

use futures_lite::io::{AsyncBufRead, AsyncRead, AsyncSeek, BufReader};

/// A ZIP archive opened over a seekable source.
///
/// Opening an archive eagerly locates its trailer and indexes its central directory. Payloads are then resolved and
/// read on demand, each read serialised through the archive's own cursor. Entries may instead be read concurrently by
/// supplying independent handles onto the same bytes to [`Archive::open_payload_on()`].
pub struct Archive<R> {
    cursor: ByteCursor<R>,
    index: ArchiveIndex,
    options: ReadOptions,
}

impl<R> Archive<R>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    /// Opens an archive with the default options.
    pub async fn open(source: R) -> Result<Self> {
        Self::open_with(source, ReadOptions::default()).await
    }

    /// Opens an archive, locating its trailer and indexing its central directory.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn open_with(source: R, options: ReadOptions) -> Result<Self> {
        let mut cursor = ByteCursor::new(source, options.cancellation.clone()).await?;
        let trailer = locator::locate(&mut cursor).await?;
        let index = index::index(&mut cursor, &trailer).await?;

        tracing::debug!(entries = index.entries.len(), "opened archive");
        Ok(Self { cursor, index, options })
    }

    /// Returns the archive's entries in central directory order.
    pub fn entries(&self) -> &[Entry] {
        &self.index.entries
    }

    /// Returns the entry at the given position in central directory order.
    pub fn entry(&self, index: usize) -> Result<&Entry> {
        self.index.entries.get(index).ok_or(ZipError::EntryIndexOutOfBounds)
    }

    /// Returns the first entry with the given name.
    ///
    /// Duplicate names are preserved by the index, so later entries of the same name are only reachable via
    /// [`Archive::entries()`].
    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.index.entries.iter().find(|entry| entry.filename().matches(name))
    }

    /// Returns the archive's immutable index.
    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Returns the archive's comment.
    pub fn comment(&self) -> &ZipString {
        self.index.comment()
    }

    /// Returns whether the archive's trailer used Zip64 records.
    pub fn zip64(&self) -> bool {
        self.index.zip64()
    }

    /// Returns the number of bytes of prefixed data (eg. a self-extracting stub) before the archive proper.
    pub fn base_offset(&self) -> u64 {
        self.index.base_offset()
    }

    /// Returns the length of the source in bytes.
    pub fn len(&self) -> u64 {
        self.cursor.len()
    }

    /// Returns whether the archive holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.entries.is_empty()
    }

    /// Returns the options the archive was opened with.
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Resolves where an entry's payload lies and which record its CRC and sizes were taken from.
    pub async fn resolve(&mut self, entry: &Entry) -> Result<ResolvedPayload> {
        resolver::resolve(&mut self.cursor, &self.index, entry, &self.options).await
    }

    /// Resolves an entry's payload with options other than those the archive was opened with.
    ///
    /// This allows a caller to recover from a recoverable error on a single entry (eg. by resolving it again leniently
    /// or with a different [`SizeAuthority`](crate::SizeAuthority)) without reopening the archive. The cancellation
    /// token given when opening the archive remains in effect.
    pub async fn resolve_with(&mut self, entry: &Entry, options: &ReadOptions) -> Result<ResolvedPayload> {
        resolver::resolve(&mut self.cursor, &self.index, entry, options).await
    }

    /// Opens a reader over an entry's compressed payload, borrowing the archive's cursor.
    pub async fn open_payload(&mut self, entry: &Entry) -> Result<PayloadReader<'_, R>> {
        let payload = resolver::resolve(&mut self.cursor, &self.index, entry, &self.options).await?;
        self.payload_reader(payload).await
    }

    /// Opens a reader over an entry's compressed payload with options other than those the archive was opened with.
    ///
    /// See [`Archive::resolve_with()`].
    pub async fn open_payload_with(&mut self, entry: &Entry, options: &ReadOptions) -> Result<PayloadReader<'_, R>> {
        let payload = resolver::resolve(&mut self.cursor, &self.index, entry, options).await?;
        self.payload_reader(payload).await
    }

    async fn payload_reader(&mut self, payload: ResolvedPayload) -> Result<PayloadReader<'_, R>> {
        self.cursor.seek_to(payload.data_offset()).await?;
        Ok(PayloadReader::new_with_borrow(&mut self.cursor, payload))
    }

    /// Opens a reader over an entry's compressed payload through an independent handle onto the same bytes.
    ///
    /// The archive is only borrowed shared, so any number of these readers may be driven concurrently.
    pub async fn open_payload_on<'s, S>(&self, source: S, entry: &Entry) -> Result<PayloadReader<'s, S>>
    where
        S: AsyncRead + AsyncSeek + Unpin + 's,
    {
        let mut cursor = ByteCursor::new(source, self.options.cancellation.clone()).await?;

        if cursor.len() != self.cursor.len() {
            return Err(ZipError::Malformed(format!(
                "independent source is {} bytes but the archive is {}",
                cursor.len(),
                self.cursor.len()
            )));
        }

        let payload = resolver::resolve(&mut cursor, &self.index, entry, &self.options).await?;
        cursor.seek_to(payload.data_offset()).await?;

        Ok(PayloadReader::new_with_owned(cursor, payload))
    }

    /// Opens a reader over an entry's contents, decrypting and decompressing its payload.
    ///
    /// A decryptor and key must be supplied for encrypted entries. The returned reader verifies the entry's CRC32 via
    /// [`EntryReader::read_to_end_checked()`].
    pub async fn open_entry<'a>(
        &'a mut self,
        entry: &Entry,
        decompressor: &dyn Decompressor,
        decryption: Option<(&dyn Decryptor, &[u8])>,
    ) -> Result<EntryReader<'a>> {
        let kind = entry.encryption()?;
        let decryption = match (kind, decryption) {
            (EncryptionKind::None, _) => None,
            (_, Some(decryption)) => Some(decryption),
            (kind, None) => return Err(ZipError::Unsupported(format!("{kind:?} encrypted entry without a decryptor"))),
        };

        let payload = self.open_payload(entry).await?;
        let resolved = *payload.payload();
        let input: Pin<Box<dyn AsyncBufRead + 'a>> = Box::pin(payload);

        let input: Pin<Box<dyn AsyncBufRead + 'a>> = match decryption {
            Some((decryptor, key)) => Box::pin(BufReader::new(decryptor.decrypt(kind, key, input)?)),
            None => input,
        };

        Ok(EntryReader::new(decompressor.decompress(entry.compression_method(), input)?, resolved))
    }

    /// Consumes the archive and returns the inner source.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }
}
