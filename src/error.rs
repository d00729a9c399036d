// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

//! A module which holds relevant error reporting structures/types.

use std::fmt::{Display, Formatter};

use thiserror::Error;

/// A Result type alias over ZipError to minimise repetition.
pub type Result<V> = std::result::Result<V, ZipError>;

/// An enum of possible errors and their descriptions.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("unable to locate the end of central directory record")]
    NotAZipArchive,
    #[error("encountered an unexpected signature (expected: {expected:#x}, found: {found:#x})")]
    BadSignature { expected: u32, found: u32 },
    #[error("malformed archive: {0}")]
    Malformed(String),
    #[error("central directory declares {declared} entries but only {found} could be read")]
    TruncatedCentralDirectory { declared: u64, found: u64 },
    #[error("{field} differs between the central directory ({central}) and the local file header ({local})")]
    InconsistentMetadata { field: &'static str, central: String, local: String },
    #[error("unable to unambiguously locate the data descriptor of a streamed entry ({candidates} candidates)")]
    AmbiguousStreamedEntry { candidates: usize },
    #[error("the operation was cancelled")]
    Cancelled,

    #[error("feature not supported: '{0}'")]
    Unsupported(String),
    #[error("compression not supported: {0}")]
    UnsupportedCompression(u16),

    #[error("an upstream reader returned an error: {0}")]
    UpstreamReadError(#[source] std::io::Error),
    #[error("a computed CRC32 value did not match the expected value")]
    CRC32CheckError,
    #[error("entry index was out of bounds")]
    EntryIndexOutOfBounds,
    #[error("attempted to convert non-UTF8 bytes to a string/str")]
    StringNotUtf8,
}

impl ZipError {
    /// Returns whether the caller may choose to continue after this error.
    ///
    /// Both recoverable kinds are raised per entry once the archive has been indexed, and the same archive may go on
    /// to read the entry via [`Archive::resolve_with()`](crate::Archive::resolve_with) or
    /// [`Archive::open_payload_with()`](crate::Archive::open_payload_with). An [`ZipError::InconsistentMetadata`]
    /// entry can still be read by trusting the central directory (see
    /// [`ReadOptions::with_strict()`](crate::ReadOptions::with_strict)), and an
    /// [`ZipError::AmbiguousStreamedEntry`] may be retried with a different
    /// [`SizeAuthority`](crate::SizeAuthority).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ZipError::InconsistentMetadata { .. } | ZipError::AmbiguousStreamedEntry { .. })
    }
}

impl From<std::io::Error> for ZipError {
    fn from(err: std::io::Error) -> Self {
        if err.get_ref().is_some_and(|inner| inner.is::<CancelledRead>()) {
            return ZipError::Cancelled;
        }

        ZipError::UpstreamReadError(err)
    }
}

/// The payload of an IO error raised when a cursor observes its cancellation token.
///
/// IO traits can only surface [`std::io::Error`], so this marker is carried inside one and turned back into
/// [`ZipError::Cancelled`] by the [`From`] implementation above.
#[derive(Debug)]
pub(crate) struct CancelledRead;

impl Display for CancelledRead {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "read cancelled")
    }
}

impl std::error::Error for CancelledRead {}

pub(crate) fn cancelled_read() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, CancelledRead)
}
