// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use tokio_util::sync::CancellationToken;

/// Which record is trusted for the sizes of an entry whose data descriptor flag is set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SizeAuthority {
    /// Bound the payload by the central directory's compressed size and cross-check the descriptor that follows it.
    #[default]
    CentralDirectory,
    /// Locate the descriptor by scanning forward from the payload, ignoring the central directory's sizes.
    DataDescriptor,
}

/// Options which control how an archive is read.
///
/// ```
/// # use zip_index::{ReadOptions, SizeAuthority};
/// let options = ReadOptions::default().with_strict(false).with_streamed_sizes(SizeAuthority::DataDescriptor);
/// assert!(!options.strict());
/// ```
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub(crate) strict: bool,
    pub(crate) streamed_sizes: SizeAuthority,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { strict: true, streamed_sizes: SizeAuthority::default(), cancellation: None }
    }
}

impl ReadOptions {
    /// Sets whether a disagreement between a local file header and its central directory record is an error.
    ///
    /// When lenient, the disagreement is logged and the central directory's values are used.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets which record is trusted for the sizes of streamed entries.
    pub fn with_streamed_sizes(mut self, authority: SizeAuthority) -> Self {
        self.streamed_sizes = authority;
        self
    }

    /// Sets a token which, once cancelled, fails any in-progress or subsequent IO with
    /// [`ZipError::Cancelled`](crate::error::ZipError::Cancelled).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns whether local records disagreeing with the central directory are an error.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Returns which record is trusted for the sizes of streamed entries.
    pub fn streamed_sizes(&self) -> SizeAuthority {
        self.streamed_sizes
    }

    /// Returns the cancellation token observed by every read, if any.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}
