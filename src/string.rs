// Copyright (c) 2023 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::error::{Result, ZipError};

/// A string encoding supported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    Utf8,
    Raw,
}

/// A file name or comment as stored within an archive.
///
/// The bytes are kept exactly as found. When a record's UTF-8 flag was clear but an Info-ZIP Unicode extra field
/// carried a verified UTF-8 rendition, that rendition is exposed via [`ZipString::alternative()`] and preferred by
/// [`ZipString::as_str()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipString {
    encoding: StringEncoding,
    raw: Vec<u8>,
    alternative: Option<String>,
}

impl ZipString {
    /// Constructs a new encoded string from its raw bytes and its encoding type.
    ///
    /// # Note
    /// If the provided encoding is [`StringEncoding::Utf8`] but the raw bytes are not valid UTF-8, the encoding is
    /// defaulted back to [`StringEncoding::Raw`].
    pub fn new(raw: Vec<u8>, mut encoding: StringEncoding) -> Self {
        if encoding == StringEncoding::Utf8 && std::str::from_utf8(&raw).is_err() {
            encoding = StringEncoding::Raw;
        }

        Self { encoding, raw, alternative: None }
    }

    /// Constructs a string from raw bytes alongside a UTF-8 rendition taken from an extra field.
    pub fn new_with_alternative(raw: Vec<u8>, encoding: StringEncoding, alternative: String) -> Self {
        Self { alternative: Some(alternative), ..Self::new(raw, encoding) }
    }

    /// Returns the raw bytes for this string, as stored in the record.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Returns the encoding type of the raw bytes.
    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Returns the UTF-8 rendition provided by an Info-ZIP Unicode extra field, if any.
    pub fn alternative(&self) -> Option<&str> {
        self.alternative.as_deref()
    }

    /// Returns this string as a string slice.
    ///
    /// # Note
    /// A call to this method will only succeed if a UTF-8 alternative exists or the encoding type is
    /// [`StringEncoding::Utf8`].
    pub fn as_str(&self) -> Result<&str> {
        if let Some(alternative) = &self.alternative {
            return Ok(alternative);
        }

        match self.encoding {
            StringEncoding::Utf8 => std::str::from_utf8(&self.raw).map_err(|_| ZipError::StringNotUtf8),
            StringEncoding::Raw => Err(ZipError::StringNotUtf8),
        }
    }

    /// Returns this string converted to an owned string.
    ///
    /// # Note
    /// A call to this method will only succeed under the same conditions as [`ZipString::as_str()`].
    pub fn into_string(self) -> Result<String> {
        if let Some(alternative) = self.alternative {
            return Ok(alternative);
        }

        match self.encoding {
            StringEncoding::Utf8 => String::from_utf8(self.raw).map_err(|_| ZipError::StringNotUtf8),
            StringEncoding::Raw => Err(ZipError::StringNotUtf8),
        }
    }

    /// Whether this string matches the given name, by its UTF-8 rendition where one exists.
    pub fn matches(&self, name: &str) -> bool {
        match self.as_str() {
            Ok(value) => value == name,
            Err(_) => self.raw == name.as_bytes(),
        }
    }
}

impl Default for ZipString {
    fn default() -> Self {
        Self { encoding: StringEncoding::Utf8, raw: Vec::new(), alternative: None }
    }
}

impl From<String> for ZipString {
    fn from(value: String) -> Self {
        Self { encoding: StringEncoding::Utf8, raw: value.into_bytes(), alternative: None }
    }
}

impl From<&str> for ZipString {
    fn from(value: &str) -> Self {
        Self { encoding: StringEncoding::Utf8, raw: value.as_bytes().to_vec(), alternative: None }
    }
}
