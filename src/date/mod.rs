// Copyright (c) 2021-2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#[cfg(feature = "chrono")]
use chrono::{DateTime, Datelike, LocalResult, TimeZone, Timelike, Utc};

// https://github.com/Majored/rs-async-zip/blob/main/SPECIFICATION.md#446
// https://learn.microsoft.com/en-us/windows/win32/api/oleauto/nf-oleauto-dosdatetimetovarianttime

/// A date and time stored as per the MS-DOS representation used by ZIP files.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ZipDateTime {
    pub(crate) date: u16,
    pub(crate) time: u16,
}

impl ZipDateTime {
    /// Constructs a date and time from its raw MS-DOS date and time fields.
    pub fn from_raw(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Returns the raw MS-DOS date field.
    pub fn raw_date(&self) -> u16 {
        self.date
    }

    /// Returns the raw MS-DOS time field.
    pub fn raw_time(&self) -> u16 {
        self.time
    }

    /// Returns the year of this date & time.
    pub fn year(&self) -> i32 {
        (((self.date & 0xFE00) >> 9) + 1980).into()
    }

    /// Returns the month of this date & time.
    pub fn month(&self) -> u32 {
        ((self.date & 0x1E0) >> 5).into()
    }

    /// Returns the day of this date & time.
    pub fn day(&self) -> u32 {
        (self.date & 0x1F).into()
    }

    /// Returns the hour of this date & time.
    pub fn hour(&self) -> u32 {
        ((self.time & 0xF800) >> 11).into()
    }

    /// Returns the minute of this date & time.
    pub fn minute(&self) -> u32 {
        ((self.time & 0x7E0) >> 5).into()
    }

    /// Returns the second of this date & time.
    ///
    /// Note that MS-DOS has a maximum granularity of two seconds.
    pub fn second(&self) -> u32 {
        ((self.time & 0x1F) << 1).into()
    }

    /// Constructs chrono's [`DateTime`] representation of this date & time.
    ///
    /// Note that this requires the `chrono` feature.
    #[cfg(feature = "chrono")]
    pub fn as_chrono(&self) -> LocalResult<DateTime<Utc>> {
        self.into()
    }

    /// Constructs this date & time from chrono's [`DateTime`] representation.
    ///
    /// Years outside of the representable range (1980 to 2107) are clamped. Note that this requires the `chrono`
    /// feature.
    #[cfg(feature = "chrono")]
    pub fn from_chrono(dt: &DateTime<Utc>) -> Self {
        dt.into()
    }
}

#[cfg(feature = "chrono")]
impl From<&DateTime<Utc>> for ZipDateTime {
    fn from(value: &DateTime<Utc>) -> Self {
        let date = value.date_naive();
        let time = value.time();

        let year = (date.year().clamp(1980, 2107) - 1980) as u16;
        let date = (year << 9) | ((date.month() as u16) << 5) | date.day() as u16;
        let time = ((time.hour() as u16) << 11) | ((time.minute() as u16) << 5) | (time.second() as u16 >> 1);

        Self { date, time }
    }
}

#[cfg(feature = "chrono")]
impl From<&ZipDateTime> for LocalResult<DateTime<Utc>> {
    fn from(value: &ZipDateTime) -> Self {
        Utc.with_ymd_and_hms(value.year(), value.month(), value.day(), value.hour(), value.minute(), value.second())
    }
}

#[cfg(feature = "chrono")]
impl From<DateTime<Utc>> for ZipDateTime {
    fn from(value: DateTime<Utc>) -> Self {
        (&value).into()
    }
}

#[cfg(feature = "chrono")]
impl From<ZipDateTime> for LocalResult<DateTime<Utc>> {
    fn from(value: ZipDateTime) -> Self {
        (&value).into()
    }
}
