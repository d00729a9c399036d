// Copyright (c) 2022 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

#[cfg(feature = "chrono")]
use chrono::{TimeZone, Utc};

use crate::ZipDateTime;

#[test]
#[cfg(feature = "chrono")]
fn date_conversion_test_chrono() {
    let original_dt = Utc.timestamp_opt(1666544102, 0).unwrap();
    let zip_dt = ZipDateTime::from_chrono(&original_dt);
    let result_dt = zip_dt.as_chrono().single().expect("expected single unique result");
    assert_eq!(result_dt, original_dt);
}

#[test]
#[cfg(feature = "chrono")]
fn date_conversion_test_chrono_clamps_year() {
    let original_dt = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(ZipDateTime::from_chrono(&original_dt).year(), 1980);
}

#[test]
fn date_conversion_test() {
    // 2024-09-08 13:26:20
    let built = ZipDateTime::from_raw(0x5928, 0x6B4A);

    assert_eq!(built.year(), 2024);
    assert_eq!(built.month(), 9);
    assert_eq!(built.day(), 8);
    assert_eq!(built.hour(), 13);
    assert_eq!(built.minute(), 26);
    assert_eq!(built.second(), 20);

    assert_eq!(built.raw_date(), 0x5928);
    assert_eq!(built.raw_time(), 0x6B4A);
}
