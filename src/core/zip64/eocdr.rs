// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::raw;

pub const SIGNATURE: u32 = 0x06064b50;

raw! {
    RawZip64EndOfCentralDirectoryRecord, SIGNATURE, {
        // size of zip64 end of central directory record - 8 bytes
        size_of_record, u64,
        // version made by - 2 bytes
        version_made_by, u16,
        // version needed to extract - 2 bytes
        version_needed, u16,
        // number of this disk - 4 bytes
        number_of_this_disk, u32,
        // number of the disk with the start of the central directory - 4 bytes
        disk_with_start_of_cd, u32,
        // total number of entries in the central directory on this disk - 8 bytes
        entries_on_this_disk, u64,
        // total number of entries in the central directory - 8 bytes
        total_entries, u64,
        // size of the central directory - 8 bytes
        size_of_cd, u64,
        // offset of start of central directory with respect to the starting disk number - 8 bytes
        offset_of_cd, u64
    }
}

impl RawZip64EndOfCentralDirectoryRecord {
    /// The value of `size_of_record` for a record without an extensible data sector.
    ///
    /// The field excludes the signature and itself.
    pub const FIXED_SIZE_OF_RECORD: u64 = (Self::LENGTH - 12) as u64;
}
