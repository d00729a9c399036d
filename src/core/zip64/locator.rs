// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::raw;

pub const SIGNATURE: u32 = 0x07064b50;

raw! {
    RawZip64EndOfCentralDirectoryLocator, SIGNATURE, {
        // number of the disk with the start of the zip64 end of central directory - 4 bytes
        disk_with_start_eocdr, u32,
        // relative offset of the zip64 end of central directory record - 8 bytes
        relative_offset_eocdr, u64,
        // total number of disks - 4 bytes
        total_disks, u32
    }
}
