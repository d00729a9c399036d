// Copyright (c) 2024 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

use crate::core::raw;

pub const SIGNATURE: u32 = 0x05054b50;

raw! {
    RawDigitalSignature, SIGNATURE, {
        // size of data - 2 bytes
        size_of_data, u16
    }
}
