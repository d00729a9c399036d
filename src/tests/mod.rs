// Copyright (c) 2021 Harry [Majored] [hello@majored.pw]
// MIT License (https://github.com/Majored/rs-async-zip/blob/main/LICENSE)

pub(crate) mod read;
pub(crate) mod spec;

/// Initialize the logger for tests, forwarding `tracing` events through `log` to `env_logger`.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Trace).try_init();
}
