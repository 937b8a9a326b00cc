/// Exit statuses

pub const EXIT_OK: u8 = 0;
pub const EXIT_INVARIANT_VIOLATED: u8 = 1;
pub const EXIT_INVALID_CONFIG: u8 = 2;
pub const EXIT_IO_ERROR: u8 = 3;

/// Various CLI constants

pub const RUST_LOG: &str = "RUST_LOG";
