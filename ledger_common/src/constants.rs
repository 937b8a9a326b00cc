//! Simulation defaults

pub const DEFAULT_ACCOUNTS: usize = 100;
pub const DEFAULT_INITIAL_BALANCE: i64 = 1000;
pub const DEFAULT_TRANSFERS: usize = 1000;
pub const DEFAULT_JITTER_MS: u64 = 0;

/// Log target prefix used by the CLI's default `RUST_LOG`
pub const LOG_TARGET: &str = "ledger";
