//! Stable exit codes for the satbench CLI.

/// The run (or `--list`) completed. Timeouts and skipped groups still exit with `OK`.
pub const OK: i32 = 0;
/// Invalid configuration, unreadable corpus, malformed group name, or solver spawn failure.
pub const INVALID: i32 = 1;
