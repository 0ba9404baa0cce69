//! Diagnostic tracing for the harness.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics via `RUST_LOG`, output to stderr.
//!   Not part of the benchmark results.
//!
//! - **Progress and summary (`progress`, `main`)**: the live per-group line and
//!   the final `Summary:` line on stdout. Always printed, unaffected by `RUST_LOG`.
//!
//! - **Result file (`output`)**: per-instance rows, only when `--output` is set.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn";
/// Filter used with `--quiet`, where tracing carries the progress events.
const QUIET_FILTER: &str = "warn,satbench=info";

fn default_filter(quiet: bool) -> &'static str {
    if quiet { QUIET_FILTER } else { DEFAULT_FILTER }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, plus the
/// harness's own progress events when `quiet` is set.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=satbench=debug cargo run -p satbench -- --filter '^uf'
/// ```
pub fn init(quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(quiet)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
