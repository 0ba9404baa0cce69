//! Cooperative cancellation for the group loop.
//!
//! A cancel request (Ctrl-C) abandons the rest of the current group only. The
//! token is checked between instance attempts, never while a solver is running,
//! and is cleared when the next group starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::info;

/// Shared, resettable cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the group in progress.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Consume a pending request, returning whether there was one.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Route Ctrl-C (SIGINT) to `token`.
///
/// Can only be installed once per process.
pub fn install_ctrlc(token: &CancelToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        info!("interrupt received, skipping rest of current group");
        token.cancel();
    })
    .context("install Ctrl-C handler")
}
