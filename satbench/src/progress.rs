//! Per-group progress presentation.
//!
//! The group loop reports through [`ProgressObserver`] and never touches the
//! terminal itself. [`BarProgress`] draws the classic single updating line
//! (`uf20-91            17 /   20`), [`LogProgress`] emits tracing events,
//! and [`NoProgress`] discards everything.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{info, warn};

const BAR_TEMPLATE: &str = "{prefix:<16} {pos:>4} / {len:>4}{msg}";
const SKIPPED_MARKER: &str = " (Skipped)";

/// Receives progress notifications from the group loop.
pub trait ProgressObserver {
    /// A group with `total` instance files is about to run.
    fn group_started(&mut self, group: &str, total: usize);
    /// One more instance finished; `solved` of the group's `total` files are solved so far.
    fn instance_finished(&mut self, group: &str, solved: usize, total: usize);
    /// The group ended, either normally or because it was skipped by an interrupt.
    fn group_finished(&mut self, group: &str, skipped: bool);
}

type DrawTargetFn = Box<dyn Fn() -> ProgressDrawTarget>;

/// Single-line progress bar on stdout, one finished line per group.
pub struct BarProgress {
    style: ProgressStyle,
    target: DrawTargetFn,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Result<Self> {
        Self::with_draw_target(ProgressDrawTarget::stdout)
    }

    /// Draw each group's line to a target built by `target`.
    pub fn with_draw_target(target: impl Fn() -> ProgressDrawTarget + 'static) -> Result<Self> {
        let style = ProgressStyle::with_template(BAR_TEMPLATE).context("progress template")?;
        Ok(Self {
            style,
            target: Box::new(target),
            bar: None,
        })
    }
}

impl ProgressObserver for BarProgress {
    fn group_started(&mut self, group: &str, total: usize) {
        let bar = ProgressBar::with_draw_target(Some(total as u64), (self.target)());
        bar.set_style(self.style.clone());
        bar.set_prefix(group.to_string());
        bar.set_position(0);
        self.bar = Some(bar);
    }

    fn instance_finished(&mut self, _group: &str, solved: usize, _total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(solved as u64);
        }
    }

    fn group_finished(&mut self, group: &str, skipped: bool) {
        let Some(bar) = self.bar.take() else {
            return;
        };
        // indicatif draws nothing when stdout is not a terminal; keep the per-group line anyway.
        if bar.is_hidden() {
            let marker = if skipped { SKIPPED_MARKER } else { "" };
            println!(
                "{:<16} {:>4} / {:>4}{}",
                group,
                bar.position(),
                bar.length().unwrap_or_default(),
                marker
            );
            return;
        }
        // `finish` moves the position to the length; `abandon` keeps the solved count.
        if skipped {
            bar.abandon_with_message(SKIPPED_MARKER);
        } else {
            bar.abandon();
        }
    }
}

/// Progress reported as tracing events. Skipped groups are logged at `warn`.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn group_started(&mut self, group: &str, total: usize) {
        info!(group, total, "group started");
    }

    fn instance_finished(&mut self, group: &str, solved: usize, total: usize) {
        info!(group, solved, total, "instance finished");
    }

    fn group_finished(&mut self, group: &str, skipped: bool) {
        if skipped {
            warn!(group, "group skipped");
        } else {
            info!(group, "group finished");
        }
    }
}

/// Observer that ignores all notifications.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn group_started(&mut self, _group: &str, _total: usize) {}

    fn instance_finished(&mut self, _group: &str, _solved: usize, _total: usize) {}

    fn group_finished(&mut self, _group: &str, _skipped: bool) {}
}
