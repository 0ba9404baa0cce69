//! Runs every instance of one group through the solver.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::cancel::CancelToken;
use crate::corpus::TestGroup;
use crate::progress::ProgressObserver;
use crate::solver::{Outcome, SolveRequest, Solver};
use crate::tally::Tally;

/// Solver settings shared by every instance in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSettings {
    pub timeout: Duration,
    pub jobs: Option<u32>,
}

/// Outcome for one attempted instance file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceResult {
    /// File name relative to the group directory.
    pub file: String,
    pub outcome: Outcome,
}

/// Summary of one group pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRun {
    /// Counts only the instances actually attempted.
    pub tally: Tally,
    /// A cancel request cut the group short.
    pub interrupted: bool,
}

/// Run the group's instances in listing order until done or cancelled.
///
/// A pending cancel request from before the group started is discarded. The
/// token is checked before each attempt; once set, the remaining files are
/// neither attempted nor handed to `on_result`. No instance is retried.
#[instrument(skip_all, fields(group = %group.name, files = group.len()))]
pub fn run_group<S, P, F>(
    group: &TestGroup,
    settings: &GroupSettings,
    solver: &S,
    cancel: &CancelToken,
    progress: &mut P,
    mut on_result: F,
) -> Result<GroupRun>
where
    S: Solver + ?Sized,
    P: ProgressObserver + ?Sized,
    F: FnMut(&InstanceResult) -> Result<()>,
{
    let total = group.len();
    let mut tally = Tally::new();
    let mut interrupted = false;

    cancel.reset();
    info!("group started");
    progress.group_started(&group.name, total);

    for path in &group.files {
        if cancel.take() {
            interrupted = true;
            break;
        }

        let outcome = solver.solve(&SolveRequest {
            instance: path,
            jobs: settings.jobs,
            timeout: settings.timeout,
        })?;
        tally.record(&outcome);

        let result = InstanceResult {
            file: file_name(path),
            outcome,
        };
        debug!(file = %result.file, ?outcome, "instance finished");
        on_result(&result)?;
        progress.instance_finished(&group.name, tally.solved(), total);
    }

    progress.group_finished(&group.name, interrupted);
    if interrupted {
        info!(
            attempted = tally.total(),
            abandoned = total - tally.total(),
            "group skipped"
        );
    } else {
        info!(solved = tally.solved(), total = tally.total(), "group finished");
    }

    Ok(GroupRun { tally, interrupted })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
