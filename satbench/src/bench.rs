//! Run-wide loop over the ordered groups.

use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::corpus::{TestGroup, load_corpus};
use crate::group::run_group;
use crate::output::ResultWriter;
use crate::progress::ProgressObserver;
use crate::solver::Solver;
use crate::tally::Tally;

/// Per-group line of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub name: String,
    pub tally: Tally,
    pub skipped: bool,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Run-wide tally over attempted instances only.
    pub tally: Tally,
    pub groups: Vec<GroupReport>,
}

impl RunReport {
    pub fn skipped_groups(&self) -> usize {
        self.groups.iter().filter(|g| g.skipped).count()
    }
}

/// Load the corpus once, then run every matching group in key order.
///
/// An interrupted group contributes only its attempted instances and the run
/// moves on to the next group; an interrupt never ends the run. Corpus, solver
/// spawn and output errors abort the run.
#[instrument(skip_all, fields(data = %config.data.display()))]
pub fn run_bench<S, P, W>(
    config: &RunConfig,
    solver: &S,
    cancel: &CancelToken,
    progress: &mut P,
    writer: Option<&mut ResultWriter<W>>,
) -> Result<RunReport>
where
    S: Solver + ?Sized,
    P: ProgressObserver + ?Sized,
    W: Write,
{
    let groups = load_corpus(&config.data, &config.filter)?;
    info!(groups = groups.len(), "corpus loaded");
    run_groups(&groups, config, solver, cancel, progress, writer)
}

/// Drive the group loop over an already-loaded, ordered group list.
pub fn run_groups<S, P, W>(
    groups: &[TestGroup],
    config: &RunConfig,
    solver: &S,
    cancel: &CancelToken,
    progress: &mut P,
    mut writer: Option<&mut ResultWriter<W>>,
) -> Result<RunReport>
where
    S: Solver + ?Sized,
    P: ProgressObserver + ?Sized,
    W: Write,
{
    let settings = config.group_settings();
    let mut report = RunReport::default();

    for group in groups {
        let run = run_group(group, &settings, solver, cancel, progress, |result| {
            match writer.as_deref_mut() {
                Some(w) => w.write(result),
                None => Ok(()),
            }
        })
        .with_context(|| format!("run group {}", group.name))?;

        if let Some(w) = writer.as_deref_mut() {
            w.flush()
                .with_context(|| format!("flush results for {}", group.name))?;
        }

        report.tally.absorb(&run.tally);
        report.groups.push(GroupReport {
            name: group.name.clone(),
            tally: run.tally,
            skipped: run.interrupted,
        });
    }

    info!(
        solved = report.tally.solved(),
        total = report.tally.total(),
        unsolved = report.tally.unsolved(),
        skipped_groups = report.skipped_groups(),
        "run complete"
    );
    Ok(report)
}

/// The final summary line, e.g. `Summary:   62 /   70`.
pub fn summary_line(tally: &Tally) -> String {
    format!("Summary: {:4} / {:4}", tally.solved(), tally.total())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_pads_counts() {
        let mut tally = Tally::new();
        tally.record(&crate::solver::Outcome::TimedOut);
        assert_eq!(summary_line(&tally), "Summary:    0 /    1");
    }

    #[test]
    fn skipped_groups_counts_interrupted_only() {
        let report = RunReport {
            tally: Tally::new(),
            groups: vec![
                GroupReport {
                    name: "uf20-91".to_string(),
                    tally: Tally::new(),
                    skipped: true,
                },
                GroupReport {
                    name: "uuf50-218".to_string(),
                    tally: Tally::new(),
                    skipped: false,
                },
            ],
        };
        assert_eq!(report.skipped_groups(), 1);
    }
}
