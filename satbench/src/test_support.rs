//! Test-only helpers: temporary corpora, scripted solvers, recording observers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::cancel::CancelToken;
use crate::progress::ProgressObserver;
use crate::solver::{Outcome, SolveRequest, Solver};

/// Temporary corpus root populated with group directories of empty `.cnf` files.
pub struct CorpusBuilder {
    dir: TempDir,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    /// Add a group directory `name` holding `files` instance files.
    pub fn group(self, name: &str, files: usize) -> Self {
        let group_dir = self.dir.path().join(name);
        fs::create_dir_all(&group_dir).expect("create group dir");
        for index in 1..=files {
            fs::write(group_dir.join(format!("{name}-{index:02}.cnf")), "")
                .expect("write instance");
        }
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Solver that replays a fixed script of outcomes, then solves everything in 1ms.
///
/// Optionally cancels a token after a given number of invocations, emulating a
/// Ctrl-C that arrives while that invocation was in flight.
pub struct ScriptedSolver {
    script: RefCell<VecDeque<Outcome>>,
    calls: RefCell<Vec<PathBuf>>,
    jobs_seen: RefCell<Vec<Option<u32>>>,
    cancel_after: Cell<Option<(usize, CancelToken)>>,
}

impl ScriptedSolver {
    pub fn new(script: Vec<Outcome>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: RefCell::new(Vec::new()),
            jobs_seen: RefCell::new(Vec::new()),
            cancel_after: Cell::new(None),
        }
    }

    /// Solve every instance.
    pub fn always_solved() -> Self {
        Self::new(Vec::new())
    }

    /// Cancel `token` once `calls` invocations have completed.
    pub fn cancel_after(self, calls: usize, token: &CancelToken) -> Self {
        self.cancel_after.set(Some((calls, token.clone())));
        self
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }

    pub fn jobs_seen(&self) -> Vec<Option<u32>> {
        self.jobs_seen.borrow().clone()
    }
}

impl Solver for ScriptedSolver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Outcome> {
        self.calls.borrow_mut().push(request.instance.to_path_buf());
        self.jobs_seen.borrow_mut().push(request.jobs);
        let outcome = self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or(Outcome::Solved(Duration::from_millis(1)));

        if let Some((after, token)) = self.cancel_after.take() {
            if self.calls.borrow().len() == after {
                token.cancel();
            } else {
                self.cancel_after.set(Some((after, token)));
            }
        }
        Ok(outcome)
    }
}

/// Solver that fails every invocation, e.g. a missing binary.
pub struct FailingSolver;

impl Solver for FailingSolver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Outcome> {
        Err(anyhow!("spawn solver for {}", request.instance.display()))
    }
}

/// Progress event captured by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { group: String, total: usize },
    Instance { group: String, solved: usize, total: usize },
    Finished { group: String, skipped: bool },
}

/// Observer that stores every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl ProgressObserver for RecordingProgress {
    fn group_started(&mut self, group: &str, total: usize) {
        self.events.push(ProgressEvent::Started {
            group: group.to_string(),
            total,
        });
    }

    fn instance_finished(&mut self, group: &str, solved: usize, total: usize) {
        self.events.push(ProgressEvent::Instance {
            group: group.to_string(),
            solved,
            total,
        });
    }

    fn group_finished(&mut self, group: &str, skipped: bool) {
        self.events.push(ProgressEvent::Finished {
            group: group.to_string(),
            skipped,
        });
    }
}
