//! Solver invocation with a wall-clock timeout.
//!
//! The [`Solver`] trait decouples the group loop from the actual solver
//! process. Tests use scripted solvers that return predetermined outcomes
//! without spawning anything.
//!
//! Only "did it return before the timeout" is observed. The solver's stdout,
//! stderr and exit status are drained and dropped, so [`Outcome::Solved`]
//! does not imply a correct (or even well-formed) answer.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Outcome of a single solver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The invocation returned before the timeout, after this much wall-clock time.
    Solved(Duration),
    /// The invocation exceeded the timeout and was killed.
    TimedOut,
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }

    /// Elapsed seconds, present iff the outcome is `Solved`.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Outcome::Solved(elapsed) => Some(elapsed.as_secs_f64()),
            Outcome::TimedOut => None,
        }
    }
}

/// Parameters for one solver invocation.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    /// Instance file passed as the solver's positional argument.
    pub instance: &'a Path,
    /// Forwarded as `-j JOBS` when set.
    pub jobs: Option<u32>,
    pub timeout: Duration,
}

/// Abstraction over solver backends.
pub trait Solver {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Outcome>;
}

/// Solver that spawns an external executable per instance.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: PathBuf,
}

impl ProcessSolver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, request: &SolveRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(jobs) = request.jobs {
            cmd.arg("-j").arg(jobs.to_string());
        }
        cmd.arg(request.instance);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Keep terminal Ctrl-C away from the solver; the harness decides what to skip.
        // The group also lets a timeout kill every process the solver started.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

impl Solver for ProcessSolver {
    #[instrument(skip_all, fields(instance = %request.instance.display(), timeout_secs = request.timeout.as_secs()))]
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Outcome> {
        let mut cmd = self.command(request);

        debug!(program = %self.program.display(), "spawning solver");
        let start = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                error!(err = %e, "failed to spawn solver");
                return Err(e)
                    .with_context(|| format!("spawn solver {}", self.program.display()));
            }
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;
        let stdout_handle = thread::spawn(move || drain(stdout));
        let stderr_handle = thread::spawn(move || drain(stderr));

        let outcome = match child
            .wait_timeout(request.timeout)
            .context("wait for solver")?
        {
            Some(status) => {
                let elapsed = start.elapsed();
                debug!(exit_code = ?status.code(), elapsed_secs = elapsed.as_secs_f64(), "solver returned");
                Outcome::Solved(elapsed)
            }
            None => {
                warn!(
                    timeout_secs = request.timeout.as_secs(),
                    "solver timed out, killing"
                );
                kill_tree(&mut child).context("kill solver")?;
                child.wait().context("wait solver after kill")?;
                Outcome::TimedOut
            }
        };
        // Descendants left behind by a finished solver still hold the pipes.
        if outcome.is_solved() {
            kill_tree(&mut child).context("reap solver descendants")?;
        }

        join_drain(stdout_handle).context("join stdout")?;
        join_drain(stderr_handle).context("join stderr")?;

        Ok(outcome)
    }
}

/// SIGKILL the solver's process group. A group that is already gone is not an error.
#[cfg(unix)]
fn kill_tree(child: &mut Child) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = i32::try_from(child.id()).context("solver pid out of range")?;
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(errno).context("signal solver process group"),
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> Result<()> {
    match child.try_wait()? {
        Some(_) => Ok(()),
        None => child.kill().context("kill solver"),
    }
}

/// Read a stream to EOF, keeping nothing. Returns the number of bytes discarded.
fn drain<R: Read>(mut reader: R) -> Result<u64> {
    std::io::copy(&mut reader, &mut std::io::sink()).context("drain output")
}

fn join_drain(handle: thread::JoinHandle<Result<u64>>) -> Result<()> {
    match handle.join() {
        Ok(result) => {
            let bytes = result?;
            debug!(bytes, "discarded solver output");
            Ok(())
        }
        Err(_) => Err(anyhow!("output drain thread panicked")),
    }
}
