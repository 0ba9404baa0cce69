//! Benchmark harness for an external SAT solver.
//!
//! The harness walks a corpus of instance groups (one directory per group,
//! e.g. `uf20-91`, `uuf50-218`), runs the solver on every instance under a
//! wall-clock timeout, and tallies how many instances finished in time.
//!
//! - **[`corpus`]**: group discovery, name-derived ordering keys, filtering.
//! - **[`solver`]**: bounded-time solver invocation behind the [`solver::Solver`] trait.
//! - **[`group`]** and **[`bench`]**: the per-group and run-wide loops.
//! - **[`progress`]**, **[`output`]**: presentation and result persistence.
//!
//! "Solved" only ever means the solver returned before the timeout. Solver
//! output and exit status are never inspected.

pub mod bench;
pub mod cancel;
pub mod config;
pub mod corpus;
pub mod exit_codes;
pub mod group;
pub mod logging;
pub mod output;
pub mod progress;
pub mod solver;
pub mod tally;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
