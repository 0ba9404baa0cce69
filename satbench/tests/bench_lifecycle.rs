//! Run-level tests for the full group loop.
//!
//! These drive `run_bench` over temporary corpora with scripted solvers to
//! verify ordering, filtering, interrupt handling and the result file.

use std::path::Path;
use std::time::Duration;

use satbench::bench::run_bench;
use satbench::cancel::CancelToken;
use satbench::config::{FileConfig, Overrides, RunConfig};
use satbench::output::{OutputFormat, ResultWriter};
use satbench::progress::NoProgress;
use satbench::solver::Outcome;
use satbench::test_support::{CorpusBuilder, ProgressEvent, RecordingProgress, ScriptedSolver};

fn config_for(root: &Path, filter: Option<&str>) -> RunConfig {
    RunConfig::resolve(
        FileConfig::default(),
        Overrides {
            filter: filter.map(str::to_string),
            data: Some(root.to_path_buf()),
            ..Overrides::default()
        },
        root,
        root,
    )
    .expect("config")
}

fn group_of(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .expect("group dir")
        .to_string_lossy()
        .into_owned()
}

/// Interrupt scenario:
///
/// ```text
/// uf20-91   (20 files)  -> cancelled after 12 attempts -> total 12, skipped
/// uuf50-218 (50 files)  -> all attempted
/// run total             -> 62, not 70
/// ```
#[test]
fn interrupt_skips_rest_of_group_and_continues() {
    let corpus = CorpusBuilder::new()
        .group("uuf50-218", 50)
        .group("uf20-91", 20);
    let config = config_for(corpus.root(), None);
    let cancel = CancelToken::new();
    let solver = ScriptedSolver::always_solved().cancel_after(12, &cancel);
    let mut writer = ResultWriter::new(Vec::new(), OutputFormat::Csv).expect("writer");
    let mut progress = RecordingProgress::default();

    let report = run_bench(
        &config,
        &solver,
        &cancel,
        &mut progress,
        Some(&mut writer),
    )
    .expect("run");

    let names: Vec<&str> = report.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["uf20-91", "uuf50-218"]);

    assert!(report.groups[0].skipped);
    assert_eq!(report.groups[0].tally.total(), 12);
    assert!(!report.groups[1].skipped);
    assert_eq!(report.groups[1].tally.total(), 50);

    assert_eq!(report.tally.total(), 62);
    assert_eq!(report.tally.solved(), 62);
    assert_eq!(report.skipped_groups(), 1);

    let calls = solver.calls();
    assert_eq!(calls.len(), 62);
    assert!(calls[..12].iter().all(|p| group_of(p) == "uf20-91"));
    assert!(calls[12..].iter().all(|p| group_of(p) == "uuf50-218"));

    assert!(progress.events.contains(&ProgressEvent::Finished {
        group: "uf20-91".to_string(),
        skipped: true
    }));
    assert!(progress.events.contains(&ProgressEvent::Finished {
        group: "uuf50-218".to_string(),
        skipped: false
    }));

    assert_eq!(writer.rows(), 62);
    let csv = String::from_utf8(writer.into_inner()).expect("utf8");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "file,time");
    assert_eq!(lines.len(), 63);
    assert_eq!(
        lines[1..13]
            .iter()
            .filter(|l| l.starts_with("uf20-91-"))
            .count(),
        12
    );
}

#[test]
fn filter_selects_matching_groups_only() {
    let corpus = CorpusBuilder::new()
        .group("uf20-91", 3)
        .group("uuf50-218", 4);
    let config = config_for(corpus.root(), Some("^uuf"));
    let solver = ScriptedSolver::always_solved();

    let report = run_bench(
        &config,
        &solver,
        &CancelToken::new(),
        &mut NoProgress,
        None::<&mut ResultWriter<Vec<u8>>>,
    )
    .expect("run");

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].name, "uuf50-218");
    assert_eq!(report.tally.total(), 4);
    assert!(solver.calls().iter().all(|p| group_of(p) == "uuf50-218"));
}

#[test]
fn timeouts_leave_empty_time_and_never_count_as_solved() {
    let corpus = CorpusBuilder::new().group("uf20-91", 4);
    let config = config_for(corpus.root(), None);
    let solver = ScriptedSolver::new(vec![
        Outcome::Solved(Duration::from_millis(500)),
        Outcome::TimedOut,
        Outcome::TimedOut,
        Outcome::Solved(Duration::from_secs(3)),
    ]);
    let mut writer = ResultWriter::new(Vec::new(), OutputFormat::Csv).expect("writer");

    let report = run_bench(
        &config,
        &solver,
        &CancelToken::new(),
        &mut NoProgress,
        Some(&mut writer),
    )
    .expect("run");

    assert_eq!((report.tally.solved(), report.tally.total()), (2, 4));
    let csv = String::from_utf8(writer.into_inner()).expect("utf8");
    let times: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|line| line.rsplit(',').next().expect("time column"))
        .collect();
    assert_eq!(times, vec!["0.5", "", "", "3"]);
}

#[test]
fn groups_run_in_key_order() {
    let corpus = CorpusBuilder::new()
        .group("uuf100-430", 1)
        .group("uf100-430", 1)
        .group("uuf20-91", 1)
        .group("uf50-218", 1)
        .group("uf20-91", 1);
    let config = config_for(corpus.root(), None);
    let solver = ScriptedSolver::always_solved();

    run_bench(
        &config,
        &solver,
        &CancelToken::new(),
        &mut NoProgress,
        None::<&mut ResultWriter<Vec<u8>>>,
    )
    .expect("run");

    let visited: Vec<String> = solver.calls().iter().map(|p| group_of(p)).collect();
    assert_eq!(
        visited,
        vec!["uf20-91", "uuf20-91", "uf50-218", "uf100-430", "uuf100-430"]
    );
}

#[test]
fn result_file_is_durable_after_each_group() {
    let corpus = CorpusBuilder::new()
        .group("uf20-91", 2)
        .group("uf50-218", 3);
    let config = config_for(corpus.root(), None);
    let out_dir = tempfile::tempdir().expect("tempdir");
    let out_path = out_dir.path().join("results.jsonl");
    let mut writer = ResultWriter::create(&out_path, OutputFormat::Jsonl).expect("create");

    run_bench(
        &config,
        &ScriptedSolver::always_solved(),
        &CancelToken::new(),
        &mut NoProgress,
        Some(&mut writer),
    )
    .expect("run");

    // Flushed by the run loop, before the writer is dropped.
    let contents = std::fs::read_to_string(&out_path).expect("read results");
    assert_eq!(contents.lines().count(), 5);
    drop(writer);
}

#[test]
fn malformed_group_name_aborts_before_any_solver_call() {
    let corpus = CorpusBuilder::new()
        .group("uf20-91", 2)
        .group("random-3sat", 2);
    let config = config_for(corpus.root(), None);
    let solver = ScriptedSolver::always_solved();

    let err = run_bench(
        &config,
        &solver,
        &CancelToken::new(),
        &mut NoProgress,
        None::<&mut ResultWriter<Vec<u8>>>,
    )
    .expect_err("malformed");
    assert!(err.to_string().contains("random-3sat"));
    assert!(solver.calls().is_empty());
}
