//! Run configuration: optional `satbench.toml` defaults plus CLI overrides.
//!
//! Relative corpus and solver paths are resolved against the harness root,
//! never against the caller's working directory. The root is the crate
//! directory the binary was built from unless `SATBENCH_ROOT` names another.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::group::GroupSettings;
use crate::output::OutputFormat;

/// Config file looked up in the harness root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "satbench.toml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Matches every group name.
pub const MATCH_ALL: &str = ".";

/// Environment variable that relocates the harness root.
pub const ROOT_ENV: &str = "SATBENCH_ROOT";

/// Directory the harness resolves its default and relative paths against.
pub fn harness_root() -> PathBuf {
    harness_root_from(std::env::var_os(ROOT_ENV))
}

/// `CARGO_MANIFEST_DIR` is baked in at build time; a moved binary needs the override.
fn harness_root_from(root_env: Option<OsString>) -> PathBuf {
    match root_env {
        Some(root) if !root.is_empty() => PathBuf::from(root),
        _ => PathBuf::from(env!("CARGO_MANIFEST_DIR")),
    }
}

/// Harness defaults (TOML). Missing fields fall back to the built-in values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    /// Solver executable.
    pub solver: PathBuf,

    /// Corpus root holding one directory per group.
    pub data: PathBuf,

    /// Per-instance wall-clock limit in seconds.
    pub timeout_secs: u64,

    /// Job-count hint forwarded to the solver as `-j`.
    pub jobs: Option<u32>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            solver: PathBuf::from("../target/release/vw-passat"),
            data: PathBuf::from("data"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            jobs: None,
        }
    }
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be > 0"));
        }
        if self.jobs == Some(0) {
            return Err(anyhow!("jobs must be > 0"));
        }
        if self.solver.as_os_str().is_empty() {
            return Err(anyhow!("solver must be a non-empty path"));
        }
        if self.data.as_os_str().is_empty() {
            return Err(anyhow!("data must be a non-empty path"));
        }
        Ok(())
    }
}

/// Load harness defaults from a TOML file.
///
/// If the file is missing, returns `FileConfig::default()`.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        let cfg = FileConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: FileConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub filter: Option<String>,
    pub jobs: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub solver: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Fully resolved, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Absolute corpus root.
    pub data: PathBuf,
    /// Absolute solver path.
    pub solver: PathBuf,
    pub filter: Regex,
    pub jobs: Option<u32>,
    pub timeout: Duration,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

impl RunConfig {
    /// Apply `overrides` on top of `file`, resolving relative corpus/solver paths
    /// against `harness_root` and a relative output path against `cwd`.
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        harness_root: &Path,
        cwd: &Path,
    ) -> Result<Self> {
        let mut merged = file;
        if let Some(jobs) = overrides.jobs {
            merged.jobs = Some(jobs);
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            merged.timeout_secs = timeout_secs;
        }
        if let Some(solver) = overrides.solver {
            merged.solver = solver;
        }
        if let Some(data) = overrides.data {
            merged.data = data;
        }
        merged.validate()?;

        let pattern = overrides.filter.as_deref().unwrap_or(MATCH_ALL);
        let filter =
            Regex::new(pattern).with_context(|| format!("invalid filter pattern {pattern:?}"))?;

        Ok(Self {
            data: absolutize(harness_root, &merged.data),
            solver: absolutize(harness_root, &merged.solver),
            filter,
            jobs: merged.jobs,
            timeout: Duration::from_secs(merged.timeout_secs),
            output: overrides.output.map(|path| absolutize(cwd, &path)),
            format: overrides.format,
        })
    }

    pub fn group_settings(&self) -> GroupSettings {
        GroupSettings {
            timeout: self.timeout,
            jobs: self.jobs,
        }
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(file: FileConfig, overrides: Overrides) -> Result<RunConfig> {
        RunConfig::resolve(file, overrides, Path::new("/harness"), Path::new("/caller"))
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_file_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "timeout_secs = 60\njobs = 4\n").expect("write");
        let cfg = load_file_config(&path).expect("load");
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.jobs, Some(4));
        assert_eq!(cfg.data, PathBuf::from("data"));
    }

    #[test]
    fn example_config_matches_defaults() {
        let cfg = load_file_config(&Path::new(env!("CARGO_MANIFEST_DIR")).join("satbench.example.toml")).expect("load");
        assert_eq!(cfg, FileConfig::default());
    }

    #[test]
    fn root_env_overrides_build_directory() {
        assert_eq!(
            harness_root_from(Some(OsString::from("/opt/satbench"))),
            PathBuf::from("/opt/satbench")
        );
        assert_eq!(
            harness_root_from(Some(OsString::new())),
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        );
        assert_eq!(
            harness_root_from(None),
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        );
    }

    #[test]
    fn load_rejects_zero_timeout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "timeout_secs = 0\n").expect("write");
        let err = load_file_config(&path).expect_err("zero timeout");
        assert!(format!("{err:#}").contains("timeout_secs"));
    }

    #[test]
    fn defaults_resolve_against_harness_root() {
        let cfg = resolve(FileConfig::default(), Overrides::default()).expect("resolve");
        assert_eq!(cfg.data, PathBuf::from("/harness/data"));
        assert_eq!(
            cfg.solver,
            PathBuf::from("/harness/../target/release/vw-passat")
        );
        assert_eq!(cfg.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(cfg.filter.is_match("uf20-91"));
        assert!(cfg.filter.is_match("uuf50-218"));
        assert!(cfg.output.is_none());
    }

    #[test]
    fn overrides_win_over_file() {
        let file = FileConfig {
            jobs: Some(2),
            timeout_secs: 30,
            ..FileConfig::default()
        };
        let overrides = Overrides {
            filter: Some("^uuf".to_string()),
            jobs: Some(8),
            timeout_secs: Some(5),
            data: Some(PathBuf::from("/corpus")),
            output: Some(PathBuf::from("out/results.csv")),
            ..Overrides::default()
        };
        let cfg = resolve(file, overrides).expect("resolve");
        assert_eq!(cfg.jobs, Some(8));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.data, PathBuf::from("/corpus"));
        assert_eq!(cfg.output, Some(PathBuf::from("/caller/out/results.csv")));
        assert!(!cfg.filter.is_match("uf20-91"));
        assert!(cfg.filter.is_match("uuf50-218"));
        assert_eq!(
            cfg.group_settings(),
            GroupSettings {
                timeout: Duration::from_secs(5),
                jobs: Some(8)
            }
        );
    }

    #[test]
    fn rejects_bad_overrides() {
        let zero_jobs = Overrides {
            jobs: Some(0),
            ..Overrides::default()
        };
        assert!(resolve(FileConfig::default(), zero_jobs).is_err());

        let bad_filter = Overrides {
            filter: Some("(".to_string()),
            ..Overrides::default()
        };
        let err = resolve(FileConfig::default(), bad_filter).expect_err("bad regex");
        assert!(err.to_string().contains("invalid filter pattern"));
    }
}
