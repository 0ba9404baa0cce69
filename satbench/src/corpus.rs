//! Corpus discovery and group ordering.
//!
//! A corpus root holds one directory per group. Group names follow the SATLIB
//! uniform random 3-SAT convention: `uf<vars>-<clauses>` for satisfiable and
//! `uuf<vars>-<clauses>` for unsatisfiable instances. The name is parsed once
//! into a [`GroupKey`] at load time; groups run in ascending key order.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

/// Prefix characters stripped before reading the variable count.
const CONVENTION_PREFIX: &[char] = &['u', 'f'];
/// Names starting with this are the unsatisfiable class.
const UNSAT_PREFIX: &str = "uu";

/// Ordering key derived from a group directory name.
///
/// Field order matters: the derived `Ord` sorts by variable count first, then
/// satisfiable (`false`) before unsatisfiable (`true`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub variables: u32,
    pub unsat: bool,
}

/// A group directory whose name does not follow the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNameError {
    pub name: String,
    pub reason: &'static str,
}

impl fmt::Display for GroupNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid group name {:?}: {}", self.name, self.reason)
    }
}

impl std::error::Error for GroupNameError {}

/// One group of instances, validated at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestGroup {
    pub name: String,
    pub key: GroupKey,
    /// Instance files in directory-listing order.
    pub files: Vec<PathBuf>,
}

impl TestGroup {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Derive the ordering key from a group name, e.g. `uuf50-218` -> (50, unsat).
pub fn parse_group_key(name: &str) -> Result<GroupKey, GroupNameError> {
    let invalid = |reason: &'static str| GroupNameError {
        name: name.to_string(),
        reason,
    };

    let unsat = name.starts_with(UNSAT_PREFIX);
    let rest = name.trim_start_matches(CONVENTION_PREFIX);
    let digits = rest.split('-').next().unwrap_or_default();
    if digits.is_empty() {
        return Err(invalid("missing variable count"));
    }
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(invalid("variable count must be a run of digits before '-'"));
    }
    let variables = digits
        .parse::<u32>()
        .map_err(|_| invalid("variable count out of range"))?;
    Ok(GroupKey { variables, unsat })
}

/// Load every group under `root`, keep those whose name `filter` matches
/// (search semantics), and return them in ascending [`GroupKey`] order.
///
/// Every directory name is validated, including ones the filter excludes.
pub fn load_corpus(root: &Path, filter: &Regex) -> Result<Vec<TestGroup>> {
    let mut groups = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("read corpus {}", root.display()))? {
        let entry = entry.context("read corpus entry")?;
        let path = entry.path();
        if !path.is_dir() {
            debug!(path = %path.display(), "skipping non-directory corpus entry");
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let key = parse_group_key(&name)?;
        if !filter.is_match(&name) {
            debug!(group = %name, "excluded by filter");
            continue;
        }
        let files = list_instances(&path)?;
        debug!(group = %name, files = files.len(), ?key, "group discovered");
        groups.push(TestGroup { name, key, files });
    }
    groups.sort_by(|left, right| {
        left.key
            .cmp(&right.key)
            .then_with(|| left.name.cmp(&right.name))
    });
    Ok(groups)
}

/// Immediate regular files of a group directory, unsorted.
fn list_instances(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read group {}", dir.display()))? {
        let entry = entry.context("read group entry")?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
