//! Per-instance result file.
//!
//! Opened once at run start. Every attempted instance appends one row; files
//! abandoned by an interrupt never produce a row. The controller flushes after
//! each group so a group's rows are on disk before the next group starts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::group::InstanceResult;

/// Result file layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `file,time` header, one row per instance, empty `time` on timeout.
    #[default]
    Csv,
    /// One `{"file": .., "time": secs | null}` object per line.
    Jsonl,
}

#[derive(Serialize)]
struct Row<'a> {
    file: &'a str,
    time: Option<f64>,
}

/// Streaming writer for instance results.
pub struct ResultWriter<W: Write> {
    out: W,
    format: OutputFormat,
    rows: usize,
}

impl ResultWriter<BufWriter<File>> {
    /// Create (truncate) `path` and write the format's header.
    pub fn create(path: &Path, format: OutputFormat) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        Self::new(BufWriter::new(file), format)
            .with_context(|| format!("write header {}", path.display()))
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn new(mut out: W, format: OutputFormat) -> Result<Self> {
        if format == OutputFormat::Csv {
            writeln!(out, "file,time").context("write csv header")?;
        }
        Ok(Self {
            out,
            format,
            rows: 0,
        })
    }

    pub fn write(&mut self, result: &InstanceResult) -> Result<()> {
        let time = result.outcome.seconds();
        match self.format {
            OutputFormat::Csv => {
                let time = time.map(|secs| secs.to_string()).unwrap_or_default();
                writeln!(self.out, "{},{}", csv_escape(&result.file), time)
                    .context("write csv row")?;
            }
            OutputFormat::Jsonl => {
                let row = Row {
                    file: &result.file,
                    time,
                };
                serde_json::to_writer(&mut self.out, &row).context("serialize result row")?;
                self.out.write_all(b"\n").context("write jsonl row")?;
            }
        }
        self.rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("flush results")
    }

    /// Data rows written so far (header excluded).
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
