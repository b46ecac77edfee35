//! Batch driver
//!
//! Runs the selected rule sets over every discovered file. Files are independent:
//! each one is read, fixed and written back (or diffed) on a rayon worker, and a
//! failure only ever affects the file it happened in. Results are folded into a
//! shared [`Summary`] held by the [`RunContext`].

use crate::error::{ErrorKind, FileError};
use crate::persist::{write_back, WriteMode};
use crate::report::unified_diff;
use blockfix_engine::{apply_sets, Applied, Document, RuleSet};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// What happens to a file that needs fixing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Write(WriteMode),
    /// Report only.
    Check,
    /// Report with a unified diff per changed file.
    Diff,
}

impl RunMode {
    pub fn writes(&self) -> bool {
        matches!(self, RunMode::Write(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Unchanged,
    Changed,
    Errored(ErrorKind),
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
    pub applied: Vec<Applied>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub errored: usize,
    /// Total edits across changed files.
    pub edits: usize,
    pub errors: BTreeMap<&'static str, usize>,
}

impl Summary {
    pub fn record(&mut self, report: &FileReport) {
        self.files += 1;
        match report.outcome {
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Changed => {
                self.changed += 1;
                self.edits += report.applied.len();
            }
            Outcome::Errored(kind) => {
                self.errored += 1;
                *self.errors.entry(kind.as_str()).or_default() += 1;
            }
        }
    }
}

struct Fixed {
    applied: Vec<Applied>,
    diff: Option<String>,
}

/// State threaded through one run.
pub struct RunContext<'a> {
    rule_sets: Vec<&'a RuleSet>,
    mode: RunMode,
    summary: Mutex<Summary>,
}

impl<'a> RunContext<'a> {
    pub fn new(rule_sets: Vec<&'a RuleSet>, mode: RunMode) -> Self {
        RunContext {
            rule_sets,
            mode,
            summary: Mutex::new(Summary::default()),
        }
    }

    pub fn mode(&self) -> &RunMode {
        &self.mode
    }

    /// Fix every file in parallel. Reports come back in input order.
    pub fn run(&self, files: &[PathBuf]) -> Vec<FileReport> {
        files.par_iter().map(|path| self.process(path)).collect()
    }

    pub fn summary(&self) -> Summary {
        self.summary.lock().clone()
    }

    fn process(&self, path: &Path) -> FileReport {
        let report = match self.fix_file(path) {
            Ok(None) => {
                tracing::debug!(path = %path.display(), "unchanged");
                FileReport {
                    path: path.to_path_buf(),
                    outcome: Outcome::Unchanged,
                    applied: Vec::new(),
                    error: None,
                    diff: None,
                }
            }
            Ok(Some(Fixed { applied, diff })) => {
                tracing::info!(path = %path.display(), edits = applied.len(), "changed");
                FileReport {
                    path: path.to_path_buf(),
                    outcome: Outcome::Changed,
                    applied,
                    error: None,
                    diff,
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "{err}");
                FileReport {
                    path: path.to_path_buf(),
                    outcome: Outcome::Errored(err.kind()),
                    applied: Vec::new(),
                    error: Some(err.to_string()),
                    diff: None,
                }
            }
        };
        self.summary.lock().record(&report);
        report
    }

    /// `None` when the file needs no change.
    fn fix_file(&self, path: &Path) -> Result<Option<Fixed>, FileError> {
        let bytes = fs::read(path).map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = Document::from_bytes(&bytes).map_err(|source| FileError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;

        let sets: Vec<&RuleSet> = self
            .rule_sets
            .iter()
            .copied()
            .filter(|set| set.applies_to(path))
            .collect();
        let outcome = apply_sets(&document, &sets).map_err(|source| FileError::Pass {
            path: path.to_path_buf(),
            source,
        })?;
        if !outcome.changed {
            return Ok(None);
        }

        let fixed = outcome.document.render();
        let diff = match &self.mode {
            RunMode::Write(mode) => {
                write_back(path, &fixed, mode).map_err(|source| FileError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
                None
            }
            RunMode::Check => None,
            RunMode::Diff => Some(unified_diff(path, &String::from_utf8_lossy(&bytes), &fixed)),
        };
        Ok(Some(Fixed {
            applied: outcome.applied,
            diff,
        }))
    }
}
