//! Rendering of per-file results and the run summary.

use crate::batch::{FileReport, Outcome, Summary};
use serde::Serialize;
use similar::{Algorithm, TextDiff};
use std::path::Path;

/// Unified diff between the original and fixed text of `path`.
pub fn unified_diff(path: &Path, original: &str, fixed: &str) -> String {
    let name = path.display().to_string();
    TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(original, fixed)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: &'a Summary,
}

pub fn to_json(reports: &[FileReport], summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        files: reports,
        summary,
    })
}

/// One line per file that changed or failed, then the totals.
pub fn to_text(reports: &[FileReport], summary: &Summary, check: bool) -> String {
    let mut out = String::new();
    let verb = if check { "would fix" } else { "fixed" };

    for report in reports {
        match &report.outcome {
            Outcome::Unchanged => {}
            Outcome::Changed => {
                out.push_str(&format!(
                    "{verb} {} ({} {})\n",
                    report.path.display(),
                    report.applied.len(),
                    plural(report.applied.len(), "edit", "edits")
                ));
            }
            Outcome::Errored(kind) => {
                let message = report.error.as_deref().unwrap_or("unknown error");
                out.push_str(&format!("error [{}] {message}\n", kind.as_str()));
            }
        }
    }

    out.push_str(&format!(
        "{} {} checked: {} {verb}, {} unchanged, {} errored\n",
        summary.files,
        plural(summary.files, "file", "files"),
        summary.changed,
        summary.unchanged,
        summary.errored
    ));
    out
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}
