//! Document pass runner
//!
//! A pass applies one rule set to a document. Each sweep walks the working buffer
//! top to bottom. At every index the line is first offered to the line rules
//! (first answer wins), then to each block rule whose target matches, with the
//! extent recomputed on the current buffer. Lines inserted below the cursor are
//! visited later in the same sweep like any other line.
//!
//! Sweeps repeat until one makes no edit. A set whose rules are disjoint and
//! self-satisfying settles in one or two sweeps; one that keeps editing is
//! reported as [`PassError::NonConvergent`] instead of looping.

use crate::document::Document;
use crate::error::PassError;
use crate::rules::{BlockEdit, LineContext, Rewrite, RuleSet};
use crate::structure::extent_of;
use serde::Serialize;

pub const MAX_SWEEPS: usize = 4;

/// One edit made by a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub rule_set: String,
    pub rule: String,
    /// 1-based line number in the buffer at the time of the edit.
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub document: Document,
    pub changed: bool,
    pub applied: Vec<Applied>,
}

pub fn apply_pass(document: &Document, rule_set: &RuleSet) -> Result<PassOutcome, PassError> {
    let mut lines = document.lines().to_vec();
    let mut applied = Vec::new();

    let mut sweeps = 0;
    loop {
        let edits = sweep(&mut lines, rule_set, &mut applied)?;
        sweeps += 1;
        if edits == 0 {
            break;
        }
        if sweeps == MAX_SWEEPS {
            return Err(PassError::NonConvergent {
                rule_set: rule_set.name().to_string(),
                sweeps,
            });
        }
    }

    let final_newline = if rule_set.ensures_final_newline() && !lines.is_empty() {
        true
    } else {
        document.final_newline()
    };
    let changed = lines.as_slice() != document.lines() || final_newline != document.final_newline();

    tracing::debug!(
        rule_set = rule_set.name(),
        sweeps,
        edits = applied.len(),
        changed,
        "pass finished"
    );

    Ok(PassOutcome {
        document: document.with_lines(lines, final_newline),
        changed,
        applied,
    })
}

/// Applies several rule sets in order, each to the previous one's output.
pub fn apply_sets(document: &Document, rule_sets: &[&RuleSet]) -> Result<PassOutcome, PassError> {
    let mut current = document.clone();
    let mut applied = Vec::new();

    for rule_set in rule_sets {
        let outcome = apply_pass(&current, rule_set)?;
        applied.extend(outcome.applied);
        current = outcome.document;
    }

    let changed = current != *document;
    Ok(PassOutcome {
        document: current,
        changed,
        applied,
    })
}

fn sweep(
    lines: &mut Vec<String>,
    rule_set: &RuleSet,
    applied: &mut Vec<Applied>,
) -> Result<usize, PassError> {
    let mut edits = 0;
    let mut record = |rule: &str, index: usize| {
        tracing::trace!(rule_set = rule_set.name(), rule, line = index + 1, "applied");
        applied.push(Applied {
            rule_set: rule_set.name().to_string(),
            rule: rule.to_string(),
            line: index + 1,
        });
    };

    let mut index = 0;
    while index < lines.len() {
        let mut advance = 1;

        let rewrite = {
            let ctx = LineContext::new(lines, index);
            rule_set
                .line_rules()
                .find_map(|rule| rule.rewrite(&ctx).map(|rewrite| (rule.name(), rewrite)))
        };
        match rewrite {
            Some((rule, Rewrite::Replace(line))) if line != lines[index] => {
                lines[index] = line;
                record(rule, index);
                edits += 1;
            }
            Some((rule, Rewrite::Delete)) => {
                lines.remove(index);
                record(rule, index);
                edits += 1;
                continue;
            }
            Some((rule, Rewrite::Split(parts))) if parts.len() > 1 => {
                advance = parts.len();
                lines.splice(index..=index, parts);
                record(rule, index);
                edits += 1;
            }
            _ => {}
        }

        for rule in rule_set.block_rules() {
            if !rule.matches(lines, index) {
                continue;
            }
            let extent = extent_of(lines.as_slice(), index)?;
            match rule.edit(lines, extent) {
                Some(BlockEdit::Insert { index: at, line }) => {
                    lines.insert(at, line);
                    record(rule.name(), at);
                    edits += 1;
                }
                Some(BlockEdit::Replace { index: at, line }) if lines[at] != line => {
                    lines[at] = line;
                    record(rule.name(), at);
                    edits += 1;
                }
                _ => {}
            }
        }

        index += advance;
    }

    Ok(edits)
}
