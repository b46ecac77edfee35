//! Field injector
//!
//! Computes where a new field goes inside a block and renders it. Placement is
//! driven by two anchor lists:
//!
//! - `after`: preferred predecessors. The new field lands after the last one
//!   found, past that field's own nested value.
//! - `before`: terminal fields (conditions, notifications) that must stay below
//!   the new field. Reaching one ends the scan.
//!
//! With no anchor match the field goes at the end of the block's field run: after
//! the last line at or past the parameter depth that comes before anything
//! shallower. That keeps it among the arguments of a dash-line key (`- file:`)
//! even when task keywords follow at the item's own column. A block with no key
//! or list item inside takes it after its last non-blank interior line, or right
//! below the start line when the interior is empty.
//!
//! Precondition: the caller has already established with
//! [`has_field`](crate::structure::query::has_field) that the field is absent.
//! Nothing here re-checks it, so skipping that check duplicates the field.

use crate::structure::block::{extent_of, Extent};
use crate::structure::indentation::{
    classify, content_column, depth_of, indent_step, inline_value, LineClass,
};
use crate::structure::query::{fields, param_depth};

/// Field names that steer where a new field goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchors<'a> {
    pub after: &'a [&'a str],
    pub before: &'a [&'a str],
}

impl<'a> Anchors<'a> {
    pub const NONE: Anchors<'static> = Anchors {
        after: &[],
        before: &[],
    };

    pub const fn new(after: &'a [&'a str], before: &'a [&'a str]) -> Self {
        Anchors { after, before }
    }
}

/// Depth at which a new child of the block is rendered.
///
/// Uses the measured parameter depth; an empty interior falls back to the
/// content column of a list item, or the document's indent step below the start
/// line otherwise.
pub fn child_depth<S: AsRef<str>>(lines: &[S], extent: Extent) -> usize {
    if let Some(depth) = param_depth(lines, extent) {
        return depth;
    }
    let start = lines[extent.start].as_ref();
    if classify(start) == LineClass::ListItemStart {
        content_column(start)
    } else {
        depth_of(start) + indent_step(lines)
    }
}

/// Buffer index at which a new field of the block is inserted.
pub fn insertion_index<S: AsRef<str>>(lines: &[S], extent: Extent, anchors: Anchors<'_>) -> usize {
    let mut last_after: Option<usize> = None;

    for field in fields(lines, extent) {
        if anchors.before.contains(&field.key) {
            return match last_after {
                Some(idx) => end_of_field(lines, idx),
                None => field.index,
            };
        }
        if anchors.after.contains(&field.key) {
            last_after = Some(field.index);
        }
    }

    match (last_after, param_depth(lines, extent)) {
        (Some(idx), _) => end_of_field(lines, idx),
        (None, Some(depth)) => end_of_run(lines, extent, depth),
        (None, None) => extent.content_end(lines),
    }
}

/// Index just past the last non-blank line of the field run at `depth`.
fn end_of_run<S: AsRef<str>>(lines: &[S], extent: Extent, depth: usize) -> usize {
    let mut end = extent.start + 1;
    for idx in extent.interior() {
        let line = lines[idx].as_ref();
        let shallower = depth_of(line) < depth;
        match classify(line) {
            LineClass::Blank => continue,
            LineClass::Comment if shallower => continue,
            _ if shallower => break,
            _ => end = idx + 1,
        }
    }
    end
}

/// Index just past the field at `index` and its nested value.
fn end_of_field<S: AsRef<str>>(lines: &[S], index: usize) -> usize {
    let line = lines[index].as_ref();
    let mut end = extent_of(lines, index).map_or(index + 1, |extent| extent.content_end(lines));
    if inline_value(line).is_some() {
        return end;
    }

    // `key:` with its sequence written at the key's own column.
    let depth = depth_of(line);
    while let Some(next) = (end..lines.len()).find(|&idx| !lines[idx].as_ref().trim().is_empty()) {
        let item = lines[next].as_ref();
        if classify(item) != LineClass::ListItemStart || depth_of(item) != depth {
            break;
        }
        end = extent_of(lines, next).map_or(next + 1, |extent| extent.content_end(lines));
    }
    end
}

/// `name: value` indented by `depth` spaces.
pub fn render_field(depth: usize, name: &str, value: &str) -> String {
    format!("{}{}: {}", " ".repeat(depth), name, value)
}

/// The block's lines with `name: value` inserted.
pub fn inject_field<S: AsRef<str>>(
    lines: &[S],
    extent: Extent,
    name: &str,
    value: &str,
    anchors: Anchors<'_>,
) -> Vec<String> {
    let index = insertion_index(lines, extent, anchors);
    let line = render_field(child_depth(lines, extent), name, value);

    let mut out: Vec<String> = lines.iter().map(|l| l.as_ref().to_string()).collect();
    out.insert(index, line);
    out
}
