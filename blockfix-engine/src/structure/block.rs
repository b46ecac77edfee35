//! Block scanner
//!
//! A block is a start line plus every following line nested deeper than it. The
//! block ends at the first non-blank line whose depth is at or above the start
//! line's own depth. Whitespace-only lines never end a block, so trailing blank
//! lines belong to the extent; [`Extent::content_end`] gives the position right
//! after the last real interior line, which is where appends go.

use crate::error::StructuralError;
use crate::structure::indentation::{classify, depth_of, LineClass};
use std::ops::Range;

/// Half-open line range `[start, end)` of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub start: usize,
    pub end: usize,
}

impl Extent {
    /// Lines strictly inside the block.
    pub fn interior(&self) -> Range<usize> {
        self.start + 1..self.end
    }

    /// Whether `index` is the start line or an interior line.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Index just past the last non-blank interior line, or `start + 1` when the
    /// interior holds nothing but blank lines.
    pub fn content_end<S: AsRef<str>>(&self, lines: &[S]) -> usize {
        self.interior()
            .rev()
            .find(|&idx| !lines[idx].as_ref().trim().is_empty())
            .map_or(self.start + 1, |idx| idx + 1)
    }

    /// Whether the block has no non-blank interior line.
    pub fn is_empty_interior<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        self.content_end(lines) == self.start + 1
    }
}

/// Extent of the block opened by the line at `start`.
///
/// Fails only when `start` is past the end of the buffer.
pub fn extent_of<S: AsRef<str>>(lines: &[S], start: usize) -> Result<Extent, StructuralError> {
    if start >= lines.len() {
        return Err(StructuralError::OutOfRange {
            index: start,
            len: lines.len(),
        });
    }

    let base = depth_of(lines[start].as_ref());
    let end = lines[start + 1..]
        .iter()
        .position(|line| {
            let line = line.as_ref();
            !line.trim().is_empty() && depth_of(line) <= base
        })
        .map_or(lines.len(), |offset| start + 1 + offset);

    Ok(Extent { start, end })
}

/// The nearest line above `index` that is structurally its parent: non-blank,
/// not a comment, and strictly shallower.
pub fn enclosing_start<S: AsRef<str>>(lines: &[S], index: usize) -> Option<usize> {
    let depth = depth_of(lines.get(index)?.as_ref());
    (0..index).rev().find(|&idx| {
        let line = lines[idx].as_ref();
        !matches!(classify(line), LineClass::Blank | LineClass::Comment) && depth_of(line) < depth
    })
}
