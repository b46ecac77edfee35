//! Read-only view of the line a rule is looking at, plus structural lookups
//! around it: the enclosing parent, the owning list item, block-scalar nesting.

use crate::structure::indentation::{content_column, inline_value, is_block_scalar_indicator};
use crate::structure::{classify, depth_of, enclosing_start, extent_of, key_of, LineClass};

/// Keys whose value is a list of tasks.
pub const TASK_LIST_KEYS: &[&str] = &[
    "tasks",
    "pre_tasks",
    "post_tasks",
    "handlers",
    "block",
    "rescue",
    "always",
];

#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub lines: &'a [String],
    pub index: usize,
}

impl<'a> LineContext<'a> {
    pub fn new(lines: &'a [String], index: usize) -> Self {
        LineContext { lines, index }
    }

    pub fn line(&self) -> &'a str {
        &self.lines[self.index]
    }

    pub fn class(&self) -> LineClass {
        classify(self.line())
    }

    pub fn parent(&self) -> Option<usize> {
        enclosing_start(self.lines, self.index)
    }

    pub fn previous(&self) -> Option<&'a str> {
        self.index
            .checked_sub(1)
            .map(|idx| self.lines[idx].as_str())
    }

    /// The list item this line opens, or the one it is a direct field of.
    ///
    /// A direct field sits at the item's content column. Deeper lines under a
    /// dash-line key (`- user:` followed by its arguments) are not owned.
    pub fn owner_item(&self) -> Option<usize> {
        if self.class() == LineClass::ListItemStart {
            return Some(self.index);
        }
        let depth = depth_of(self.line());
        self.parent().filter(|&parent| {
            let line = self.lines[parent].as_str();
            classify(line) == LineClass::ListItemStart && content_column(line) == depth
        })
    }

    /// Whether the owning list item carries `name`, either on its dash line or
    /// as a field.
    pub fn owner_has(&self, name: &str) -> bool {
        let Some(owner) = self.owner_item() else {
            return false;
        };
        let item = self.lines[owner].as_str();
        if key_of(item) == Some(name) {
            return true;
        }
        // Item keys sit at the content column, below or after any dash-line
        // arguments.
        let column = content_column(item);
        extent_of(self.lines, owner).map_or(false, |extent| {
            extent.interior().any(|idx| {
                let line = self.lines[idx].as_str();
                classify(line) == LineClass::Parameter
                    && depth_of(line) == column
                    && key_of(line) == Some(name)
            })
        })
    }

    /// A list item, or a field sitting directly inside one.
    pub fn is_item_level(&self) -> bool {
        self.owner_item().is_some()
    }

    /// Whether the owning list item is a task or play: a top-level list entry or
    /// an entry under one of [`TASK_LIST_KEYS`].
    pub fn in_task_list(&self) -> bool {
        let Some(owner) = self.owner_item() else {
            return false;
        };
        match self.list_key(owner) {
            None => true,
            Some(list) => key_of(&self.lines[list]).map_or(false, |key| TASK_LIST_KEYS.contains(&key)),
        }
    }

    /// The line a list item hangs off: the key of a compact sequence written at
    /// the item's own column (`tasks:` then `- name: x`), or the enclosing parent.
    fn list_key(&self, item: usize) -> Option<usize> {
        let depth = depth_of(&self.lines[item]);
        for idx in (0..item).rev() {
            let line = self.lines[idx].as_str();
            let line_depth = depth_of(line);
            match classify(line) {
                LineClass::Blank | LineClass::Comment => continue,
                _ if line_depth > depth => continue,
                LineClass::ListItemStart if line_depth == depth => continue,
                LineClass::Parameter if line_depth == depth && inline_value(line).is_none() => {
                    return Some(idx)
                }
                _ if line_depth < depth => return Some(idx),
                _ => break,
            }
        }
        enclosing_start(self.lines, item)
    }

    /// Directly inside a mapping value rather than a list item: the parent is a
    /// key, or the line sits past the content column of a dash-line key.
    pub fn is_nested(&self) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        let line = self.lines[parent].as_str();
        match classify(line) {
            LineClass::Parameter => true,
            LineClass::ListItemStart => {
                key_of(line).is_some() && depth_of(self.line()) > content_column(line)
            }
            _ => false,
        }
    }

    /// Whether the line is part of a literal or folded block scalar opened by
    /// some ancestor.
    pub fn in_block_scalar(&self) -> bool {
        let depth = depth_of(self.line());
        let mut current = self.parent();
        while let Some(idx) = current {
            let ancestor = self.lines[idx].as_str();
            // `- shell: |` opens the scalar for lines past the key's column only.
            if depth > content_column(ancestor)
                && inline_value(ancestor).map_or(false, is_block_scalar_indicator)
            {
                return true;
            }
            current = enclosing_start(self.lines, idx);
        }
        false
    }
}
