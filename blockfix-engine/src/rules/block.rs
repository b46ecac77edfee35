//! Block rules: field injection and single-line rewrites scoped to a block.

use super::{BlockEdit, BlockRule};
use crate::structure::indentation::inline_value;
use crate::structure::inject::child_depth;
use crate::structure::{
    classify, extent_of, field_value, fields, has_field, insertion_index, key_of, render_field,
    Anchors, Extent, LineClass,
};

/// Which block start lines a rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTarget {
    /// Lines whose own key is one of these, e.g. a module key.
    Keys(&'static [&'static str]),
    /// List items carrying one of these keys on the dash line or as a field.
    ItemsWithKey(&'static [&'static str]),
}

impl BlockTarget {
    pub fn matches(&self, lines: &[String], index: usize) -> bool {
        let line = lines[index].as_str();
        match self {
            BlockTarget::Keys(keys) => key_of(line).map_or(false, |key| keys.contains(&key)),
            BlockTarget::ItemsWithKey(keys) => {
                if classify(line) != LineClass::ListItemStart {
                    return false;
                }
                if key_of(line).map_or(false, |key| keys.contains(&key)) {
                    return true;
                }
                extent_of(lines, index).map_or(false, |extent| {
                    fields(lines, extent).iter().any(|f| keys.contains(&f.key))
                })
            }
        }
    }
}

/// What a value policy or rewrite sees of a block.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    pub lines: &'a [String],
    pub extent: Extent,
}

impl<'a> BlockView<'a> {
    pub fn new(lines: &'a [String], extent: Extent) -> Self {
        BlockView { lines, extent }
    }

    pub fn start_line(&self) -> &'a str {
        &self.lines[self.extent.start]
    }

    /// Every line of the block, start line included.
    pub fn block_lines(&self) -> &'a [String] {
        &self.lines[self.extent.start..self.extent.end]
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.block_lines().iter().any(|line| line.contains(needle))
    }

    pub fn has_field(&self, name: &str) -> bool {
        has_field(self.lines, self.extent, name)
    }

    pub fn field_value(&self, name: &str) -> Option<&'a str> {
        field_value(self.lines, self.extent, name)
    }

    /// Index of the field `name` in buffer coordinates.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        fields(self.lines, self.extent)
            .into_iter()
            .find(|field| field.key == name)
            .map(|field| field.index)
    }

    /// Key on the start line, e.g. `file` for `- file: x`.
    pub fn start_key(&self) -> Option<&'a str> {
        key_of(self.start_line())
    }

    pub fn start_value(&self) -> Option<&'a str> {
        inline_value(self.start_line())
    }

    /// The first key in `keys` carried by the block, on its start line or as a
    /// field, with the index of the line carrying it.
    pub fn find_key(&self, keys: &[&str]) -> Option<(usize, &'a str)> {
        if let Some(key) = self.start_key().filter(|key| keys.contains(key)) {
            return Some((self.extent.start, key));
        }
        fields(self.lines, self.extent)
            .into_iter()
            .find(|field| keys.contains(&field.key))
            .map(|field| (field.index, field.key))
    }
}

pub type ValuePolicy = Box<dyn Fn(&BlockView<'_>) -> Option<String> + Send + Sync>;

/// Inserts `field` into matching blocks that lack it.
pub struct FieldInjection {
    name: String,
    target: BlockTarget,
    field: &'static str,
    policy: ValuePolicy,
    anchors: Anchors<'static>,
}

impl FieldInjection {
    pub fn new<F>(name: impl Into<String>, target: BlockTarget, field: &'static str, policy: F) -> Self
    where
        F: Fn(&BlockView<'_>) -> Option<String> + Send + Sync + 'static,
    {
        FieldInjection {
            name: name.into(),
            target,
            field,
            policy: Box::new(policy),
            anchors: Anchors::NONE,
        }
    }

    pub fn with_anchors(mut self, anchors: Anchors<'static>) -> Self {
        self.anchors = anchors;
        self
    }
}

impl std::fmt::Debug for FieldInjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldInjection")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("field", &self.field)
            .field("anchors", &self.anchors)
            .finish()
    }
}

impl BlockRule for FieldInjection {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, lines: &[String], index: usize) -> bool {
        self.target.matches(lines, index)
    }

    fn edit(&self, lines: &[String], extent: Extent) -> Option<BlockEdit> {
        // A key written on the dash line is already present.
        let on_start_line = key_of(&lines[extent.start]) == Some(self.field);
        if on_start_line || has_field(lines, extent, self.field) {
            return None;
        }
        let value = (self.policy)(&BlockView::new(lines, extent))?;
        let index = insertion_index(lines, extent, self.anchors);
        let line = render_field(child_depth(lines, extent), self.field, &value);
        Some(BlockEdit::Insert { index, line })
    }
}

pub type RewritePolicy = Box<dyn Fn(&BlockView<'_>) -> Option<(usize, String)> + Send + Sync>;

/// Replaces one line inside matching blocks.
pub struct ScopedRewrite {
    name: String,
    target: BlockTarget,
    rewrite: RewritePolicy,
}

impl ScopedRewrite {
    pub fn new<F>(name: impl Into<String>, target: BlockTarget, rewrite: F) -> Self
    where
        F: Fn(&BlockView<'_>) -> Option<(usize, String)> + Send + Sync + 'static,
    {
        ScopedRewrite {
            name: name.into(),
            target,
            rewrite: Box::new(rewrite),
        }
    }
}

impl std::fmt::Debug for ScopedRewrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedRewrite")
            .field("name", &self.name)
            .field("target", &self.target)
            .finish()
    }
}

impl BlockRule for ScopedRewrite {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, lines: &[String], index: usize) -> bool {
        self.target.matches(lines, index)
    }

    fn edit(&self, lines: &[String], extent: Extent) -> Option<BlockEdit> {
        let (index, line) = (self.rewrite)(&BlockView::new(lines, extent))?;
        if !extent.contains(index) || lines[index] == line {
            return None;
        }
        Some(BlockEdit::Replace { index, line })
    }
}
