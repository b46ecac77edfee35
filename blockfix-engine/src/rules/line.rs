//! Line rules: a regex substitution with optional structural guards, and a plain
//! function for rewrites a single replacement template cannot express.

use super::{LineContext, LineRule, Rewrite};
use regex::{Captures, Regex};

/// Structural condition a line must satisfy before a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// A list item, or a field directly inside one.
    ItemLevel,
    /// The owning list item is a task or play, not an entry of some data list.
    TaskList,
    /// Directly under a mapping key, e.g. module arguments.
    Nested,
    /// The owning list item does not carry this key.
    OwnerLacks(&'static str),
    /// The line right above is not a comment.
    NotAfterComment,
    /// Not inside a literal or folded block scalar.
    OutsideBlockScalar,
}

impl Guard {
    pub fn allows(&self, ctx: &LineContext<'_>) -> bool {
        match self {
            Guard::ItemLevel => ctx.is_item_level(),
            Guard::TaskList => ctx.in_task_list(),
            Guard::Nested => ctx.is_nested(),
            Guard::OwnerLacks(key) => !ctx.owner_has(key),
            Guard::NotAfterComment => !ctx
                .previous()
                .map_or(false, |prev| prev.trim_start().starts_with('#')),
            Guard::OutsideBlockScalar => !ctx.in_block_scalar(),
        }
    }
}

fn guards_allow(guards: &[Guard], ctx: &LineContext<'_>) -> bool {
    guards.iter().all(|guard| guard.allows(ctx))
}

#[derive(Debug, Clone, Copy)]
pub enum Replacement {
    /// `regex` replacement syntax: `$1`, `${name}`.
    Template(&'static str),
    Fn(fn(&Captures<'_>) -> String),
    Delete,
}

/// Replaces the first match of `pattern` on the line.
#[derive(Debug, Clone)]
pub struct Substitution {
    name: String,
    pattern: Regex,
    replacement: Replacement,
    guards: Vec<Guard>,
}

impl Substitution {
    pub fn new(name: impl Into<String>, pattern: Regex, replacement: Replacement) -> Self {
        Substitution {
            name: name.into(),
            pattern,
            replacement,
            guards: Vec::new(),
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }
}

impl LineRule for Substitution {
    fn name(&self) -> &str {
        &self.name
    }

    fn rewrite(&self, ctx: &LineContext<'_>) -> Option<Rewrite> {
        let line = ctx.line();
        if !self.pattern.is_match(line) || !guards_allow(&self.guards, ctx) {
            return None;
        }
        Some(match self.replacement {
            Replacement::Template(template) => {
                Rewrite::Replace(self.pattern.replace(line, template).into_owned())
            }
            Replacement::Fn(f) => {
                Rewrite::Replace(self.pattern.replace(line, |caps: &Captures<'_>| f(caps)).into_owned())
            }
            Replacement::Delete => Rewrite::Delete,
        })
    }
}

/// A line rule backed by a function.
#[derive(Clone)]
pub struct LineFn {
    name: String,
    f: fn(&LineContext<'_>) -> Option<Rewrite>,
    guards: Vec<Guard>,
}

impl LineFn {
    pub fn new(name: impl Into<String>, f: fn(&LineContext<'_>) -> Option<Rewrite>) -> Self {
        LineFn {
            name: name.into(),
            f,
            guards: Vec::new(),
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }
}

impl std::fmt::Debug for LineFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineFn")
            .field("name", &self.name)
            .field("guards", &self.guards)
            .finish()
    }
}

impl LineRule for LineFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn rewrite(&self, ctx: &LineContext<'_>) -> Option<Rewrite> {
        if !guards_allow(&self.guards, ctx) {
            return None;
        }
        (self.f)(ctx)
    }
}
