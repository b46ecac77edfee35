//! Pattern rule sets
//!
//! A rule set is an ordered, compiled-in table of rules. There are two seams:
//!
//! - [`LineRule`]: looks at one line (with read-only access to its surroundings
//!   through [`LineContext`]) and proposes a rewrite: replace, delete, or split
//!   into several lines. Within a set the first line rule that answers wins.
//! - [`BlockRule`]: picks block start lines, receives the freshly computed extent
//!   and proposes a single edit inside the block: a field insertion or a
//!   one-line replacement.
//!
//! The generic rule kinds live in the submodules: [`line::Substitution`] and
//! [`line::LineFn`] for line rules, [`reflow::Reflow`] for width-aware splitting,
//! [`block::FieldInjection`] and [`block::ScopedRewrite`] for block rules.
//!
//! Authoring constraint: two rules of one set should never match the same line
//! class. Ordering makes the outcome deterministic, but the pass runner only
//! guarantees idempotence when the matchers are disjoint and each rule's output no
//! longer matches its own matcher.

pub mod block;
pub mod context;
pub mod line;
pub mod reflow;

pub use block::{BlockTarget, BlockView, FieldInjection, ScopedRewrite};
pub use context::LineContext;
pub use line::{Guard, LineFn, Replacement, Substitution};
pub use reflow::Reflow;

use crate::structure::Extent;
use std::path::{Component, Path};

/// Outcome proposed by a line rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    Replace(String),
    Delete,
    Split(Vec<String>),
}

pub trait LineRule: Send + Sync {
    fn name(&self) -> &str;

    /// `None` when the rule does not match the line.
    fn rewrite(&self, ctx: &LineContext<'_>) -> Option<Rewrite>;
}

/// Single edit proposed by a block rule, in buffer coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEdit {
    Insert { index: usize, line: String },
    Replace { index: usize, line: String },
}

pub trait BlockRule: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the line at `index` starts a block this rule cares about.
    fn matches(&self, lines: &[String], index: usize) -> bool;

    /// Edit for the block, or `None` when it already satisfies the rule.
    fn edit(&self, lines: &[String], extent: Extent) -> Option<BlockEdit>;
}

pub enum Rule {
    Line(Box<dyn LineRule>),
    Block(Box<dyn BlockRule>),
}

impl Rule {
    pub fn line<R: LineRule + 'static>(rule: R) -> Self {
        Rule::Line(Box::new(rule))
    }

    pub fn block<R: BlockRule + 'static>(rule: R) -> Self {
        Rule::Block(Box::new(rule))
    }

    pub fn name(&self) -> &str {
        match self {
            Rule::Line(rule) => rule.name(),
            Rule::Block(rule) => rule.name(),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Line(rule) => write!(f, "Rule::Line({})", rule.name()),
            Rule::Block(rule) => write!(f, "Rule::Block({})", rule.name()),
        }
    }
}

/// Which files a rule set is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    All,
    /// Some directory component is in `include` and none is in `exclude`.
    Within {
        include: &'static [&'static str],
        exclude: &'static [&'static str],
    },
    /// The file name matches exactly.
    FileNamed(&'static str),
}

impl PathScope {
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            PathScope::All => true,
            PathScope::Within { include, exclude } => {
                let dirs: Vec<&str> = path
                    .parent()
                    .into_iter()
                    .flat_map(|parent| parent.components())
                    .filter_map(|c| match c {
                        Component::Normal(name) => name.to_str(),
                        _ => None,
                    })
                    .collect();
                dirs.iter().any(|d| include.contains(d)) && !dirs.iter().any(|d| exclude.contains(d))
            }
            PathScope::FileNamed(name) => {
                path.file_name().and_then(|n| n.to_str()) == Some(*name)
            }
        }
    }
}

#[derive(Debug)]
pub struct RuleSet {
    name: String,
    description: String,
    rules: Vec<Rule>,
    scope: PathScope,
    ensure_final_newline: bool,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        RuleSet {
            name: name.into(),
            description: description.into(),
            rules: Vec::new(),
            scope: PathScope::All,
            ensure_final_newline: false,
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_scope(mut self, scope: PathScope) -> Self {
        self.scope = scope;
        self
    }

    /// Make every pass end the document with exactly one line terminator.
    pub fn ensuring_final_newline(mut self) -> Self {
        self.ensure_final_newline = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn scope(&self) -> PathScope {
        self.scope
    }

    pub fn ensures_final_newline(&self) -> bool {
        self.ensure_final_newline
    }

    pub fn applies_to(&self, path: &Path) -> bool {
        self.scope.accepts(path)
    }

    /// Take the rules out, e.g. to fold several sets into one.
    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    pub fn line_rules(&self) -> impl Iterator<Item = &dyn LineRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Line(rule) => Some(rule.as_ref()),
            Rule::Block(_) => None,
        })
    }

    pub fn block_rules(&self) -> impl Iterator<Item = &dyn BlockRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Block(rule) => Some(rule.as_ref()),
            Rule::Line(_) => None,
        })
    }
}
