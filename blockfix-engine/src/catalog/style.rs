//! Style rule sets: whitespace, truthy values, comma spacing, task name casing
//! and line length.

use super::CONTENT_SCOPE;
use crate::rules::{Guard, LineContext, LineFn, Reflow, Replacement, Rewrite, Rule, RuleSet, Substitution};
use crate::structure::{classify, key_of, LineClass};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const FORMATTING: &str = "formatting";
pub const TRUTHY: &str = "truthy";
pub const COMMA_SPACING: &str = "comma-spacing";
pub const NAME_CASING: &str = "name-casing";
pub const LINE_LENGTH: &str = "line-length";

static TRAILING_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+$").unwrap());

static TRUTHY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<head>[^#]*?:[ \t]+)(?P<value>yes|Yes|YES|no|No|NO|on|On|ON|off|Off|OFF)[ \t]*$",
    )
    .unwrap()
});

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<head>[ \t]*(?:-[ \t]+)?name:[ \t]+["']?)(?P<first>\p{Ll})"#).unwrap()
});

const TEMPLATE_MARKERS: &[&str] = &["{{", "{%"];

pub fn formatting() -> RuleSet {
    RuleSet::new(FORMATTING, "Strip trailing whitespace and end with one newline")
        .with_rule(Rule::line(Substitution::new(
            "trailing-whitespace",
            TRAILING_WS_RE.clone(),
            Replacement::Template(""),
        )))
        .ensuring_final_newline()
}

pub fn truthy() -> RuleSet {
    RuleSet::new(TRUTHY, "Normalize yes/no/on/off values to true/false").with_rule(Rule::line(
        Substitution::new("truthy-value", TRUTHY_RE.clone(), Replacement::Fn(to_boolean))
            .guarded(Guard::OutsideBlockScalar),
    ))
}

fn to_boolean(caps: &Captures<'_>) -> String {
    let value = match caps["value"].to_ascii_lowercase().as_str() {
        "yes" | "on" => "true",
        _ => "false",
    };
    format!("{}{}", &caps["head"], value)
}

pub fn comma_spacing() -> RuleSet {
    RuleSet::new(COMMA_SPACING, "Add a space after commas in flow collections and tag lists")
        .with_rule(Rule::line(
            LineFn::new("space-after-comma", space_after_commas).guarded(Guard::OutsideBlockScalar),
        ))
}

fn space_after_commas(ctx: &LineContext<'_>) -> Option<Rewrite> {
    let line = ctx.line();
    if classify(line) == LineClass::Comment || TEMPLATE_MARKERS.iter().any(|m| line.contains(m)) {
        return None;
    }
    let listy = line.contains('[')
        || line.contains('{')
        || matches!(key_of(line), Some("tags") | Some("loop"));
    if !listy {
        return None;
    }
    let spaced = spaced_commas(line);
    (spaced != line).then_some(Rewrite::Replace(spaced))
}

/// Insert a space after every comma outside quotes that is directly followed by
/// a non-blank character.
fn spaced_commas(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        match (quote, c) {
            (Some('"'), '\\') => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            (Some(q), _) if c == q => quote = None,
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, ',') => {
                if chars.peek().map_or(false, |next| !next.is_whitespace()) {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
    out
}

pub fn name_casing() -> RuleSet {
    RuleSet::new(NAME_CASING, "Capitalize the first letter of task and play names").with_rule(
        Rule::line(
            Substitution::new("capitalize-name", NAME_RE.clone(), Replacement::Fn(capitalize))
                .guarded(Guard::ItemLevel)
                .guarded(Guard::TaskList)
                .guarded(Guard::OutsideBlockScalar),
        ),
    )
}

fn capitalize(caps: &Captures<'_>) -> String {
    format!("{}{}", &caps["head"], caps["first"].to_uppercase())
}

pub fn line_length(max_width: usize) -> RuleSet {
    RuleSet::new(LINE_LENGTH, "Split over-long lines at commas")
        .with_rule(Rule::line(Reflow::new(max_width)))
        .with_scope(CONTENT_SCOPE)
}
