//! Indentation model
//!
//! Depth and classification of a single line. Depth is the count of leading
//! whitespace characters, spaces and tabs alike, one unit each. Two lines are
//! siblings only when the block scanner says so; depth alone is never compared
//! against a symbolic level counter.

use once_cell::sync::Lazy;
use regex::Regex;

/// Key at the start of a line body: `key:` followed by whitespace or end of line.
static KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?P<key>[A-Za-z0-9_$][\w.$/-]*|"[^"]*"|'[^']*')[ \t]*:(?:[ \t]|$)"#).unwrap()
});

/// `|`, `>`, `|-`, `>+2` and friends, optionally followed by a comment.
static BLOCK_SCALAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[|>][-+0-9]*[ \t]*(?:#.*)?$").unwrap());

/// Derived classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Whitespace only, or a list marker with nothing after it.
    Blank,
    Comment,
    /// `- ` followed by content.
    ListItemStart,
    /// `key: value` or `key:`.
    Parameter,
    /// Anything else: scalar continuation lines, flow collections, document markers.
    Continuation,
}

fn is_indent_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Number of leading spaces and tabs.
pub fn depth_of(line: &str) -> usize {
    line.chars().take_while(|c| is_indent_char(*c)).count()
}

/// Classify a line by its first significant characters. A list marker wins
/// over a key, so `- name: x` is a [`LineClass::ListItemStart`].
pub fn classify(line: &str) -> LineClass {
    // Indent characters are single bytes, so depth doubles as a byte offset.
    let rest = &line[depth_of(line)..];
    if rest.trim().is_empty() {
        return LineClass::Blank;
    }
    if rest.starts_with('#') {
        return LineClass::Comment;
    }
    if let Some(after) = rest.strip_prefix('-') {
        if after.trim().is_empty() {
            return LineClass::Blank;
        }
        if after.starts_with(is_indent_char) {
            return LineClass::ListItemStart;
        }
    }
    if KEY_RE.is_match(rest) {
        return LineClass::Parameter;
    }
    LineClass::Continuation
}

/// Column where the content of a line starts, past any list marker.
///
/// `"  - name: x"` has depth 2 and content column 4.
pub fn content_column(line: &str) -> usize {
    let depth = depth_of(line);
    let rest = &line[depth..];
    match rest.strip_prefix('-') {
        Some(after) if after.starts_with(is_indent_char) => {
            depth + 1 + after.chars().take_while(|c| is_indent_char(*c)).count()
        }
        _ => depth,
    }
}

/// The line with its indentation and list marker removed.
pub fn item_body(line: &str) -> &str {
    &line[content_column(line)..]
}

/// The mapping key carried by a line, if any.
///
/// Works for plain parameter lines and for list items that open a mapping
/// (`- name: x` yields `name`).
pub fn key_of(line: &str) -> Option<&str> {
    match classify(line) {
        LineClass::Parameter | LineClass::ListItemStart => KEY_RE
            .captures(item_body(line))
            .and_then(|caps| caps.name("key"))
            .map(|m| m.as_str()),
        _ => None,
    }
}

/// Text after `key:` on the same line, trimmed; `None` when empty.
pub fn inline_value(line: &str) -> Option<&str> {
    let body = item_body(line);
    let caps = KEY_RE.captures(body)?;
    let end = caps.get(0)?.end();
    let value = body[end..].trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Byte offset where the inline value starts, e.g. 9 for `- shell: ls`.
pub fn value_offset(line: &str) -> Option<usize> {
    let column = content_column(line);
    let body = &line[column..];
    let end = KEY_RE.captures(body)?.get(0)?.end();
    let rest = &body[end..];
    if rest.trim().is_empty() {
        return None;
    }
    Some(column + end + (rest.len() - rest.trim_start().len()))
}

/// Whether a value opens a literal or folded block scalar.
pub fn is_block_scalar_indicator(value: &str) -> bool {
    BLOCK_SCALAR_RE.is_match(value.trim())
}

/// The indent step used by a document: the smallest positive depth increase
/// between consecutive structural lines. Defaults to 2 when nothing is nested.
pub fn indent_step<S: AsRef<str>>(lines: &[S]) -> usize {
    let mut previous: Option<usize> = None;
    let mut step: Option<usize> = None;
    for line in lines {
        let line = line.as_ref();
        if matches!(classify(line), LineClass::Blank | LineClass::Comment) {
            continue;
        }
        let depth = depth_of(line);
        if let Some(prev) = previous {
            if depth > prev {
                let delta = depth - prev;
                step = Some(step.map_or(delta, |s: usize| s.min(delta)));
            }
        }
        previous = Some(depth);
    }
    step.unwrap_or(2)
}
