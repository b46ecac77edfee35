//! Width-aware reflow of over-long lines.
//!
//! A line wider than the limit is split at commas, greedily packing as many
//! pieces as fit. Continuation lines are indented two columns past the line's
//! content column (past the `- ` of a list item) so they read as a folded
//! continuation of the same value and never as a sibling key. The rule only
//! fires when the result is clean: at least two lines, every one within the
//! limit and carrying plain text that cannot be read as a key, a list item or
//! a comment. Lines holding a template expression, a URL or a trailing comment
//! are never touched, since a comma there is not a safe split point.

use super::{LineContext, LineRule, Rewrite};
use crate::structure::indentation::content_column;
use crate::structure::{classify, LineClass};

pub const DEFAULT_MAX_WIDTH: usize = 160;

const SEPARATOR: char = ',';
const UNSAFE_MARKERS: &[&str] = &["{{", "{%", "://"];

#[derive(Debug, Clone)]
pub struct Reflow {
    max_width: usize,
}

impl Reflow {
    pub fn new(max_width: usize) -> Self {
        Reflow { max_width }
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// The split form of `line`, or `None` when it fits or cannot be split safely.
    pub fn split(&self, line: &str) -> Option<Vec<String>> {
        if width(line) <= self.max_width || classify(line) == LineClass::Comment {
            return None;
        }
        if !line.contains(SEPARATOR) || UNSAFE_MARKERS.iter().any(|m| line.contains(m)) {
            return None;
        }
        if comment_start(line).is_some() {
            return None;
        }

        let continuation = " ".repeat(content_column(line) + 2);
        let mut pieces = line.split(SEPARATOR);
        let mut current = pieces.next()?.to_string();
        let mut out = Vec::new();

        for piece in pieces {
            // Strictly below the limit: a flushed line still gains a trailing comma.
            let joined_width = width(&current) + 1 + width(piece);
            if joined_width < self.max_width {
                current.push(SEPARATOR);
                current.push_str(piece);
            } else {
                current.push(SEPARATOR);
                out.push(current);
                let piece = piece.trim_start();
                if piece.is_empty() {
                    return None;
                }
                current = format!("{continuation}{piece}");
            }
        }
        out.push(current);

        let clean = out.len() >= 2
            && out.iter().all(|l| width(l) <= self.max_width)
            && out.iter().skip(1).all(|l| is_plain_continuation(l));
        clean.then_some(out)
    }
}

impl Default for Reflow {
    fn default() -> Self {
        Reflow::new(DEFAULT_MAX_WIDTH)
    }
}

impl LineRule for Reflow {
    fn name(&self) -> &str {
        "reflow"
    }

    fn rewrite(&self, ctx: &LineContext<'_>) -> Option<Rewrite> {
        let lines = self.split(ctx.line())?;
        // Line breaks inside a literal scalar are content.
        if ctx.in_block_scalar() {
            return None;
        }
        Some(Rewrite::Split(lines))
    }
}

fn width(line: &str) -> usize {
    line.chars().count()
}

fn is_plain_continuation(line: &str) -> bool {
    !line.trim().is_empty() && classify(line) == LineClass::Continuation && !line.contains(": ")
}

/// Byte offset of a `#` that starts a comment: at the start of the line or after
/// whitespace, and outside quotes.
fn comment_start(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut prev = ' ';
    let mut chars = line.char_indices();

    while let Some((idx, c)) = chars.next() {
        match quote {
            Some('"') if c == '\\' => {
                chars.next();
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            // A quote only opens a quoted scalar at the start of a token.
            None if (c == '"' || c == '\'') && (prev.is_whitespace() || "[{,:".contains(prev)) => {
                quote = Some(c);
            }
            None if c == '#' && prev.is_whitespace() => return Some(idx),
            None => {}
        }
        prev = c;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comma_list(prefix: &str, items: usize) -> String {
        let values: Vec<String> = (0..items).map(|i| format!("package_{i:03}")).collect();
        format!("{prefix}{}", values.join(", "))
    }

    #[test]
    fn test_split_fits_width() {
        let line = comma_list("    packages: ", 16);
        assert!(line.len() > 160);
        let out = Reflow::default().split(&line).unwrap();
        assert!(out.len() >= 2);
        assert!(out.iter().all(|l| l.chars().count() <= 160));
        assert!(out[1].starts_with("      package_"));
        assert!(out[0].ends_with(','));
    }

    #[test]
    fn test_split_preserves_content() {
        let line = comma_list("  - ", 20);
        let out = Reflow::new(60).split(&line).unwrap();
        let rejoined = out
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, line.trim());
    }

    #[test]
    fn test_short_line_untouched() {
        assert_eq!(Reflow::default().split("  name: a, b, c"), None);
    }

    #[test]
    fn test_templated_line_untouched() {
        let line = format!("    msg: \"{{{{ item }}}}, {}\"", "x, ".repeat(60));
        assert!(line.len() > 160);
        assert_eq!(Reflow::default().split(&line), None);
    }

    #[test]
    fn test_url_line_untouched() {
        let line = format!("    url: https://example.com/?q={}", "a,".repeat(90));
        assert_eq!(Reflow::default().split(&line), None);
    }

    #[test]
    fn test_no_separator_untouched() {
        let line = format!("    msg: {}", "word ".repeat(40));
        assert_eq!(Reflow::default().split(&line), None);
    }

    #[test]
    fn test_unsplittable_piece_declines() {
        let line = format!("    msg: {}, tail", "x".repeat(200));
        assert_eq!(Reflow::default().split(&line), None);
    }

    #[test]
    fn test_list_item_continuation_is_past_the_key() {
        let line = format!(
            "- name: install {}",
            (0..30).map(|i| format!("pkg{i:03}")).collect::<Vec<_>>().join(", ")
        );
        let out = Reflow::default().split(&line).unwrap();
        assert!(out[1].starts_with("    pkg"));

        let text = format!("{}\n  become: true\n", out.join("\n"));
        let value: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        let name = value[0]["name"].as_str().unwrap();
        assert!(name.starts_with("install pkg000, pkg001"));
        assert!(name.ends_with("pkg029"));
        assert_eq!(value[0]["become"], serde_yaml::Value::Bool(true));
    }

    #[test]
    fn test_trailing_comment_untouched() {
        let notes: Vec<String> = (0..30).map(|i| format!("note{i}")).collect();
        let line = format!("    pkgs: [a, b]  # {}", notes.join(", "));
        assert!(line.len() > 160);
        assert_eq!(Reflow::default().split(&line), None);
    }

    #[test]
    fn test_hash_inside_quotes_is_not_a_comment() {
        assert_eq!(comment_start("  msg: \"a # b\", c"), None);
        assert_eq!(comment_start("  url: http://x/#frag"), None);
        assert_eq!(comment_start("  pkgs: [a]  # note"), Some(13));
        assert_eq!(comment_start("  msg: it's # here"), Some(12));
    }

    #[test]
    fn test_piece_that_reads_as_a_key_declines() {
        let line = format!("    msg: {}, state: done", vec!["x".repeat(60); 3].join(", "));
        assert!(line.len() > 160);
        assert_eq!(Reflow::default().split(&line), None);
    }

    #[test]
    fn test_comment_untouched() {
        let line = format!("  # {}", "note, ".repeat(40));
        assert_eq!(Reflow::default().split(&line), None);
    }
}
