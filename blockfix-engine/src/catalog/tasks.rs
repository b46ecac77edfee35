//! Task safety rule sets: explicit file modes, `changed_when` for read-only
//! commands, `pipefail` for shell pipelines, and `ignore_errors` replacement.

use super::{RuleOptions, CONTENT_SCOPE};
use crate::rules::{
    BlockTarget, BlockView, FieldInjection, Guard, LineContext, Replacement, Rule, RuleSet,
    ScopedRewrite, Substitution,
};
use crate::structure::indentation::{content_column, is_block_scalar_indicator, value_offset};
use crate::structure::{classify, depth_of, inline_value, key_of, Anchors, LineClass};
use once_cell::sync::Lazy;
use regex::Regex;

pub const FILE_PERMISSIONS: &str = "file-permissions";
pub const CHANGED_WHEN: &str = "changed-when";
pub const PIPEFAIL: &str = "pipefail";
pub const IGNORE_ERRORS: &str = "ignore-errors";

const FILE_MODULES: &[&str] = &[
    "file",
    "copy",
    "template",
    "ansible.builtin.file",
    "ansible.builtin.copy",
    "ansible.builtin.template",
];

const COMMAND_MODULES: &[&str] = &[
    "command",
    "shell",
    "ansible.builtin.command",
    "ansible.builtin.shell",
];

const SHELL_MODULES: &[&str] = &["shell", "ansible.builtin.shell"];

/// Commands that only read state.
const READ_ONLY_COMMANDS: &[&str] = &[
    "grep", "cat", "ls", "echo", "test", "which", "stat", "getent", "id",
];

const PERMISSION_ANCHORS: Anchors<'static> = Anchors::new(
    &["owner", "group", "dest", "path", "state"],
    &["when", "notify", "tags", "register"],
);

const CHANGED_WHEN_ANCHORS: Anchors<'static> =
    Anchors::new(&["register"], &["when", "notify", "tags", "loop"]);

const PIPEFAIL_PREFIX: &str = "set -o pipefail && ";

/// Jinja expressions and statements; a `|` inside one is a filter.
static TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{.*?\}\}|\{%.*?%\}").unwrap());

static IGNORE_ERRORS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)ignore_errors:[ \t]*(?:true|True|TRUE|yes|Yes)[ \t]*$").unwrap()
});

pub fn file_permissions(options: &RuleOptions) -> RuleSet {
    let file_mode = options.file_mode.clone();
    let directory_mode = options.directory_mode.clone();

    RuleSet::new(FILE_PERMISSIONS, "Give file, copy and template tasks an explicit mode")
        .with_rule(Rule::block(
            FieldInjection::new(
                "explicit-mode",
                BlockTarget::Keys(FILE_MODULES),
                "mode",
                move |view| mode_for(view, &file_mode, &directory_mode),
            )
            .with_anchors(PERMISSION_ANCHORS),
        ))
        .with_scope(CONTENT_SCOPE)
}

/// Mode for a file module block, or `None` when a mode would be wrong or
/// cannot be placed.
fn mode_for(view: &BlockView<'_>, file_mode: &str, directory_mode: &str) -> Option<String> {
    // `- template:` entries of `loop:` data are not tasks.
    if !is_task(view) {
        return None;
    }
    let start_is_item = classify(view.start_line()) == LineClass::ListItemStart;
    let inline_args = view.start_value().unwrap_or("");

    // `file: path=/x` cannot take a nested field, and free-form args carry
    // their own `mode=`.
    if (!start_is_item && !inline_args.is_empty()) || inline_args.contains('=') {
        return None;
    }
    if view.has_field("recurse") {
        return None;
    }

    let state = view.field_value("state").map(unquote);
    if matches!(state, Some("absent") | Some("link") | Some("hard")) {
        return None;
    }

    let executable = ["dest", "path", "src"]
        .iter()
        .filter_map(|key| view.field_value(key))
        .map(unquote)
        .any(|target| target.ends_with(".sh") || target.contains("/bin/"));

    let mode = if state == Some("directory") || executable {
        directory_mode
    } else {
        file_mode
    };
    Some(mode.to_string())
}

pub fn changed_when() -> RuleSet {
    RuleSet::new(CHANGED_WHEN, "Mark read-only command tasks as never changing")
        .with_rule(Rule::block(
            FieldInjection::new(
                "read-only-command",
                BlockTarget::ItemsWithKey(COMMAND_MODULES),
                "changed_when",
                |view| is_read_only_task(view).then(|| "false".to_string()),
            )
            .with_anchors(CHANGED_WHEN_ANCHORS),
        ))
        .with_scope(CONTENT_SCOPE)
}

/// The block is a task, or a module key directly inside one.
fn is_task(view: &BlockView<'_>) -> bool {
    let ctx = LineContext::new(view.lines, view.extent.start);
    ctx.is_item_level() && ctx.in_task_list()
}

fn is_read_only_task(view: &BlockView<'_>) -> bool {
    if !is_task(view) {
        return false;
    }
    let Some((index, _)) = view.find_key(COMMAND_MODULES) else {
        return false;
    };
    // `- command:` with its arguments below: the item's interior is the module
    // arguments, so an item-level field has nowhere to go.
    if index == view.extent.start && view.start_value().is_none() {
        return false;
    }
    let Some(command) = command_line(view.lines, index) else {
        return false;
    };
    if command.text.contains("creates=") || command.text.contains("removes=") {
        return false;
    }
    let guarded = view
        .block_lines()
        .iter()
        .any(|line| matches!(key_of(line), Some("creates") | Some("removes")));
    if guarded {
        return false;
    }
    let text = command.text.strip_prefix(PIPEFAIL_PREFIX).unwrap_or(command.text);
    let first_word = unquote(text).split_whitespace().next().unwrap_or("");
    READ_ONLY_COMMANDS.contains(&first_word)
}

pub fn pipefail() -> RuleSet {
    RuleSet::new(PIPEFAIL, "Fail shell pipelines when any stage fails")
        .with_rule(Rule::block(ScopedRewrite::new(
            "pipefail",
            BlockTarget::ItemsWithKey(SHELL_MODULES),
            add_pipefail,
        )))
        .with_scope(CONTENT_SCOPE)
}

fn add_pipefail(view: &BlockView<'_>) -> Option<(usize, String)> {
    if !is_task(view) || view.contains_text("pipefail") {
        return None;
    }
    let (module, _) = view.find_key(SHELL_MODULES)?;
    if !command_texts(view.lines, module).into_iter().any(has_pipe) {
        return None;
    }

    let command = command_line(view.lines, module)?;
    let line = &view.lines[command.index];
    let offset = if command.inline {
        let offset = value_offset(line)?;
        match line[offset..].chars().next() {
            Some('"') | Some('\'') => offset + 1,
            _ => offset,
        }
    } else {
        depth_of(line)
    };
    let mut fixed = line.clone();
    fixed.insert_str(offset, PIPEFAIL_PREFIX);
    Some((command.index, fixed))
}

/// Whether a piece of command text holds a shell pipe: a `|` that is not part
/// of `||`, a block scalar indicator or a Jinja filter.
fn has_pipe(text: &str) -> bool {
    if classify(text) == LineClass::Comment || is_block_scalar_indicator(text) {
        return false;
    }
    let text = TEMPLATE_RE.replace_all(text, "");
    let bytes = text.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'|' && bytes.get(i + 1) != Some(&b'|') && (i == 0 || bytes[i - 1] != b'|')
    })
}

/// First command of a command or shell module.
struct CommandLine<'a> {
    index: usize,
    text: &'a str,
    /// The command is the inline value of a `key:` line rather than a line of
    /// a block scalar.
    inline: bool,
}

/// The line holding the command: the module line itself when it carries a
/// value, its `cmd` argument otherwise.
fn command_key(lines: &[String], module: usize) -> Option<usize> {
    if inline_value(&lines[module]).is_some() {
        return Some(module);
    }
    value_lines(lines, module).find(|&idx| {
        classify(&lines[idx]) == LineClass::Parameter && key_of(&lines[idx]) == Some("cmd")
    })
}

/// The inline value, the first line of a block scalar, or the `cmd` argument.
fn command_line(lines: &[String], module: usize) -> Option<CommandLine<'_>> {
    let key = command_key(lines, module)?;
    match inline_value(&lines[key])? {
        value if is_block_scalar_indicator(value) => value_lines(lines, key)
            .map(|idx| (idx, lines[idx].trim()))
            .find(|(_, text)| !text.is_empty() && !text.starts_with('#'))
            .map(|(index, text)| CommandLine {
                index,
                text,
                inline: false,
            }),
        text => Some(CommandLine {
            index: key,
            text,
            inline: true,
        }),
    }
}

/// Every piece of the command text: the inline value, or each script line.
fn command_texts(lines: &[String], module: usize) -> Vec<&str> {
    let Some(key) = command_key(lines, module) else {
        return Vec::new();
    };
    match inline_value(&lines[key]) {
        Some(value) if is_block_scalar_indicator(value) => {
            value_lines(lines, key).map(|idx| lines[idx].trim()).collect()
        }
        Some(text) => vec![text],
        None => Vec::new(),
    }
}

/// Lines of the value opened by the key at `key`: everything indented past the
/// key's column. Under `- shell: |` that stops at the task's other keywords.
fn value_lines(lines: &[String], key: usize) -> impl Iterator<Item = usize> + '_ {
    let column = content_column(&lines[key]);
    (key + 1..lines.len())
        .take_while(move |&idx| lines[idx].trim().is_empty() || depth_of(&lines[idx]) > column)
}

fn unquote(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

pub fn ignore_errors() -> RuleSet {
    RuleSet::new(IGNORE_ERRORS, "Replace unexplained ignore_errors with failed_when")
        .with_rule(Rule::line(
            Substitution::new(
                "failed-when",
                IGNORE_ERRORS_RE.clone(),
                Replacement::Template("${indent}failed_when: false"),
            )
            .guarded(Guard::ItemLevel)
            .guarded(Guard::NotAfterComment)
            .guarded(Guard::OwnerLacks("failed_when")),
        ))
        .with_scope(CONTENT_SCOPE)
}
