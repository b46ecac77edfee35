//! Property-based tests for the built-in rule sets
//!
//! Documents are generated from a small task grammar: optional play header,
//! tasks with a name, one module block with arguments at a random indentation
//! step, and a few item-level fields. Modules may sit on the dash line, tasks
//! may carry `loop:` data that looks like module calls, and some lines run past
//! the width limit. For every such document:
//! - each rule set reaches a fixpoint in one pass
//! - field injection only ever adds lines, and only inside file module blocks
//! - the composed default chain is stable on its own output
//! - the output still parses as YAML
//! - sets that never touch the same lines give the same result run one after
//!   the other as folded into a single set

use blockfix_engine::catalog::{modules, style, tasks};
use blockfix_engine::structure::{extent_of, has_field, key_of};
use blockfix_engine::{apply_pass, apply_sets, Document, RuleOptions, RuleRegistry, RuleSet};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Module {
    File { state: Option<&'static str> },
    Copy { dest: &'static str },
    Command { cmd: &'static str },
    Shell { cmd: &'static str },
    Service { unit: &'static str },
    /// `- file:` with its arguments below and the task keywords after them.
    DashFile,
    /// `- shell: cmd` followed by a condition using a Jinja filter.
    DashShell,
}

/// A line past the default width limit.
#[derive(Debug, Clone, Copy)]
enum Wide {
    Name,
    Notify,
    Commented,
}

#[derive(Debug, Clone)]
struct Task {
    name: String,
    qualified: bool,
    module: Module,
    register: bool,
    flag: Option<&'static str>,
    loop_data: bool,
    wide: Option<Wide>,
}

fn module_strategy() -> impl Strategy<Value = Module> {
    prop_oneof![
        prop::option::of(prop_oneof![
            Just("directory"),
            Just("touch"),
            Just("absent")
        ])
        .prop_map(|state| Module::File { state }),
        prop_oneof![Just("/etc/app.conf"), Just("/usr/local/bin/run"), Just("/opt/x.sh")]
            .prop_map(|dest| Module::Copy { dest }),
        prop_oneof![Just("cat /etc/hosts"), Just("systemctl daemon-reload"), Just("id -u")]
            .prop_map(|cmd| Module::Command { cmd }),
        prop_oneof![Just("ps aux | wc -l"), Just("echo hi"), Just("a || b")]
            .prop_map(|cmd| Module::Shell { cmd }),
        prop_oneof![Just("Nginx"), Just("php-fpm"), Just("sshd")]
            .prop_map(|unit| Module::Service { unit }),
        Just(Module::DashFile),
        Just(Module::DashShell),
    ]
}

fn task_strategy() -> impl Strategy<Value = Task> {
    (
        "[a-zA-Z][a-z ]{0,12}[a-z]",
        any::<bool>(),
        module_strategy(),
        any::<bool>(),
        prop::option::of(prop_oneof![
            Just("become: yes"),
            Just("ignore_errors: true"),
            Just("tags: [a,b]"),
            Just("check_mode: no   "),
        ]),
        any::<bool>(),
        prop::option::of(prop_oneof![
            Just(Wide::Name),
            Just(Wide::Notify),
            Just(Wide::Commented)
        ]),
    )
        .prop_map(|(name, qualified, module, register, flag, loop_data, wide)| Task {
            name,
            qualified,
            module,
            register,
            flag,
            loop_data,
            wide,
        })
}

fn comma_list(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{prefix}{i:03}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_task(task: &Task, base: usize, step: usize) -> Vec<String> {
    let item = " ".repeat(base);
    let field = " ".repeat(base + 2);
    let arg = " ".repeat(base + 2 + step);
    let qualify = |module: &str| {
        if task.qualified {
            format!("ansible.builtin.{module}")
        } else {
            module.to_string()
        }
    };
    let name = match task.wide {
        Some(Wide::Name) => format!("install {}", comma_list("pkg", 30)),
        _ => task.name.clone(),
    };

    let mut out = match &task.module {
        Module::DashFile => vec![
            format!("{item}- {}:", qualify("file")),
            format!("{arg}path: /srv/data"),
            format!("{field}name: {name}"),
        ],
        Module::DashShell => vec![
            format!("{item}- {}: /usr/local/bin/reload", qualify("shell")),
            format!("{field}name: {name}"),
            format!("{field}when: reload_enabled | bool"),
        ],
        _ => vec![format!("{item}- name: {name}")],
    };
    match &task.module {
        Module::File { state } => {
            out.push(format!("{field}{}:", qualify("file")));
            out.push(format!("{arg}path: /srv/data"));
            if let Some(state) = state {
                out.push(format!("{arg}state: {state}"));
            }
        }
        Module::Copy { dest } => {
            out.push(format!("{field}{}:", qualify("copy")));
            out.push(format!("{arg}src: files/app"));
            out.push(format!("{arg}dest: {dest}"));
        }
        Module::Command { cmd } => out.push(format!("{field}{}: {cmd}", qualify("command"))),
        Module::Shell { cmd } => out.push(format!("{field}{}: {cmd}", qualify("shell"))),
        Module::Service { unit } => {
            out.push(format!("{field}{}:", qualify("service")));
            out.push(format!("{arg}name: {unit}"));
            out.push(format!("{arg}state: restarted"));
        }
        Module::DashFile | Module::DashShell => {}
    }
    if task.loop_data {
        out.push(format!("{field}loop:"));
        out.push(format!("{field}  - template: nginx.conf.j2"));
        out.push(format!("{field}    dest: /etc/nginx/nginx.conf"));
    }
    if task.register {
        out.push(format!("{field}register: result"));
    }
    if let Some(flag) = task.flag {
        out.push(format!("{field}{flag}"));
    }
    match task.wide {
        Some(Wide::Notify) => out.push(format!("{field}notify: [{}]", comma_list("h", 30))),
        Some(Wide::Commented) => {
            out.push(format!("{field}retries: 3  # {}", comma_list("note", 30)))
        }
        Some(Wide::Name) | None => {}
    }
    out
}

fn document_strategy() -> impl Strategy<Value = Vec<String>> {
    (
        any::<bool>(),
        prop_oneof![Just(2usize), Just(4usize)],
        prop::collection::vec(task_strategy(), 1..6),
        any::<bool>(),
    )
        .prop_map(|(in_play, step, tasks, spaced)| {
            let mut lines = Vec::new();
            let base = if in_play {
                lines.push("- hosts: all".to_string());
                lines.push("  tasks:".to_string());
                4
            } else {
                0
            };
            for task in &tasks {
                lines.extend(render_task(task, base, step));
                if spaced {
                    lines.push(String::new());
                }
            }
            lines
        })
}

fn parses(text: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(text).is_ok()
}

fn default_permissions() -> RuleSet {
    tasks::file_permissions(&RuleOptions::default())
}

type Build = fn() -> RuleSet;

/// Pairs of sets whose rules never match the same line of a generated document.
const DISJOINT: &[(Build, Build)] = &[
    (style::truthy, modules::service_names),
    (default_permissions, tasks::changed_when),
    (tasks::pipefail, tasks::ignore_errors),
];

fn folded(sets: [RuleSet; 2]) -> RuleSet {
    sets.into_iter()
        .flat_map(RuleSet::into_rules)
        .fold(RuleSet::new("folded", ""), RuleSet::with_rule)
}

proptest! {
    #[test]
    fn every_rule_set_is_idempotent(lines in document_strategy()) {
        let registry = RuleRegistry::with_defaults();
        let doc = Document::from_lines(lines);
        for set in registry.list_all() {
            let first = apply_pass(&doc, set).unwrap();
            let second = apply_pass(&first.document, set).unwrap();
            prop_assert!(
                !second.changed,
                "{} is not idempotent:\n{}",
                set.name(),
                first.document.render()
            );
            prop_assert!(second.applied.is_empty());
        }
    }

    #[test]
    fn file_modes_are_only_added(lines in document_strategy()) {
        let registry = RuleRegistry::with_defaults();
        let set = registry.get("file-permissions").unwrap();
        let doc = Document::from_lines(lines.clone());
        let outcome = apply_pass(&doc, set).unwrap();
        let out = outcome.document.lines();

        // Removing the reported insertions gives back the input.
        let inserted: Vec<usize> = outcome.applied.iter().map(|a| a.line - 1).collect();
        let kept: Vec<&String> = out
            .iter()
            .enumerate()
            .filter(|(idx, _)| !inserted.contains(idx))
            .map(|(_, line)| line)
            .collect();
        prop_assert_eq!(kept, lines.iter().collect::<Vec<_>>());

        for idx in inserted {
            prop_assert_eq!(key_of(&out[idx]), Some("mode"));
            let owner = (0..idx)
                .rev()
                .find(|&start| {
                    extent_of(out, start).map_or(false, |extent| {
                        extent.contains(idx)
                            && matches!(
                                key_of(&out[start]),
                                Some("file") | Some("copy")
                                    | Some("ansible.builtin.file")
                                    | Some("ansible.builtin.copy")
                            )
                    })
                });
            prop_assert!(owner.is_some(), "mode injected outside a file block at {}", idx);
            let extent = extent_of(out, owner.unwrap()).unwrap();
            prop_assert!(has_field(out, extent, "mode"));
        }
    }

    #[test]
    fn default_chain_is_stable(lines in document_strategy()) {
        let registry = RuleRegistry::with_defaults();
        let sets = registry.resolve(&registry.default_enabled()).unwrap();
        let doc = Document::from_lines(lines);
        let first = apply_sets(&doc, &sets).unwrap();
        let second = apply_sets(&first.document, &sets).unwrap();
        prop_assert!(!second.changed, "chain not stable:\n{}", first.document.render());
    }

    #[test]
    fn output_stays_valid_yaml(lines in document_strategy()) {
        let doc = Document::from_lines(lines);
        prop_assume!(parses(&doc.render()));

        let registry = RuleRegistry::with_defaults();
        let enabled = registry.default_enabled();
        for name in &enabled {
            let set = registry.get(name).unwrap();
            let out = apply_pass(&doc, set).unwrap().document.render();
            prop_assert!(parses(&out), "{} broke the document:\n{}", name, out);
        }
        let sets = registry.resolve(&enabled).unwrap();
        let out = apply_sets(&doc, &sets).unwrap().document.render();
        prop_assert!(parses(&out), "default chain broke the document:\n{}", out);
    }

    #[test]
    fn disjoint_sets_compose_like_one_set(lines in document_strategy()) {
        let doc = Document::from_lines(lines);
        for (first, second) in DISJOINT {
            let (a, b) = (first(), second());
            let one_after_other = apply_sets(&doc, &[&a, &b]).unwrap();
            let together = apply_pass(&doc, &folded([first(), second()])).unwrap();
            prop_assert_eq!(
                one_after_other.document.render(),
                together.document.render(),
                "{} then {}",
                a.name(),
                b.name()
            );
            prop_assert_eq!(one_after_other.applied.len(), together.applied.len());
        }
    }
}
