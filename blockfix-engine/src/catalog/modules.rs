//! Module naming rule sets: fully qualified builtin module names, service name
//! normalization, and the molecule scenario cleanup.

use crate::rules::{Guard, PathScope, Replacement, Rule, RuleSet, Substitution};
use once_cell::sync::Lazy;
use regex::Regex;

pub const FQCN: &str = "fqcn";
pub const SERVICE_NAMES: &str = "service-names";
pub const MOLECULE: &str = "molecule";

/// Builtin modules commonly written with their short name.
pub const BUILTIN_MODULES: &[&str] = &[
    "command",
    "shell",
    "copy",
    "file",
    "template",
    "service",
    "systemd",
    "user",
    "group",
    "package",
    "yum",
    "apt",
    "dnf",
    "get_url",
    "unarchive",
    "stat",
    "find",
    "lineinfile",
    "replace",
    "blockinfile",
    "set_fact",
    "debug",
    "fail",
    "assert",
    "wait_for",
    "meta",
    "include_vars",
    "include_tasks",
    "import_tasks",
    "include_role",
    "import_role",
    "pause",
    "uri",
];

static SHORT_MODULE_RE: Lazy<Regex> = Lazy::new(|| {
    let modules = BUILTIN_MODULES.join("|");
    Regex::new(&format!(
        r"^(?P<head>[ \t]*(?:-[ \t]+)?)(?P<module>{modules}):(?P<tail>[ \t].*|$)"
    ))
    .unwrap()
});

/// Parameters that share their name with a module and got qualified by mistake.
static QUALIFIED_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)ansible\.builtin\.(?P<key>group|user|shell):[ \t]+(?P<value>.+)$")
        .unwrap()
});

static NGINX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>[ \t]*)name:[ \t]+Nginx[ \t]*$").unwrap());

static PHP_FPM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<indent>[ \t]*)name:[ \t]+php-fpm(?:\.service)?[ \t]*$").unwrap()
});

static COCKPIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<indent>[ \t]*)name:[ \t]+cockpit(?:\.socket)?[ \t]*$").unwrap()
});

static MOLECULE_COMMAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ansible\.builtin\.command:").unwrap());

pub fn fqcn() -> RuleSet {
    RuleSet::new(FQCN, "Use fully qualified names for builtin modules")
        .with_rule(Rule::line(
            Substitution::new(
                "qualify-module",
                SHORT_MODULE_RE.clone(),
                Replacement::Template("${head}ansible.builtin.${module}:${tail}"),
            )
            .guarded(Guard::ItemLevel)
            .guarded(Guard::TaskList)
            .guarded(Guard::OwnerLacks("hosts"))
            .guarded(Guard::OutsideBlockScalar),
        ))
        .with_rule(Rule::line(
            Substitution::new(
                "unqualify-parameter",
                QUALIFIED_PARAM_RE.clone(),
                Replacement::Template("${indent}${key}: ${value}"),
            )
            .guarded(Guard::Nested),
        ))
}

fn rename_unit(name: &str, pattern: &Regex, template: &'static str) -> Rule {
    Rule::line(
        Substitution::new(name, pattern.clone(), Replacement::Template(template))
            .guarded(Guard::Nested),
    )
}

pub fn service_names() -> RuleSet {
    RuleSet::new(SERVICE_NAMES, "Normalize service unit names in module arguments")
        .with_rule(rename_unit("nginx-unit", &NGINX_RE, "${indent}name: nginx"))
        .with_rule(rename_unit("php-fpm-unit", &PHP_FPM_RE, "${indent}name: php-fpm.service"))
        .with_rule(rename_unit("cockpit-unit", &COCKPIT_RE, "${indent}name: cockpit.socket"))
}

pub fn molecule() -> RuleSet {
    RuleSet::new(MOLECULE, "Drop stray command module lines from molecule scenarios")
        .with_rule(Rule::line(Substitution::new(
            "stray-command",
            MOLECULE_COMMAND_RE.clone(),
            Replacement::Delete,
        )))
        .with_scope(PathScope::FileNamed("molecule.yml"))
}
