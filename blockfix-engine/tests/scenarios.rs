//! End-to-end behaviour of the block editor on small task documents.

use blockfix_engine::catalog::{style, tasks};
use blockfix_engine::rules::{BlockTarget, FieldInjection, Reflow};
use blockfix_engine::structure::{extent_of, fields, has_field, insertion_index, Anchors};
use blockfix_engine::{apply_pass, Document, Rule, RuleOptions, RuleRegistry, RuleSet};

fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|l| l.to_string()).collect()
}

fn builtin_set(name: &str) -> RuleSet {
    match name {
        "file-permissions" => tasks::file_permissions(&RuleOptions::default()),
        "line-length" => style::line_length(RuleOptions::default().max_width),
        other => panic!("no constructor for {other}"),
    }
}

#[test]
fn register_anchor_places_new_field_last() {
    let doc = Document::from_lines(["- command: foo", "  register: out"]);
    let set = RuleSet::new("when", "").with_rule(Rule::block(
        FieldInjection::new("when", BlockTarget::Keys(&["command"]), "when", |_| {
            Some("out.changed".into())
        })
        .with_anchors(Anchors::new(&["register"], &[])),
    ));

    let outcome = apply_pass(&doc, &set).unwrap();
    assert!(outcome.changed);
    assert_eq!(
        outcome.document.lines(),
        lines(&["- command: foo", "  register: out", "  when: out.changed"]).as_slice()
    );
    assert_eq!(outcome.applied.len(), 1);
    assert_eq!(outcome.applied[0].line, 3);
}

#[test]
fn directory_mode_is_appended_once() {
    let set = builtin_set("file-permissions");
    let doc = Document::from_lines(["- file: x", "  state: directory"]);

    let first = apply_pass(&doc, &set).unwrap();
    assert_eq!(
        first.document.lines(),
        lines(&["- file: x", "  state: directory", "  mode: '0755'"]).as_slice()
    );

    let second = apply_pass(&first.document, &set).unwrap();
    assert!(!second.changed);
    assert_eq!(second.document, first.document);
}

#[test]
fn long_comma_list_is_wrapped_and_template_left_alone() {
    let set = builtin_set("line-length");

    let items: Vec<String> = (0..24).map(|i| format!("pkg{i:03}")).collect();
    let long = format!("    packages: {}", items.join(", "));
    assert!(long.chars().count() >= 200);
    let outcome = apply_pass(&Document::from_lines([long.clone()]), &set).unwrap();
    assert!(outcome.changed);
    assert!(outcome.document.lines().len() >= 2);
    assert!(outcome
        .document
        .lines()
        .iter()
        .all(|l| l.chars().count() <= 160));

    let templated = format!("    msg: \"{{{{ a }}}}, {}\"", items.join(", "));
    assert!(templated.chars().count() >= 200);
    let outcome = apply_pass(&Document::from_lines([templated.clone()]), &set).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.document.lines(), &[templated]);
}

#[test]
fn empty_interior_reports_no_fields_and_injects_below_start() {
    let doc = lines(&["- name: a", "- name: b"]);
    let extent = extent_of(&doc, 0).unwrap();
    assert!(fields(&doc, extent).is_empty());
    for name in ["name", "mode", "when"] {
        assert!(!has_field(&doc, extent, name));
    }
    assert_eq!(insertion_index(&doc, extent, Anchors::NONE), 1);
}

#[test]
fn injection_leaves_other_blocks_untouched() {
    let set = builtin_set("file-permissions");
    let text = "\
- name: Config
  ansible.builtin.template:
    src: app.j2
    dest: /etc/app.conf
  notify: restart app

- name: Restart
  ansible.builtin.service:
    name: app
    state: restarted
";
    let outcome = apply_pass(&Document::parse(text), &set).unwrap();
    let out = outcome.document.lines();

    let template = extent_of(out, 1).unwrap();
    assert!(has_field(out, template, "mode"));
    let service = extent_of(out, 8).unwrap();
    let keys: Vec<_> = fields(out, service).iter().map(|f| f.key).collect();
    assert_eq!(keys, vec!["name", "state"]);
    assert_eq!(out.len(), text.lines().count() + 1);
}

#[test]
fn reflow_width_comes_from_options() {
    let set = RuleSet::new("narrow", "").with_rule(Rule::line(Reflow::new(30)));
    let doc = Document::from_lines(["  - alpha, beta, gamma, delta, epsilon, zeta"]);
    let outcome = apply_pass(&doc, &set).unwrap();
    assert_eq!(
        outcome.document.lines(),
        lines(&["  - alpha, beta, gamma, delta,", "      epsilon, zeta"]).as_slice()
    );
}

#[test]
fn crlf_documents_keep_their_line_endings() {
    let registry = RuleRegistry::with_defaults();
    let set = registry.get("truthy").unwrap();
    let outcome = apply_pass(&Document::parse("- become: yes\r\n  check: no\r\n"), set).unwrap();
    assert_eq!(outcome.document.render(), "- become: true\r\n  check: false\r\n");
}
