//! Field query
//!
//! A field is the key of a parameter line sitting exactly at the block's parameter
//! depth. The parameter depth is measured per block (depth of the first interior
//! line opening a key or a list item) rather than assumed from a fixed indent
//! width, so files mixing two- and four-space indentation still resolve correctly.
//! Folded scalar continuation lines never set it.
//!
//! Lines deeper than the parameter depth belong to a nested value and are skipped
//! without looking at their keys. The field run ends at the first line shallower
//! than the parameter depth: under `- file:` the arguments are the fields and the
//! task keywords that follow at the item's column are not.

use crate::structure::block::Extent;
use crate::structure::indentation::{classify, depth_of, inline_value, key_of, LineClass};

/// A field of a block: its line index and key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub index: usize,
    pub key: &'a str,
}

/// Depth of the block's direct children, or `None` when no interior line opens
/// a key or a list item.
pub fn param_depth<S: AsRef<str>>(lines: &[S], extent: Extent) -> Option<usize> {
    extent
        .interior()
        .map(|idx| lines[idx].as_ref())
        .find(|line| matches!(classify(line), LineClass::Parameter | LineClass::ListItemStart))
        .map(depth_of)
}

/// Fields of the block in document order.
pub fn fields<S: AsRef<str>>(lines: &[S], extent: Extent) -> Vec<Field<'_>> {
    let Some(depth) = param_depth(lines, extent) else {
        return Vec::new();
    };

    extent
        .interior()
        .take_while(|&idx| {
            let line = lines[idx].as_ref();
            matches!(classify(line), LineClass::Blank | LineClass::Comment) || depth_of(line) >= depth
        })
        .filter_map(|idx| {
            let line = lines[idx].as_ref();
            if classify(line) != LineClass::Parameter || depth_of(line) != depth {
                return None;
            }
            key_of(line).map(|key| Field { index: idx, key })
        })
        .collect()
}

/// Whether the block has a field named `name`. Keys are compared verbatim.
pub fn has_field<S: AsRef<str>>(lines: &[S], extent: Extent, name: &str) -> bool {
    fields(lines, extent).iter().any(|field| field.key == name)
}

/// Inline value of a field, e.g. `directory` for `state: directory`.
pub fn field_value<'a, S: AsRef<str>>(lines: &'a [S], extent: Extent, name: &str) -> Option<&'a str> {
    fields(lines, extent)
        .into_iter()
        .find(|field| field.key == name)
        .and_then(|field| inline_value(lines[field.index].as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::block::extent_of;

    const TASK: &[&str] = &[
        "- name: Render config",      // 0
        "  ansible.builtin.template:", // 1
        "    src: app.j2",            // 2
        "    dest: /etc/app.conf",    // 3
        "    owner:",                 // 4
        "      mode: nested-not-mine", // 5
        "  notify: restart app",      // 6
    ];

    #[test]
    fn test_fields_at_param_depth_only() {
        let extent = extent_of(TASK, 1).unwrap();
        let keys: Vec<_> = fields(TASK, extent).iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["src", "dest", "owner"]);
    }

    #[test]
    fn test_nested_key_is_not_a_field() {
        let extent = extent_of(TASK, 1).unwrap();
        assert!(!has_field(TASK, extent, "mode"));
        assert!(has_field(TASK, extent, "dest"));
    }

    #[test]
    fn test_parent_block_fields() {
        let extent = extent_of(TASK, 0).unwrap();
        assert!(has_field(TASK, extent, "ansible.builtin.template"));
        assert!(has_field(TASK, extent, "notify"));
        assert!(!has_field(TASK, extent, "src"));
    }

    #[test]
    fn test_field_match_is_case_sensitive() {
        let extent = extent_of(TASK, 1).unwrap();
        assert!(!has_field(TASK, extent, "Dest"));
    }

    #[test]
    fn test_dash_line_arguments_end_at_task_keywords() {
        let lines = [
            "- file:",                     // 0
            "      path: /srv/x",          // 1
            "  name: Data",                // 2
            "  loop:",                     // 3
            "    - template: a.j2",        // 4
            "      dest: /etc/a",          // 5
        ];
        let extent = extent_of(&lines, 0).unwrap();
        let keys: Vec<_> = fields(&lines, extent).iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["path"]);
        assert!(!has_field(&lines, extent, "dest"));
    }

    #[test]
    fn test_folded_continuation_does_not_set_depth() {
        let lines = ["- name: install a,", "    b, c", "  command: ls", "  register: out"];
        let extent = extent_of(&lines, 0).unwrap();
        assert_eq!(param_depth(&lines, extent), Some(2));
        assert!(has_field(&lines, extent, "register"));
    }

    #[test]
    fn test_param_depth_is_measured_not_assumed() {
        let lines = ["- name: wide", "    file:", "        path: /x", "        mode: '0644'"];
        let extent = extent_of(&lines, 1).unwrap();
        assert_eq!(param_depth(&lines, extent), Some(8));
        assert!(has_field(&lines, extent, "mode"));
    }

    #[test]
    fn test_comments_are_opaque() {
        let lines = ["- file:", "    # mode: '0644'", "    path: /x"];
        let extent = extent_of(&lines, 0).unwrap();
        assert_eq!(param_depth(&lines, extent), Some(4));
        assert!(!has_field(&lines, extent, "mode"));
    }

    #[test]
    fn test_empty_interior_has_no_fields() {
        let lines = ["- name: a", "- name: b"];
        let extent = extent_of(&lines, 0).unwrap();
        assert!(fields(&lines, extent).is_empty());
        assert!(!has_field(&lines, extent, "name"));
    }

    #[test]
    fn test_field_value() {
        let extent = extent_of(TASK, 1).unwrap();
        assert_eq!(field_value(TASK, extent, "dest"), Some("/etc/app.conf"));
        assert_eq!(field_value(TASK, extent, "owner"), None);
        assert_eq!(field_value(TASK, extent, "group"), None);
    }
}
