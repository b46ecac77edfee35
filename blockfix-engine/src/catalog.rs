//! Built-in rule sets
//!
//! Every rule set the tool ships with is a compiled-in table. Configuration can
//! choose which sets run and tune their policy data through [`RuleOptions`], but
//! never define new matchers.
//!
//! File Layout
//!
//!     catalog
//!     ├── style.rs       formatting, truthy, comma-spacing, name-casing, line-length
//!     ├── modules.rs     fqcn, service-names, molecule
//!     └── tasks.rs       file-permissions, changed-when, pipefail, ignore-errors

pub mod modules;
pub mod style;
pub mod tasks;

use crate::error::RegistryError;
use crate::rules::{PathScope, RuleSet};
use std::collections::HashMap;

/// Task content proper: role task, handler and playbook directories, never the
/// molecule test scenarios.
pub const CONTENT_SCOPE: PathScope = PathScope::Within {
    include: &["tasks", "handlers", "playbooks"],
    exclude: &["molecule"],
};

/// Tunable policy data for the built-in rule sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOptions {
    /// Reflow limit, in characters.
    pub max_width: usize,
    /// Mode injected for plain files, rendered verbatim.
    pub file_mode: String,
    /// Mode injected for directories and executables.
    pub directory_mode: String,
}

impl Default for RuleOptions {
    fn default() -> Self {
        RuleOptions {
            max_width: crate::rules::reflow::DEFAULT_MAX_WIDTH,
            file_mode: "'0644'".to_string(),
            directory_mode: "'0755'".to_string(),
        }
    }
}

/// Registry of rule sets
pub struct RuleRegistry {
    sets: HashMap<String, RuleSet>,
    /// Names in registration order.
    order: Vec<String>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        RuleRegistry {
            sets: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a rule set, replacing any set of the same name.
    pub fn register(&mut self, set: RuleSet) {
        let name = set.name().to_string();
        if self.sets.insert(name.clone(), set).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.sets.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    /// List all rule sets (sorted by name)
    pub fn list_all(&self) -> Vec<&RuleSet> {
        let mut sets: Vec<_> = self.sets.values().collect();
        sets.sort_by(|a, b| a.name().cmp(b.name()));
        sets
    }

    /// Look up sets by name, keeping the caller's order.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&RuleSet>, RegistryError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name)
                    .ok_or_else(|| RegistryError::UnknownRuleSet(name.to_string()))
            })
            .collect()
    }

    /// Names of the sets that run when nothing is selected, in run order.
    pub fn default_enabled(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(String::as_str)
            .filter(|name| *name != modules::MOLECULE)
            .collect()
    }

    pub fn with_defaults() -> Self {
        Self::with_options(&RuleOptions::default())
    }

    /// Registry holding every built-in set, tuned by `options`.
    pub fn with_options(options: &RuleOptions) -> Self {
        let mut registry = Self::new();

        registry.register(style::formatting());
        registry.register(style::truthy());
        registry.register(style::comma_spacing());
        registry.register(style::name_casing());
        registry.register(modules::fqcn());
        registry.register(modules::service_names());
        registry.register(style::line_length(options.max_width));
        registry.register(tasks::file_permissions(options));
        registry.register(tasks::changed_when());
        registry.register(tasks::pipefail());
        registry.register(tasks::ignore_errors());
        registry.register(modules::molecule());

        registry
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
