//! Shared configuration loader for the blockfix toolchain.
//!
//! `defaults/blockfix.default.toml` is embedded into the binary so that the
//! documented defaults and runtime behavior stay in sync. Applications layer
//! repository and user files on top of those defaults via [`Loader`] before
//! deserializing into [`BlockfixConfig`].

use blockfix_engine::RuleOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/blockfix.default.toml");

/// Repository-level configuration file picked up from the working directory.
pub const REPO_CONFIG_FILE: &str = ".blockfix.toml";

/// Top-level configuration consumed by blockfix applications.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockfixConfig {
    pub discovery: DiscoveryConfig,
    pub write: WriteConfig,
    pub rules: RulesConfig,
    pub batch: BatchConfig,
}

/// Which files a directory walk picks up.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub respect_gitignore: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteConfig {
    pub backup: bool,
    pub backup_suffix: String,
}

/// Rule set selection and the policy data the built-in sets read.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    pub enabled: Vec<String>,
    pub line_length: LineLengthConfig,
    pub permissions: PermissionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineLengthConfig {
    pub max_width: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionsConfig {
    pub file_mode: String,
    pub directory_mode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Worker threads; 0 means one per core.
    pub jobs: usize,
}

impl RulesConfig {
    /// Engine options built from the configured policy data.
    pub fn options(&self) -> RuleOptions {
        RuleOptions {
            max_width: self.line_length.max_width,
            file_mode: self.permissions.file_mode.clone(),
            directory_mode: self.permissions.directory_mode.clone(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<BlockfixConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<BlockfixConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfix_engine::RuleRegistry;
    use std::fs;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.discovery.extensions, vec!["yml", "yaml"]);
        assert!(config.discovery.exclude_dirs.iter().any(|d| d == ".git"));
        assert!(!config.discovery.respect_gitignore);
        assert!(!config.write.backup);
        assert_eq!(config.write.backup_suffix, ".bak");
        assert_eq!(config.batch.jobs, 0);
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.rules.options(), RuleOptions::default());

        let registry = RuleRegistry::with_defaults();
        assert_eq!(config.rules.enabled, registry.default_enabled());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("rules.line_length.max_width", 100i64)
            .expect("override to apply")
            .set_override("write.backup", true)
            .expect("override to apply")
            .set_override("rules.enabled", vec!["truthy".to_string()])
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.rules.line_length.max_width, 100);
        assert!(config.write.backup);
        assert_eq!(config.rules.enabled, vec!["truthy"]);
    }

    #[test]
    fn layers_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockfix.toml");
        fs::write(
            &path,
            "[rules.permissions]\nfile_mode = \"'0600'\"\n\n[write]\nbackup_suffix = \".orig\"\n",
        )
        .unwrap();

        let config = Loader::new().with_file(&path).build().expect("config to build");
        assert_eq!(config.rules.permissions.file_mode, "'0600'");
        assert_eq!(config.rules.permissions.directory_mode, "'0755'");
        assert_eq!(config.write.backup_suffix, ".orig");
        assert!(!config.write.backup);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = Loader::new()
            .with_optional_file(dir.path().join(REPO_CONFIG_FILE))
            .build()
            .expect("config to build");
        assert_eq!(config.rules.line_length.max_width, 160);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Loader::new().with_file(dir.path().join("nope.toml")).build();
        assert!(result.is_err());
    }
}
