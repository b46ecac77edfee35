//! Input discovery: expands directory arguments into the documents to fix.

use blockfix_config::DiscoveryConfig;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Every file named by `paths`, sorted and deduplicated.
///
/// Directories are walked, skipping excluded directory names and keeping only
/// the configured extensions. File arguments are taken as they are, whatever
/// their extension, so a missing file surfaces later as a read error.
pub fn discover(paths: &[PathBuf], config: &DiscoveryConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(walk(path, config));
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    files
}

fn walk(root: &Path, config: &DiscoveryConfig) -> Vec<PathBuf> {
    let exclude = config.exclude_dirs.clone();
    let gitignore = config.respect_gitignore;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(gitignore)
        .git_global(gitignore)
        .git_exclude(gitignore)
        .parents(gitignore)
        .ignore(false)
        .require_git(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
            // The root itself is always walked, even when its name is excluded.
            entry.depth() == 0
                || !is_dir
                || !exclude.iter().any(|name| entry.file_name() == name.as_str())
        });

    let mut files = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                if !entry.file_type().map_or(false, |ft| ft.is_file()) {
                    continue;
                }
                if has_extension(entry.path(), &config.extensions) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => tracing::warn!("skipping unreadable entry: {err}"),
        }
    }
    files
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| extensions.iter().any(|wanted| wanted == ext))
}
