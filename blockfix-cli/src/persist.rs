//! Write-back of fixed documents.
//!
//! The original is never left half-written. With a backup the original is
//! renamed aside first and restored if the new text cannot be written; without
//! one the new text goes to a temporary file in the same directory that is then
//! persisted over the original. Either way the rewritten file keeps the
//! original's permissions.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// How a rewritten file is put in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Replace,
    Backup { suffix: String },
}

/// `<file name><suffix>` next to `path`.
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Replace the contents of `path` with `contents` according to `mode`.
pub fn write_back(path: &Path, contents: &str, mode: &WriteMode) -> io::Result<()> {
    match mode {
        WriteMode::Replace => replace(path, contents),
        WriteMode::Backup { suffix } => {
            let backup = backup_path(path, suffix);
            fs::rename(path, &backup)?;
            let written = fs::metadata(&backup).and_then(|original| {
                fs::write(path, contents)?;
                fs::set_permissions(path, original.permissions())
            });
            if let Err(err) = written {
                // Put the untouched original back; the write error is what gets reported.
                if let Err(restore) = fs::rename(&backup, path) {
                    tracing::error!(
                        "could not restore {} from {}: {restore}",
                        path.display(),
                        backup.display()
                    );
                }
                return Err(err);
            }
            Ok(())
        }
    }
}

fn replace(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
