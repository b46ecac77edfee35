//! Error types for the command-line driver.
//!
//! Per-file failures are [`FileError`]s: they are recorded in the file's
//! outcome and never stop the batch. [`CliError`] covers everything that
//! prevents a run from starting.

use blockfix_config::ConfigError;
use blockfix_engine::{EncodingError, PassError, RegistryError};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse class of a per-file failure, as shown in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Read,
    Encoding,
    Structural,
    Write,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Read => "read",
            ErrorKind::Encoding => "encoding",
            ErrorKind::Structural => "structural",
            ErrorKind::Write => "write",
        }
    }
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: EncodingError,
    },

    #[error("{}: {source}", path.display())]
    Pass {
        path: PathBuf,
        #[source]
        source: PassError,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileError::Read { .. } => ErrorKind::Read,
            FileError::Encoding { .. } => ErrorKind::Encoding,
            FileError::Pass { .. } => ErrorKind::Structural,
            FileError::Write { .. } => ErrorKind::Write,
        }
    }
}

/// Failures that abort the run before any file is touched.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rules(#[from] RegistryError),

    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid value for --{flag}: {value}")]
    InvalidFlag { flag: &'static str, value: String },
}
