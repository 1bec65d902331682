//! Error kinds shared by every goimp engine.

use goimp_core::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering, pinning or restoring imports.
#[derive(Error, Debug)]
pub enum ImpError {
    #[error("{var} must be set")]
    WorkspaceUnset { var: &'static str },

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("{}: no buildable Go files", .0.display())]
    NotABuildablePackage(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("directory {} is outside source root {}", .dir.display(), .root.display())]
    OutsideSourceRoot { dir: PathBuf, root: PathBuf },

    #[error("directory {} is not using a known version control system", .0.display())]
    VcsUnknown(PathBuf),

    #[error("{command} failed: {stderr}")]
    VcsFailure { command: String, stderr: String },

    #[error("{vcs} does not support {operation} yet")]
    Unsupported {
        vcs: &'static str,
        operation: &'static str,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ImpError {
    /// True for the "package not found on disk" kind
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
