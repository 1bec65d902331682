//! Implementation of the `goimp write` command.

use anyhow::{Context, Result};
use goimp_pkg::{Manifest, Project, Workspace};
use std::path::PathBuf;

/// Options for the write command.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Package directory.
    pub dir: PathBuf,
    /// Manifest name overriding `goimp.toml`.
    pub file: Option<String>,
    pub recursive: bool,
    pub hash: bool,
}

/// Overwrite the package manifest with its current pin set.
pub fn write_manifest(workspace: &Workspace, options: WriteOptions) -> Result<Manifest> {
    let project = Project::open(&options.dir, options.file)
        .with_context(|| format!("failed to load settings from {}", options.dir.display()))?;
    let pin = goimp_pkg::WriteOptions {
        recursive: options.recursive,
        hash: options.hash,
    };
    goimp_pkg::write(workspace, &project, pin)
        .with_context(|| format!("failed to write {}", project.manifest_path().display()))
}
