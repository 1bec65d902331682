//! Implementation of the `goimp list` command.

use anyhow::{Context, Result};
use goimp_pkg::{Manifest, Project, Workspace};
use std::path::PathBuf;

/// Options for the list command.
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Package directory.
    pub dir: PathBuf,
    /// Follow imports transitively.
    pub recursive: bool,
    /// Resolve revisions.
    pub hash: bool,
}

/// Compute the pin set of the package in `options.dir`.
pub fn collect(workspace: &Workspace, options: &ListOptions) -> Result<Manifest> {
    let project = Project::open(&options.dir, None)
        .with_context(|| format!("failed to load settings from {}", options.dir.display()))?;
    goimp_pkg::list(
        workspace,
        &project,
        goimp_pkg::ListOptions::new(options.recursive, options.hash),
    )
    .with_context(|| format!("failed to list imports of {}", project.dir().display()))
}

/// Print the pin set as an aligned table on stdout.
pub fn list_imports(workspace: &Workspace, options: &ListOptions) -> Result<()> {
    let manifest = collect(workspace, options)?;
    print!("{}", manifest.render_table());
    Ok(())
}
