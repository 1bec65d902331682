//! Implementation of the `goimp bind` command.

use anyhow::{Context, Result};
use goimp_pkg::{Binder, Project, ProjectSides, Workspace};
use std::path::PathBuf;
use tracing::info;

/// Options for the bind command.
#[derive(Debug, Clone)]
pub struct BindOptions {
    /// Package directory.
    pub dir: PathBuf,
    /// Manifest name overriding `goimp.toml`.
    pub file: Option<String>,
}

/// Watch the manifest and the workspace until the process is killed.
pub fn bind(workspace: &Workspace, options: BindOptions) -> Result<()> {
    let project = Project::open(&options.dir, options.file)
        .with_context(|| format!("failed to load settings from {}", options.dir.display()))?;
    let interval = project.settings().bind_interval();

    info!(
        "binding {} to {}",
        project.manifest_path().display(),
        workspace.source_root().display()
    );
    Binder::new(ProjectSides::new(workspace, &project)).run(interval)
}
