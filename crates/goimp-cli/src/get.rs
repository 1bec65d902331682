//! Implementation of the `goimp get` command.

use anyhow::{Context, Result};
use goimp_pkg::{FetchReport, PinnedImport, Project, Workspace};
use std::path::PathBuf;
use tracing::{info, warn};

/// Options for the get command.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Package directory.
    pub dir: PathBuf,
    /// Manifest name overriding `goimp.toml`.
    pub file: Option<String>,
    /// Move every import to its latest revision.
    pub reset: bool,
    /// Fetch only this import instead of the manifest entries.
    pub import: Option<String>,
    /// Revision for `import`.
    pub rev: Option<String>,
}

/// Restore the workspace. Individual failures are logged but do not fail
/// the command.
pub fn get_imports(workspace: &Workspace, options: GetOptions) -> Result<FetchReport> {
    let project = Project::open(&options.dir, options.file)
        .with_context(|| format!("failed to load settings from {}", options.dir.display()))?;

    let report = match options.import {
        Some(import) => {
            let entry = PinnedImport::new(import, options.rev.unwrap_or_default());
            goimp_pkg::fetch(workspace, project.settings(), vec![entry], options.reset)
        }
        None => goimp_pkg::get(workspace, &project, options.reset).with_context(|| {
            format!("failed to read {}", project.manifest_path().display())
        })?,
    };

    for entry in report.failures() {
        warn!("{}: {}", entry.import.package, entry.outcome);
    }
    info!("{report}");
    Ok(report)
}
