//! Persisting the pin set to the manifest.

use crate::error::ImpError;
use crate::manifest::Manifest;
use crate::pin::{list, ListOptions};
use crate::workspace::{Project, Workspace};
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

/// Options for [`write`]. Both default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub recursive: bool,
    pub hash: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            hash: true,
        }
    }
}

impl From<WriteOptions> for ListOptions {
    fn from(options: WriteOptions) -> Self {
        ListOptions::new(options.recursive, options.hash)
    }
}

/// Compute the pin set and overwrite the project's manifest with it.
///
/// The manifest is only touched once the pin set is known, so a failing
/// scan leaves the previous file intact.
pub fn write(workspace: &Workspace, project: &Project, options: WriteOptions) -> Result<Manifest, ImpError> {
    let manifest = list(workspace, project, options.into())?;

    let path = project.manifest_path();
    let file = File::create(&path)?;
    manifest.write_to(BufWriter::new(file))?;
    info!("wrote {} imports to {}", manifest.len(), path.display());
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn writes_unhashed_entries() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let dir = ws.package_dir("me/proj");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.go"), "package main\nimport \"a.com/x\"\n").unwrap();

        let project = Project::new(&dir, Settings::default());
        let options = WriteOptions {
            recursive: false,
            hash: false,
        };
        let written = write(&ws, &project, options).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(fs::read_to_string(dir.join("Godeps")).unwrap(), "a.com/x\t\n");
    }

    #[test]
    fn failing_scan_keeps_previous_manifest() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let dir = ws.package_dir("me/proj");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Godeps"), "a.com/x\tabc\n").unwrap();

        let project = Project::new(&dir, Settings::default());
        assert!(write(&ws, &project, WriteOptions::default()).is_err());
        assert_eq!(fs::read_to_string(dir.join("Godeps")).unwrap(), "a.com/x\tabc\n");
    }

    #[test]
    fn custom_manifest_name() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let dir = ws.package_dir("me/proj");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.go"), "package main\nimport \"fmt\"\n").unwrap();

        let settings = Settings::default().with_manifest(Some("deps.lock".to_string()));
        let project = Project::new(&dir, settings);
        write(&ws, &project, WriteOptions::default()).unwrap();
        assert_eq!(fs::read_to_string(dir.join("deps.lock")).unwrap(), "");
    }
}
