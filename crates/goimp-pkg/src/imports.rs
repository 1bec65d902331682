//! Import discovery across the transitive closure of a package.

use crate::error::ImpError;
use crate::source::parse_dir;
use crate::workspace::Workspace;
use goimp_core::{GoFile, Set};
use std::path::Path;
use tracing::{debug, warn};

/// Walks imports starting at a directory, following every non-standard
/// import into `<workspace>/src`.
#[derive(Debug, Clone, Copy)]
pub struct ImportScanner<'a> {
    workspace: &'a Workspace,
}

impl<'a> ImportScanner<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Non-standard imports of the package in `dir`, following them
    /// transitively when `recursive` is set. Imports already in `seen` are
    /// not expanded again.
    ///
    /// A directory without Go files contributes nothing.
    pub fn package_imports(&self, dir: &Path, recursive: bool, seen: &Set) -> Result<Set, ImpError> {
        let files = match parse_dir(dir) {
            Ok(files) => files,
            Err(ImpError::NotABuildablePackage(path)) => {
                debug!("{}: no buildable Go files, skipping", path.display());
                return Ok(Set::new());
            }
            Err(err) => return Err(err),
        };
        self.collect(&files, recursive, seen)
    }

    /// Like [`Self::package_imports`], but the starting directory itself
    /// must be a buildable package.
    pub fn project_imports(&self, dir: &Path, recursive: bool) -> Result<Set, ImpError> {
        let files = parse_dir(dir)?;
        self.collect(&files, recursive, &Set::new())
    }

    fn collect(&self, files: &[GoFile], recursive: bool, seen: &Set) -> Result<Set, ImpError> {
        let stdlib = self.workspace.stdlib();
        let mut imports: Set = files
            .iter()
            .flat_map(GoFile::import_paths)
            .filter(|path| !stdlib.is_std_lib(path))
            .collect();

        if !recursive {
            return Ok(imports);
        }

        for import in imports.export() {
            if seen.contains(&import) {
                continue;
            }
            let mut carry = imports.clone();
            carry.extend(seen.iter());

            let dir = self.workspace.package_dir(&import);
            match self.package_imports(&dir, recursive, &carry) {
                Ok(found) => {
                    imports.extend(found);
                }
                Err(err) if err.is_not_found() => {
                    warn!("'{import}' not found in {}", self.workspace.source_root().display());
                }
                Err(err) => return Err(err),
            }
        }

        Ok(imports)
    }
}
