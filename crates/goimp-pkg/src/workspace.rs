//! The workspace context and the project inside it.
//!
//! A workspace is the first entry of `GOPATH`; every package lives at
//! `<workspace>/src/<import-path>`:
//!
//! ```text
//! $GOPATH/
//! └── src/
//!     ├── github.com/me/project/   # the project, holds Godeps
//!     └── github.com/dep/repo/     # a dependency checkout (.git, .hg, .bzr)
//! ```

use crate::config::Settings;
use crate::error::ImpError;
use crate::vcs::{VcsCommand, VCS_LIST};
use goimp_core::StdLib;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Environment variable holding the workspace roots.
pub const WORKSPACE_ENV: &str = "GOPATH";

/// Source directory under a workspace root.
pub const SOURCE_DIR: &str = "src";

/// Suffix denoting a repository root and everything beneath it.
pub const RECURSIVE_SUFFIX: &str = "/...";

/// Everything the engines need to know about the workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    source_root: PathBuf,
    stdlib: StdLib,
    vcs: Vec<VcsCommand>,
}

impl Workspace {
    /// A workspace rooted at `root`, with sources under `root/src`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            source_root: clean_path(&absolute(root.as_ref()).join(SOURCE_DIR)),
            stdlib: StdLib::new(),
            vcs: VCS_LIST.to_vec(),
        }
    }

    /// Read the workspace from `GOPATH`.
    pub fn from_env() -> Result<Self, ImpError> {
        let value = std::env::var_os(WORKSPACE_ENV).unwrap_or_default();
        Self::from_gopath(&value)
    }

    /// Build the workspace from a `GOPATH`-style list. Only the first
    /// entry is used; an empty first entry counts as unset.
    pub fn from_gopath(value: &OsStr) -> Result<Self, ImpError> {
        std::env::split_paths(value)
            .next()
            .filter(|first| !first.as_os_str().is_empty())
            .map(Self::new)
            .ok_or(ImpError::WorkspaceUnset { var: WORKSPACE_ENV })
    }

    /// `<workspace>/src`
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn stdlib(&self) -> &StdLib {
        &self.stdlib
    }

    pub fn vcs(&self) -> &[VcsCommand] {
        &self.vcs
    }

    /// On-disk location of an import path. A trailing `/...` is dropped.
    pub fn package_dir(&self, import_path: &str) -> PathBuf {
        let path = import_path
            .strip_suffix(RECURSIVE_SUFFIX)
            .unwrap_or(import_path);
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.source_root.clone(), |dir, segment| dir.join(segment))
    }

    /// Import path of a directory, or `None` when it is not strictly
    /// inside the source root.
    ///
    /// Paths are compared as spelled first; when that fails and both exist
    /// they are compared again with symlinks resolved.
    pub fn import_path(&self, dir: &Path) -> Option<String> {
        let dir = clean_path(&absolute(dir));
        if let Some(path) = relative_import(&dir, &self.source_root) {
            return Some(path);
        }
        let dir = dir.canonicalize().ok()?;
        let root = self.source_root.canonicalize().ok()?;
        relative_import(&dir, &root)
    }
}

fn relative_import(dir: &Path, root: &Path) -> Option<String> {
    let segments: Vec<_> = dir
        .strip_prefix(root)
        .ok()?
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// A project directory and its settings.
#[derive(Debug, Clone)]
pub struct Project {
    dir: PathBuf,
    settings: Settings,
}

impl Project {
    pub fn new(dir: impl AsRef<Path>, settings: Settings) -> Self {
        Self {
            dir: clean_path(&absolute(dir.as_ref())),
            settings,
        }
    }

    /// Load `goimp.toml` from `dir`, letting `manifest` override its name.
    pub fn open(dir: impl AsRef<Path>, manifest: Option<String>) -> Result<Self, ImpError> {
        let settings = Settings::load(dir.as_ref())?.with_manifest(manifest);
        Ok(Self::new(dir, settings))
    }

    /// Absolute, cleaned project directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `<project>/<manifest-name>`
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(&self.settings.manifest)
    }
}

/// Resolve `path` against the current directory without touching symlinks.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component.
pub(crate) fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let after_parent = matches!(out.components().next_back(), Some(Component::ParentDir));
                if after_parent || (!out.pop() && !out.has_root()) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
