//! Computing the pin set of a project.

use crate::error::ImpError;
use crate::imports::ImportScanner;
use crate::manifest::{Manifest, PinnedImport};
use crate::vcs::Vcs;
use crate::workspace::{Project, Workspace, RECURSIVE_SUFFIX};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Options for [`list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Follow imports of imports.
    pub recursive: bool,
    /// Query each import's revision and collapse repositories.
    pub hash: bool,
}

impl ListOptions {
    pub fn new(recursive: bool, hash: bool) -> Self {
        Self { recursive, hash }
    }
}

/// The pinned imports of `project`, sorted by path.
///
/// Imports belonging to the project itself are dropped. With
/// [`ListOptions::hash`] every import is resolved to the revision checked
/// out in the workspace; imports whose directory is not under version
/// control or whose revision cannot be read are left out, and two or more
/// imports from the same repository become a single `<repo>/...` entry.
pub fn list(workspace: &Workspace, project: &Project, options: ListOptions) -> Result<Manifest, ImpError> {
    let scanner = ImportScanner::new(workspace);
    let mut imports = scanner
        .project_imports(project.dir(), options.recursive)?
        .export();
    imports.sort();

    match workspace.import_path(project.dir()) {
        Some(own) => imports.retain(|import| !belongs_to(import, &own)),
        None => warn!(
            "{} is outside {}, keeping every import",
            project.dir().display(),
            workspace.source_root().display()
        ),
    }

    let mut pinned: Vec<PinnedImport> = if options.hash {
        with_hashes(workspace, imports)
    } else {
        imports.into_iter().map(PinnedImport::unpinned).collect()
    };
    pinned.sort();
    Ok(Manifest::new(pinned))
}

/// True when `import` is the project, lies beneath it or contains it.
fn belongs_to(import: &str, project: &str) -> bool {
    let under = |inner: &str, outer: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    };
    under(import, project) || under(project, import)
}

struct Group {
    root: PathBuf,
    members: Vec<PinnedImport>,
}

fn with_hashes(workspace: &Workspace, imports: Vec<String>) -> Vec<PinnedImport> {
    let mut groups: Vec<Group> = Vec::new();
    let mut by_root: HashMap<PathBuf, usize> = HashMap::new();

    for import in imports {
        let dir = workspace.package_dir(&import);
        let vcs = match Vcs::for_dir(workspace, &dir) {
            Ok(vcs) => vcs,
            Err(err) => {
                debug!("skipping {import}: {err}");
                continue;
            }
        };
        let hash = match vcs.commit_hash() {
            Ok(hash) => hash,
            Err(err) => {
                warn!("cannot read revision of {import}: {err}");
                continue;
            }
        };

        let index = *by_root.entry(vcs.root().to_path_buf()).or_insert_with(|| {
            groups.push(Group {
                root: vcs.root().to_path_buf(),
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].members.push(PinnedImport::new(import, hash));
    }

    let mut pinned = Vec::new();
    for group in groups {
        if group.members.len() < 2 {
            pinned.extend(group.members);
            continue;
        }
        match workspace.import_path(&group.root) {
            Some(root_import) => {
                let hash = group.members[0].hash.clone();
                pinned.push(PinnedImport::new(format!("{root_import}{RECURSIVE_SUFFIX}"), hash));
            }
            None => pinned.extend(group.members),
        }
    }
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_pkg(src: &Path, import_path: &str, imports: &[&str]) {
        let dir = src.join(import_path);
        fs::create_dir_all(&dir).unwrap();
        let mut body = String::from("package p\n");
        for import in imports {
            body.push_str(&format!("import \"{import}\"\n"));
        }
        fs::write(dir.join("p.go"), body).unwrap();
    }

    fn paths(manifest: &Manifest) -> Vec<&str> {
        manifest.iter().map(|i| i.package.as_str()).collect()
    }

    #[test]
    fn project_ownership() {
        assert!(belongs_to("me/proj", "me/proj"));
        assert!(belongs_to("me/proj/sub", "me/proj"));
        assert!(belongs_to("me", "me/proj"));
        assert!(!belongs_to("me/project", "me/proj"));
        assert!(!belongs_to("me/pro", "me/proj"));
        assert!(!belongs_to("other/proj", "me/proj"));
    }

    #[test]
    fn list_is_sorted_and_purged() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let src = ws.source_root();
        write_pkg(
            src,
            "me/proj",
            &["z.com/last", "me/proj/internal", "a.com/first", "fmt", "me"],
        );
        write_pkg(src, "me/proj/internal", &["m.com/middle"]);

        let project = Project::new(src.join("me/proj"), Settings::default());
        let manifest = list(&ws, &project, ListOptions::new(true, false)).unwrap();
        assert_eq!(paths(&manifest), vec!["a.com/first", "m.com/middle", "z.com/last"]);
        assert!(manifest.iter().all(|i| i.hash.is_empty()));
    }

    #[test]
    fn non_recursive_list() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let src = ws.source_root();
        write_pkg(src, "me/proj", &["a.com/x"]);
        write_pkg(src, "a.com/x", &["b.com/y"]);

        let project = Project::new(src.join("me/proj"), Settings::default());
        let manifest = list(&ws, &project, ListOptions::default()).unwrap();
        assert_eq!(paths(&manifest), vec!["a.com/x"]);
    }

    #[test]
    fn project_outside_source_root_purges_nothing() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path().join("go"));
        let outside = tmp.path().join("elsewhere");
        write_pkg(&outside, "proj", &["proj", "a.com/x"]);

        let project = Project::new(outside.join("proj"), Settings::default());
        let manifest = list(&ws, &project, ListOptions::default()).unwrap();
        assert_eq!(paths(&manifest), vec!["a.com/x", "proj"]);
    }

    #[cfg(unix)]
    #[test]
    fn purge_through_symlinked_workspace() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        let src = real.join("src");
        write_pkg(&src, "me/proj", &["me/proj/internal", "a.com/x"]);
        write_pkg(&src, "me/proj/internal", &["b.com/y"]);
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let ws = Workspace::new(&link);
        let project = Project::new(src.join("me/proj"), Settings::default());
        let manifest = list(&ws, &project, ListOptions::new(true, false)).unwrap();
        assert_eq!(paths(&manifest), vec!["a.com/x", "b.com/y"]);
    }

    #[test]
    fn hashed_list_skips_unversioned_imports() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let src = ws.source_root();
        write_pkg(src, "me/proj", &["a.com/x"]);
        write_pkg(src, "a.com/x", &[]);

        let project = Project::new(src.join("me/proj"), Settings::default());
        let manifest = list(&ws, &project, ListOptions::new(true, true)).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn empty_project_fails() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let dir = ws.package_dir("me/proj");
        fs::create_dir_all(&dir).unwrap();

        let project = Project::new(dir, Settings::default());
        let err = list(&ws, &project, ListOptions::default()).unwrap_err();
        assert!(matches!(err, ImpError::NotABuildablePackage(_)));
    }
}
