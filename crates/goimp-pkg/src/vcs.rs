//! Version control drivers.
//!
//! A driver is found by walking from a package directory up towards the
//! workspace source root until a `.git`, `.hg` or `.bzr` directory shows
//! up. Every operation shells out to the VCS executable with the
//! repository root as working directory.

use crate::error::ImpError;
use crate::workspace::{absolute, clean_path, Workspace};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// How to drive one version control system.
///
/// Specs are whitespace-separated argument lists passed to `cmd`; `None`
/// marks an operation the VCS does not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcsCommand {
    /// Human readable name.
    pub name: &'static str,
    /// Executable, also the control directory name without the dot.
    pub cmd: &'static str,
    /// Prints the current revision.
    pub commit: &'static str,
    /// Switches the working tree; the revision is appended.
    pub checkout: Option<&'static str>,
    /// Downloads remote history without touching the working tree.
    pub fetch: Option<&'static str>,
    /// Advances the working tree to the remote tip.
    pub pull: Option<&'static str>,
}

/// The built-in VCS table, in detection order.
pub const VCS_LIST: &[VcsCommand] = &[
    VcsCommand {
        name: "Git",
        cmd: "git",
        commit: "rev-parse HEAD",
        checkout: Some("checkout"),
        fetch: Some("fetch"),
        pull: Some("pull"),
    },
    VcsCommand {
        name: "Mercurial",
        cmd: "hg",
        commit: "id -i",
        checkout: Some("update"),
        fetch: Some("pull"),
        pull: Some("pull -u"),
    },
    VcsCommand {
        name: "Bazaar",
        cmd: "bzr",
        commit: "revno",
        checkout: Some("revert -r"),
        fetch: Some("pull --overwrite"),
        pull: None,
    },
];

/// Branch git checks out before pulling when none is configured.
const DEFAULT_BRANCH: &str = "master";

/// A VCS bound to a repository root.
#[derive(Debug, Clone)]
pub struct Vcs {
    root: PathBuf,
    command: VcsCommand,
    default_branch: String,
}

impl Vcs {
    /// Find the VCS governing `dir`, which must lie strictly inside
    /// `source_root`.
    pub fn detect(dir: &Path, source_root: &Path, table: &[VcsCommand]) -> Result<Self, ImpError> {
        let dir = clean_path(&absolute(dir));
        let source_root = clean_path(&absolute(source_root));
        if dir == source_root || !dir.starts_with(&source_root) {
            return Err(ImpError::OutsideSourceRoot {
                dir,
                root: source_root,
            });
        }

        let mut current = dir.as_path();
        while current != source_root {
            for command in table {
                if current.join(format!(".{}", command.cmd)).is_dir() {
                    return Ok(Self {
                        root: current.to_path_buf(),
                        command: *command,
                        default_branch: DEFAULT_BRANCH.to_string(),
                    });
                }
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(ImpError::VcsUnknown(dir))
    }

    /// Find the VCS governing `dir` using the workspace's table.
    pub fn for_dir(workspace: &Workspace, dir: &Path) -> Result<Self, ImpError> {
        Self::detect(dir, workspace.source_root(), workspace.vcs())
    }

    /// Set the branch `latest` returns to before pulling.
    #[must_use]
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// Repository root, the directory holding the control directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &'static str {
        self.command.name
    }

    /// The revision currently checked out.
    pub fn commit_hash(&self) -> Result<String, ImpError> {
        let output = self.run_output(self.command.commit, &[])?;
        Ok(output.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Move the working tree to `rev`. Returns false when it was already
    /// there and nothing ran.
    pub fn checkout(&self, rev: &str) -> Result<bool, ImpError> {
        let spec = self.spec(self.command.checkout, "checkout")?;
        if self.commit_hash()? == rev {
            return Ok(false);
        }
        self.run(spec, &[rev])?;
        Ok(true)
    }

    /// Download remote history.
    pub fn fetch(&self) -> Result<(), ImpError> {
        let spec = self.spec(self.command.fetch, "fetch")?;
        self.run(spec, &[])
    }

    /// Advance to the remote tip of the default branch.
    pub fn latest(&self) -> Result<(), ImpError> {
        let spec = self.spec(self.command.pull, "pull")?;
        if self.command.cmd == "git" {
            // Pulling on a detached HEAD would not move any branch.
            self.run("checkout", &[self.default_branch.as_str()])?;
        }
        self.run(spec, &[])
    }

    fn spec(&self, spec: Option<&'static str>, operation: &'static str) -> Result<&'static str, ImpError> {
        spec.ok_or(ImpError::Unsupported {
            vcs: self.command.name,
            operation,
        })
    }

    fn run(&self, spec: &str, extra: &[&str]) -> Result<(), ImpError> {
        execute(&self.root, self.command.cmd, &spec_args(spec, extra))
    }

    fn run_output(&self, spec: &str, extra: &[&str]) -> Result<String, ImpError> {
        output(&self.root, self.command.cmd, &spec_args(spec, extra))
    }
}

fn spec_args<'a>(spec: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
    spec.split_whitespace().chain(extra.iter().copied()).collect()
}

/// Run `program` in `cwd`, turning a non-zero exit into an error carrying
/// its stderr.
pub(crate) fn execute(cwd: &Path, program: &str, args: &[&str]) -> Result<(), ImpError> {
    output(cwd, program, args).map(|_| ())
}

/// Run `program` in `cwd` and return its stdout.
pub(crate) fn output(cwd: &Path, program: &str, args: &[&str]) -> Result<String, ImpError> {
    let command_line = render_command(program, args);
    debug!(cwd = %cwd.display(), "running {command_line}");

    let result = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ImpError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            result.status.to_string()
        } else {
            stderr
        };
        return Err(ImpError::VcsFailure {
            command: command_line,
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&result.stdout).into_owned())
}

pub(crate) fn render_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        (tmp, src)
    }

    #[test]
    fn detect_finds_nearest_root() {
        let (_tmp, src) = workspace();
        let repo = src.join("github.com/a/b");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::create_dir_all(repo.join("sub/pkg")).unwrap();

        let vcs = Vcs::detect(&repo.join("sub/pkg"), &src, VCS_LIST).unwrap();
        assert_eq!(vcs.name(), "Git");
        assert_eq!(vcs.root(), repo.as_path());
    }

    #[test]
    fn detect_mercurial() {
        let (_tmp, src) = workspace();
        let repo = src.join("bitbucket.org/x/y");
        fs::create_dir_all(repo.join(".hg")).unwrap();

        let vcs = Vcs::detect(&repo, &src, VCS_LIST).unwrap();
        assert_eq!(vcs.name(), "Mercurial");
    }

    #[test]
    fn control_file_is_not_a_repository() {
        let (_tmp, src) = workspace();
        let repo = src.join("example.com/worktree");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join(".git"), "gitdir: elsewhere").unwrap();

        let err = Vcs::detect(&repo, &src, VCS_LIST).unwrap_err();
        assert!(matches!(err, ImpError::VcsUnknown(_)));
    }

    #[test]
    fn detect_stops_at_source_root() {
        let (_tmp, src) = workspace();
        fs::create_dir_all(src.join(".git")).unwrap();
        let pkg = src.join("example.com/x");
        fs::create_dir_all(&pkg).unwrap();

        let err = Vcs::detect(&pkg, &src, VCS_LIST).unwrap_err();
        assert!(matches!(err, ImpError::VcsUnknown(_)));
    }

    #[test]
    fn detect_rejects_directories_outside_root() {
        let (tmp, src) = workspace();
        let outside = tmp.path().join("srcfoo");
        fs::create_dir_all(outside.join(".git")).unwrap();

        let err = Vcs::detect(&outside, &src, VCS_LIST).unwrap_err();
        assert!(matches!(err, ImpError::OutsideSourceRoot { .. }));

        let err = Vcs::detect(&src, &src, VCS_LIST).unwrap_err();
        assert!(matches!(err, ImpError::OutsideSourceRoot { .. }));
    }

    #[test]
    fn bazaar_cannot_pull() {
        let (_tmp, src) = workspace();
        let repo = src.join("launchpad.net/z");
        fs::create_dir_all(repo.join(".bzr")).unwrap();

        let vcs = Vcs::detect(&repo, &src, VCS_LIST).unwrap();
        let err = vcs.latest().unwrap_err();
        assert!(matches!(
            err,
            ImpError::Unsupported {
                vcs: "Bazaar",
                operation: "pull"
            }
        ));
    }

    #[test]
    fn custom_table() {
        let (_tmp, src) = workspace();
        let repo = src.join("example.com/svn");
        fs::create_dir_all(repo.join(".svn")).unwrap();
        let table = [VcsCommand {
            name: "Subversion",
            cmd: "svn",
            commit: "info --show-item revision",
            checkout: None,
            fetch: None,
            pull: None,
        }];

        let vcs = Vcs::detect(&repo, &src, &table).unwrap();
        assert!(matches!(
            vcs.fetch().unwrap_err(),
            ImpError::Unsupported { .. }
        ));
        assert!(matches!(
            vcs.checkout("12").unwrap_err(),
            ImpError::Unsupported { .. }
        ));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let tmp = TempDir::new().unwrap();
        let err = execute(tmp.path(), "goimp-no-such-program", &[]).unwrap_err();
        assert!(matches!(err, ImpError::Spawn { .. }));
    }

    #[test]
    fn spec_arguments() {
        assert_eq!(spec_args("revert -r", &["12"]), vec!["revert", "-r", "12"]);
        assert_eq!(spec_args("pull  -u", &[]), vec!["pull", "-u"]);
        assert_eq!(render_command("git", &["rev-parse", "HEAD"]), "git rev-parse HEAD");
    }
}
