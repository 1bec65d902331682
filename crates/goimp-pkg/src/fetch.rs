//! Restoring the workspace to a set of pinned imports.
//!
//! Runs in two phases over all entries. The first downloads every import
//! missing from the workspace, the second moves each repository to its
//! pinned revision. Both phases run on a dedicated rayon pool with one
//! thread per entry, so every entry's command is in flight at once. The
//! second phase only starts once every download has finished, since a
//! download may bring in a repository that another entry lives in.

use crate::config::{ConfigError, Settings};
use crate::error::ImpError;
use crate::manifest::{Manifest, PinnedImport};
use crate::vcs::{render_command, Vcs};
use crate::workspace::{Project, Workspace};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::process::Command;
use tracing::{debug, info, warn};

/// Where an entry ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The working tree was already at the pinned revision.
    AlreadyAt,
    CheckedOut,
    /// The revision was only found after fetching remote history.
    CheckedOutAfterFetch,
    /// Unpinned entry advanced to the remote tip.
    Latest,
    Failed(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAt => write!(f, "already at revision"),
            Self::CheckedOut => write!(f, "checked out"),
            Self::CheckedOutAfterFetch => write!(f, "checked out after fetch"),
            Self::Latest => write!(f, "updated to latest"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Result of restoring one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub import: PinnedImport,
    /// The download command ran for this entry.
    pub downloaded: bool,
    pub outcome: Outcome,
}

/// Per-entry results of a fetch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub entries: Vec<EntryReport>,
}

impl FetchReport {
    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|entry| entry.outcome.is_failure())
    }

    pub fn downloaded(&self) -> usize {
        self.entries.iter().filter(|entry| entry.downloaded).count()
    }

    /// Number of entries that ran no command in the positioning phase.
    pub fn unchanged(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == Outcome::AlreadyAt)
            .count()
    }
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        let unchanged = self.unchanged();
        let moved = self.entries.len() - failed - unchanged;
        write!(
            f,
            "{} imports: {} downloaded, {} moved, {} unchanged, {} failed",
            self.entries.len(),
            self.downloaded(),
            moved,
            unchanged,
            failed
        )
    }
}

/// Restore every entry of the project's manifest.
///
/// A manifest that cannot be read is an error; failures of individual
/// entries are only reported.
pub fn get(workspace: &Workspace, project: &Project, reset: bool) -> Result<FetchReport, ImpError> {
    let manifest = Manifest::from_path(project.manifest_path())?;
    Ok(fetch(workspace, project.settings(), manifest.imports, reset))
}

/// Download and position `imports`. With `reset` every revision is
/// ignored and each repository moves to its remote tip.
pub fn fetch(workspace: &Workspace, settings: &Settings, mut imports: Vec<PinnedImport>, reset: bool) -> FetchReport {
    if reset {
        for import in &mut imports {
            import.hash.clear();
        }
    }

    let pool = phase_pool(imports.len());
    let downloaded: Vec<bool> = in_pool(pool.as_ref(), || {
        imports
            .par_iter()
            .map(|import| materialize(workspace, settings, import))
            .collect()
    });

    let outcomes: Vec<Outcome> = in_pool(pool.as_ref(), || {
        imports
            .par_iter()
            .map(|import| position(workspace, settings, import))
            .collect()
    });

    let entries = imports
        .into_iter()
        .zip(downloaded)
        .zip(outcomes)
        .map(|((import, downloaded), outcome)| EntryReport {
            import,
            downloaded,
            outcome,
        })
        .collect();
    FetchReport { entries }
}

/// A pool with one thread per entry. The entries mostly wait on
/// subprocesses, so the CPU count is no useful bound. Falls back to the
/// global pool when the threads cannot be spawned.
fn phase_pool(entries: usize) -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(entries.max(1))
        .thread_name(|i| format!("goimp-fetch-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!("no dedicated pool for {entries} imports, using the global one: {err}");
            None
        }
    }
}

fn in_pool<R, F>(pool: Option<&ThreadPool>, phase: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(phase),
        None => phase(),
    }
}

/// Run the download command when the import is missing. Returns whether
/// it ran successfully.
fn materialize(workspace: &Workspace, settings: &Settings, import: &PinnedImport) -> bool {
    let dir = workspace.package_dir(&import.package);
    if dir.exists() {
        debug!("{} present at {}", import.package, dir.display());
        return false;
    }

    info!("fetching {}", import.package);
    match download(settings, &import.package) {
        Ok(()) => true,
        Err(err) => {
            warn!("downloading {}: {err}", import.package);
            false
        }
    }
}

/// The download command inherits stdio so its progress is visible.
fn download(settings: &Settings, package: &str) -> Result<(), ImpError> {
    let Some((program, args)) = settings.download.split_first() else {
        return Err(ConfigError::EmptyDownloadCommand.into());
    };
    let mut args: Vec<&str> = args.iter().map(String::as_str).collect();
    args.push(package);
    let command_line = render_command(program, &args);
    debug!("running {command_line}");

    let status = Command::new(program)
        .args(&args)
        .status()
        .map_err(|source| ImpError::Spawn {
            program: program.clone(),
            source,
        })?;
    if !status.success() {
        return Err(ImpError::VcsFailure {
            command: command_line,
            stderr: status.to_string(),
        });
    }
    Ok(())
}

fn position(workspace: &Workspace, settings: &Settings, import: &PinnedImport) -> Outcome {
    let dir = workspace.package_dir(&import.package);
    let vcs = match Vcs::for_dir(workspace, &dir) {
        Ok(vcs) => vcs.with_default_branch(settings.default_branch.as_str()),
        Err(err) => {
            warn!("{}: {err}", import.package);
            return Outcome::Failed(err.to_string());
        }
    };

    let outcome = if import.hash.is_empty() {
        vcs.latest().map(|()| Outcome::Latest)
    } else {
        checkout(&vcs, &import.hash)
    };

    outcome.unwrap_or_else(|err| {
        warn!("{}: {err}", import.package);
        Outcome::Failed(err.to_string())
    })
}

fn checkout(vcs: &Vcs, rev: &str) -> Result<Outcome, ImpError> {
    match vcs.checkout(rev) {
        Ok(false) => return Ok(Outcome::AlreadyAt),
        Ok(true) => return Ok(Outcome::CheckedOut),
        Err(err) => debug!("checkout of {rev} in {} failed, fetching: {err}", vcs.root().display()),
    }
    vcs.fetch()?;
    vcs.checkout(rev)?;
    Ok(Outcome::CheckedOutAfterFetch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings_with_download(download: &[&str]) -> Settings {
        Settings {
            download: download.iter().map(|s| s.to_string()).collect(),
            ..Settings::default()
        }
    }

    #[test]
    fn present_directories_are_not_downloaded() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        fs::create_dir_all(ws.package_dir("a.com/x")).unwrap();

        let settings = settings_with_download(&["goimp-no-such-program"]);
        let import = PinnedImport::new("a.com/x/...", "abc");
        assert!(!materialize(&ws, &settings, &import));
    }

    #[test]
    fn failing_download_is_reported_per_entry() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let settings = settings_with_download(&["goimp-no-such-program"]);

        let report = fetch(
            &ws,
            &settings,
            vec![
                PinnedImport::new("a.com/x", "abc"),
                PinnedImport::unpinned("b.com/y"),
            ],
            false,
        );
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].import.package, "a.com/x");
        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.downloaded(), 0);
        assert_eq!(
            report.to_string(),
            "2 imports: 0 downloaded, 0 moved, 0 unchanged, 2 failed"
        );
    }

    #[test]
    fn unversioned_directory_fails_positioning() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        fs::create_dir_all(ws.package_dir("a.com/x")).unwrap();

        let outcome = position(&ws, &Settings::default(), &PinnedImport::new("a.com/x", "abc"));
        assert!(outcome.is_failure());
    }

    #[test]
    fn phase_pool_has_a_thread_per_entry() {
        let entries = rayon::current_num_threads() * 4 + 1;
        let pool = phase_pool(entries).unwrap();
        assert_eq!(pool.current_num_threads(), entries);
        assert_eq!(in_pool(Some(&pool), rayon::current_num_threads), entries);

        assert_eq!(phase_pool(0).unwrap().current_num_threads(), 1);
    }

    #[test]
    fn more_entries_than_cpus_are_all_reported() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let settings = settings_with_download(&["goimp-no-such-program"]);

        let count = rayon::current_num_threads() * 2 + 3;
        let imports: Vec<PinnedImport> = (0..count)
            .map(|i| PinnedImport::new(format!("h{i}.com/x"), "abc"))
            .collect();
        let report = fetch(&ws, &settings, imports, false);
        assert_eq!(report.entries.len(), count);
        assert_eq!(report.failures().count(), count);
        assert_eq!(report.entries[count - 1].import.package, format!("h{}.com/x", count - 1));
    }

    #[test]
    fn reset_clears_revisions() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let settings = settings_with_download(&["goimp-no-such-program"]);

        let report = fetch(&ws, &settings, vec![PinnedImport::new("a.com/x", "abc")], true);
        assert!(report.entries[0].import.hash.is_empty());
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::new(tmp.path());
        let project = Project::new(tmp.path().join("proj"), Settings::default());
        assert!(get(&ws, &project, false).is_err());
    }
}
