//! Keeping the manifest and the workspace in step.
//!
//! The binder polls two observations, the manifest on disk and the pin
//! set of the workspace. When the manifest changed since the last
//! snapshot the workspace is restored from it; otherwise, when the
//! workspace changed, the manifest is rewritten. After either action both
//! sides are snapshotted again.

use crate::error::ImpError;
use crate::fetch::get;
use crate::manifest::{Manifest, PinMap};
use crate::pin::{list, ListOptions};
use crate::workspace::{Project, Workspace};
use crate::write::{write, WriteOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The two sides the binder reconciles.
pub trait Sides {
    /// Pins recorded in the manifest.
    fn read_manifest(&mut self) -> Result<PinMap, ImpError>;

    /// Pins currently checked out in the workspace.
    fn read_workspace(&mut self) -> Result<PinMap, ImpError>;

    /// Restore the workspace from the manifest.
    fn sync_workspace(&mut self) -> Result<(), ImpError>;

    /// Rewrite the manifest from the workspace.
    fn sync_manifest(&mut self) -> Result<(), ImpError>;
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Idle,
    /// The manifest changed and the workspace was restored.
    Restored,
    /// The workspace changed and the manifest was rewritten.
    Rewrote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    manifest: PinMap,
    workspace: PinMap,
}

/// Polls a pair of [`Sides`] and acts on the first one that changed.
pub struct Binder<S> {
    sides: S,
    snapshot: Option<Snapshot>,
}

impl<S: Sides> Binder<S> {
    pub fn new(sides: S) -> Self {
        Self {
            sides,
            snapshot: None,
        }
    }

    pub fn sides(&self) -> &S {
        &self.sides
    }

    /// Compare both sides against the snapshot and act on the first
    /// difference, the manifest taking precedence.
    ///
    /// Without a snapshot this only takes one. A failing observation
    /// leaves the snapshot as it was.
    pub fn tick(&mut self) -> Result<Action, ImpError> {
        let Some(snapshot) = &self.snapshot else {
            self.snapshot = Some(self.observe()?);
            return Ok(Action::Idle);
        };

        let manifest = self.sides.read_manifest()?;
        if manifest != snapshot.manifest {
            return self.act(Action::Restored);
        }

        let workspace = self.sides.read_workspace()?;
        if workspace != snapshot.workspace {
            return self.act(Action::Rewrote);
        }

        Ok(Action::Idle)
    }

    /// Tick forever, sleeping `interval` between ticks.
    pub fn run(&mut self, interval: Duration) -> ! {
        loop {
            std::thread::sleep(interval);
            match self.tick() {
                Ok(Action::Idle) => {}
                Ok(action) => debug!("bind tick: {action:?}"),
                Err(err) => warn!("skipping bind tick: {err}"),
            }
        }
    }

    fn act(&mut self, action: Action) -> Result<Action, ImpError> {
        let result = match action {
            Action::Restored => {
                info!("manifest changed, restoring workspace");
                self.sides.sync_workspace()
            }
            Action::Rewrote => {
                info!("workspace changed, rewriting manifest");
                self.sides.sync_manifest()
            }
            Action::Idle => Ok(()),
        };

        self.snapshot = match self.observe() {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!("cannot snapshot after {action:?}: {err}");
                None
            }
        };
        result.map(|()| action)
    }

    fn observe(&mut self) -> Result<Snapshot, ImpError> {
        Ok(Snapshot {
            manifest: self.sides.read_manifest()?,
            workspace: self.sides.read_workspace()?,
        })
    }
}

/// The real sides: a project's manifest and the workspace it lives in.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSides<'a> {
    workspace: &'a Workspace,
    project: &'a Project,
}

impl<'a> ProjectSides<'a> {
    pub fn new(workspace: &'a Workspace, project: &'a Project) -> Self {
        Self { workspace, project }
    }
}

impl Sides for ProjectSides<'_> {
    /// A missing manifest reads as empty so the first rewrite creates it.
    fn read_manifest(&mut self) -> Result<PinMap, ImpError> {
        let path = self.project.manifest_path();
        if !path.exists() {
            return Ok(PinMap::new());
        }
        Ok(Manifest::from_path(path)?.to_map())
    }

    fn read_workspace(&mut self) -> Result<PinMap, ImpError> {
        let manifest = list(self.workspace, self.project, ListOptions::new(true, true))?;
        Ok(manifest.to_map())
    }

    fn sync_workspace(&mut self) -> Result<(), ImpError> {
        let report = get(self.workspace, self.project, false)?;
        info!("{report}");
        Ok(())
    }

    fn sync_manifest(&mut self) -> Result<(), ImpError> {
        write(self.workspace, self.project, WriteOptions::default()).map(|_| ())
    }
}
