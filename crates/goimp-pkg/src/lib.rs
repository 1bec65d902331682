//! Pinning and restoring the dependencies of a Go workspace project.
//!
//! This crate provides:
//! - The workspace context (`GOPATH` source root, VCS table) and project settings
//! - Transitive import discovery over `<workspace>/src`
//! - Git, Mercurial and Bazaar drivers
//! - The `Godeps` manifest format
//! - The list, write, get and bind engines

mod bind;
mod config;
mod error;
mod fetch;
mod imports;
mod manifest;
mod pin;
mod source;
mod vcs;
mod workspace;
mod write;

pub use bind::{Action, Binder, ProjectSides, Sides};
pub use config::{ConfigError, Settings, CONFIG_FILE, DEFAULT_MANIFEST};
pub use error::ImpError;
pub use fetch::{fetch, get, EntryReport, FetchReport, Outcome};
pub use imports::ImportScanner;
pub use manifest::{Manifest, PinMap, PinnedImport};
pub use pin::{list, ListOptions};
pub use source::{parse_dir, SOURCE_EXT};
pub use vcs::{Vcs, VcsCommand, VCS_LIST};
pub use workspace::{Project, Workspace, RECURSIVE_SUFFIX, SOURCE_DIR, WORKSPACE_ENV};
pub use write::{write, WriteOptions};
