//! Per-project settings (`goimp.toml`).
//!
//! ```toml
//! manifest = "Godeps"
//! default_branch = "master"
//! download = ["go", "get", "-d"]
//! bind_interval_ms = 1000
//! ```
//!
//! Every key is optional; a missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// The settings filename, looked up in the project directory.
pub const CONFIG_FILE: &str = "goimp.toml";

/// The default manifest filename.
pub const DEFAULT_MANIFEST: &str = "Godeps";

/// Default bind tick
const DEFAULT_BIND_INTERVAL_MS: u64 = 1000;

/// Errors that can occur when loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read goimp.toml: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse goimp.toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("`download` must name a program")]
    EmptyDownloadCommand,

    #[error("`manifest` cannot be empty")]
    EmptyManifestName,
}

/// Project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Manifest filename inside the project directory.
    pub manifest: String,

    /// Branch git checks out before pulling the latest revision.
    pub default_branch: String,

    /// Download-only command; the import path is appended.
    pub download: Vec<String>,

    /// Bind loop tick in milliseconds.
    pub bind_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: DEFAULT_MANIFEST.to_string(),
            default_branch: String::from("master"),
            download: vec!["go".into(), "get".into(), "-d".into()],
            bind_interval_ms: DEFAULT_BIND_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Load `goimp.toml` from `project`, or defaults when it does not exist.
    pub fn load(project: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = project.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.trim().is_empty() {
            return Err(ConfigError::EmptyManifestName);
        }
        if self.download.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyDownloadCommand);
        }
        Ok(())
    }

    /// Replace the manifest name when `name` is given.
    #[must_use]
    pub fn with_manifest(mut self, name: Option<String>) -> Self {
        if let Some(name) = name {
            self.manifest = name;
        }
        self
    }

    /// The bind tick as a duration.
    #[must_use]
    pub fn bind_interval(&self) -> Duration {
        Duration::from_millis(self.bind_interval_ms)
    }
}
