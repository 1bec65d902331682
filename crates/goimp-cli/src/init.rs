//! Vendor workspace initialization for `goimp init`.

use anyhow::{bail, Context, Result};
use goimp_pkg::SOURCE_DIR;
use std::fs;
use std::path::{Path, PathBuf};

/// Default vendor directory inside the repository.
pub const VENDOR_DIR: &str = ".vendor";

/// File exporting the vendor workspace.
pub const ENV_FILE: &str = "goimp.env";

/// Options for workspace initialization.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory containing the source files.
    pub repo: PathBuf,

    /// Vendor workspace (defaults to `<repo>/.vendor`).
    pub vendor: Option<PathBuf>,
}

/// Create `<vendor>/src` and write an env file into `out_dir` that puts the
/// vendor workspace first on `GOPATH`. Returns the env file's path.
pub fn init_workspace(options: &InitOptions, out_dir: &Path) -> Result<PathBuf> {
    if !options.repo.is_dir() {
        bail!("Repository directory `{}` does not exist", options.repo.display());
    }

    let vendor = options
        .vendor
        .clone()
        .unwrap_or_else(|| options.repo.join(VENDOR_DIR));
    let vendor_src = vendor.join(SOURCE_DIR);
    fs::create_dir_all(&vendor_src)
        .with_context(|| format!("Failed to create {}", vendor_src.display()))?;

    let vendor = vendor
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", vendor.display()))?;

    let env_file = out_dir.join(ENV_FILE);
    fs::write(&env_file, env_contents(&vendor))
        .with_context(|| format!("Failed to write {}", env_file.display()))?;
    Ok(env_file)
}

fn env_contents(vendor: &Path) -> String {
    format!("export GOPATH={}:$GOPATH\n", vendor.display())
}
