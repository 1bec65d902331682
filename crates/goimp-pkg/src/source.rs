//! Parsing every Go file of a package directory.

use crate::error::ImpError;
use goimp_core::{parse_file, GoFile};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Go source file extension.
pub const SOURCE_EXT: &str = "go";

/// Parse the headers of the `.go` files directly inside `dir`.
///
/// Subdirectories are not visited. Files that fail to read or parse are
/// skipped with a warning. A directory that cannot be listed is
/// [`ImpError::NotFound`]; one without a single parsed file is
/// [`ImpError::NotABuildablePackage`].
pub fn parse_dir(dir: &Path) -> Result<Vec<GoFile>, ImpError> {
    let entries = fs::read_dir(dir).map_err(|_| ImpError::NotFound(dir.display().to_string()))?;

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_dir()))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == SOURCE_EXT))
        .collect();
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                warn!("ignoring unreadable file {}: {err}", path.display());
                continue;
            }
        };
        match parse_file(&source) {
            Ok(file) => files.push(file),
            Err(source) => {
                let err = ImpError::Parse { path, source };
                warn!("ignoring unparsable file {err}");
            }
        }
    }

    if files.is_empty() {
        return Err(ImpError::NotABuildablePackage(dir.to_path_buf()));
    }
    Ok(files)
}
