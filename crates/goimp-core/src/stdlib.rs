//! Standard library classification of import paths.

use crate::set::Set;

/// Top-level names of the packages bundled with the Go toolchain, plus the
/// synthetic `C` package used by cgo.
pub const STD_PACKAGES: &[&str] = &[
    "C", "archive", "bufio", "builtin", "bytes", "cmp", "compress", "container", "context",
    "crypto", "database", "debug", "embed", "encoding", "errors", "expvar", "flag", "fmt", "go",
    "hash", "html", "image", "index", "internal", "io", "iter", "log", "maps", "math", "mime",
    "net", "os", "path", "plugin", "reflect", "regexp", "runtime", "slices", "sort", "strconv",
    "strings", "structs", "sync", "syscall", "testing", "text", "time", "unicode", "unique",
    "unsafe", "weak",
];

/// Decides whether an import path belongs to the standard library.
#[derive(Debug, Clone)]
pub struct StdLib {
    builtins: Set,
}

impl StdLib {
    /// An oracle over [`STD_PACKAGES`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_packages(STD_PACKAGES.iter().copied())
    }

    /// An oracle over a custom list of top-level names
    pub fn with_packages<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            builtins: names.into_iter().collect(),
        }
    }

    /// True iff the first segment of `path` names a bundled package
    #[must_use]
    pub fn is_std_lib(&self, path: &str) -> bool {
        let first = path.split('/').next().unwrap_or(path);
        self.builtins.contains(first)
    }
}

impl Default for StdLib {
    fn default() -> Self {
        Self::new()
    }
}
