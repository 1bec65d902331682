//! The pinned-imports manifest (`Godeps`).
//!
//! One entry per line, import path and revision separated by whitespace:
//!
//! ```text
//! github.com/lib/pq	83c4f4d8e2c6e7d04a0d31bd5d0f5d4e2b6c6bb1
//! gopkg.in/yaml.v2/...	a5b47d31c556af34a302ce5d659e6fea44d90de0
//! ```

use crate::error::ImpError;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

/// Width of a tab stop in the aligned table view
const TAB_WIDTH: usize = 8;

/// Import path to revision, as observed by the bind loop.
pub type PinMap = BTreeMap<String, String>;

/// One manifest record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinnedImport {
    /// Import path, possibly ending in `/...`.
    pub package: String,
    /// VCS revision; empty means the remote's default tip.
    pub hash: String,
}

impl PinnedImport {
    pub fn new(package: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            hash: hash.into(),
        }
    }

    /// An entry without a revision.
    pub fn unpinned(package: impl Into<String>) -> Self {
        Self::new(package, String::new())
    }
}

/// An ordered sequence of pinned imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub imports: Vec<PinnedImport>,
}

impl Manifest {
    pub fn new(imports: Vec<PinnedImport>) -> Self {
        Self { imports }
    }

    /// Read a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImpError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Parse manifest text. Blank lines are skipped, a missing revision
    /// reads as empty and fields after the revision are ignored.
    pub fn parse(content: &str) -> Self {
        let imports = content
            .trim_matches('\n')
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let package = fields.next()?;
                let hash = fields.next().unwrap_or_default();
                Some(PinnedImport::new(package, hash))
            })
            .collect();
        Self { imports }
    }

    /// Canonical manifest text: `path<TAB>hash` per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str(&import.package);
            out.push('\t');
            out.push_str(&import.hash);
            out.push('\n');
        }
        out
    }

    /// Write the canonical manifest text.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()
    }

    /// The entries as an aligned table: the path column is padded with
    /// tabs to a common tab stop.
    pub fn render_table(&self) -> String {
        let widest = self
            .imports
            .iter()
            .map(|import| import.package.chars().count())
            .max()
            .unwrap_or(0);
        let column = (widest / TAB_WIDTH + 1) * TAB_WIDTH;

        let mut out = String::new();
        for import in &self.imports {
            let width = import.package.chars().count();
            let tabs = (column - width).div_ceil(TAB_WIDTH);
            out.push_str(&import.package);
            out.push_str(&"\t".repeat(tabs));
            out.push_str(&import.hash);
            out.push('\n');
        }
        out
    }

    /// Path to revision mapping; later duplicates win.
    pub fn to_map(&self) -> PinMap {
        self.imports
            .iter()
            .map(|import| (import.package.clone(), import.hash.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PinnedImport> {
        self.imports.iter()
    }
}

impl FromIterator<PinnedImport> for Manifest {
    fn from_iter<I: IntoIterator<Item = PinnedImport>>(iter: I) -> Self {
        Self {
            imports: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Manifest {
    type Item = PinnedImport;
    type IntoIter = std::vec::IntoIter<PinnedImport>;

    fn into_iter(self) -> Self::IntoIter {
        self.imports.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_A: &str = "0123456789abcdef0123456789abcdef01234567";
    const HASH_B: &str = "fedcba9876543210fedcba9876543210fedcba98";

    #[test]
    fn render_single_entry() {
        let manifest = Manifest::new(vec![PinnedImport::new("a.com/q", HASH_A)]);
        assert_eq!(manifest.render(), format!("a.com/q\t{HASH_A}\n"));
    }

    #[test]
    fn parse_accepts_any_whitespace() {
        let text = format!("\n\na.com/q {HASH_A}\n\nb.com/r\t\t{HASH_B}  trailing junk\r\nc.com/s\n\n");
        let manifest = Manifest::parse(&text);
        assert_eq!(
            manifest.imports,
            vec![
                PinnedImport::new("a.com/q", HASH_A),
                PinnedImport::new("b.com/r", HASH_B),
                PinnedImport::unpinned("c.com/s"),
            ]
        );
    }

    #[test]
    fn parse_empty() {
        assert!(Manifest::parse("").is_empty());
        assert!(Manifest::parse("\n\n").is_empty());
    }

    #[test]
    fn render_then_parse_restores_entries() {
        let manifest = Manifest::new(vec![
            PinnedImport::new("a.com/q/...", HASH_A),
            PinnedImport::unpinned("b.com/r"),
            PinnedImport::new("c.com/s", "42"),
        ]);
        assert_eq!(Manifest::parse(&manifest.render()), manifest);
    }

    #[test]
    fn map_is_last_wins() {
        let manifest = Manifest::parse("a.com/q 1\na.com/q 2\nb.com/r 3\n");
        let map = manifest.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a.com/q"], "2");
    }

    #[test]
    fn table_aligns_hash_column() {
        let manifest = Manifest::new(vec![
            PinnedImport::new("a.com/q", "1"),
            PinnedImport::new("github.com/long/name", "2"),
            PinnedImport::new("exactly8", "3"),
        ]);
        assert_eq!(
            manifest.render_table(),
            "a.com/q\t\t\t1\ngithub.com/long/name\t2\nexactly8\t\t3\n"
        );
    }

    #[test]
    fn write_to_buffer() {
        let manifest = Manifest::new(vec![PinnedImport::new("a.com/q", HASH_A)]);
        let mut buf = Vec::new();
        manifest.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), manifest.render());
    }
}
