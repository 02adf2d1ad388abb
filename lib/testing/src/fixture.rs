use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A throwaway directory tree for exercising digest and deploy code against
/// real files. The directory is removed when the value is dropped.
pub struct TempSite {
    dir: TempDir,
}

impl TempSite {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp site dir"),
        }
    }

    /// Writes `contents` to `path` below the site root, creating parent
    /// directories as needed. Consumes and returns self so trees can be
    /// declared in one expression.
    pub fn file<P: AsRef<Path>>(self, path: P, contents: &str) -> Self {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dirs");
        }
        fs::write(&full, contents).expect("failed to write fixture file");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TempSite {
    fn default() -> Self {
        TempSite::new()
    }
}
