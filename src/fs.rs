//! File System Module
//!
//! The file-access abstraction the ETag computation reads through, plus a
//! directory-rooted implementation.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

// == File System Trait ==
/// Anything that can open a named resource for sequential reading.
///
/// Errors are not distinguished by kind; every failure is treated the same way.
pub trait FileSystem: Send + Sync + 'static {
    /// Opens the resource at `path` (a decoded URL path such as `/app.js`).
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
}

// == Directory File System ==
/// Serves files below a root directory.
#[derive(Debug, Clone)]
pub struct DirFileSystem {
    root: PathBuf,
}

impl DirFileSystem {
    /// Creates a file system rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a URL path onto a path below the root.
    ///
    /// Returns `None` when the path would escape the root.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut full = self.root.clone();

        for segment in path.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }

            // A segment must be exactly one plain file name (no `..`, prefix or root).
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => full.push(part),
                _ => return None,
            }
        }

        Some(full)
    }
}

impl FileSystem for DirFileSystem {
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let full = self.resolve(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path escapes root: {}", path),
            )
        })?;

        Ok(Box::new(File::open(full)?))
    }
}
