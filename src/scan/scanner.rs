// src/scan/scanner.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::ScanError;

/// One non-hidden, non-directory entry produced by a directory scan.
///
/// Ephemeral: scan entries live for a single reload cycle and are never
/// persisted.
#[derive(Debug, Clone)]
pub struct ScanEntry {
    /// Full path of the entry (watch dir + file name).
    pub path: PathBuf,
    /// Last-modified time reported by the filesystem.
    pub modified: SystemTime,
}

/// Lazy iterator over the direct children of one watch directory.
///
/// Yields an entry per child that is not a directory and whose name does not
/// start with `.`. Does not recurse. An `Err` item means the remainder of
/// this directory's scan should be abandoned; re-calling [`scan_dir`] starts
/// a fresh scan.
pub struct ScanDir {
    dir: PathBuf,
    inner: fs::ReadDir,
}

/// Open `path` for scanning.
///
/// Fails with [`ScanError::Open`] if the directory cannot be read at all.
pub fn scan_dir(path: impl AsRef<Path>) -> Result<ScanDir, ScanError> {
    let dir = path.as_ref().to_path_buf();
    let inner = fs::read_dir(&dir).map_err(|source| ScanError::Open {
        path: dir.clone(),
        source,
    })?;
    Ok(ScanDir { dir, inner })
}

impl Iterator for ScanDir {
    type Item = Result<ScanEntry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(ScanError::Entry {
                        path: self.dir.clone(),
                        source,
                    }));
                }
            };

            // Hidden files are never candidates.
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(source) => {
                    return Some(Err(ScanError::Entry {
                        path: entry.path(),
                        source,
                    }));
                }
            };

            if metadata.is_dir() {
                continue;
            }

            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(source) => {
                    return Some(Err(ScanError::Entry {
                        path: entry.path(),
                        source,
                    }));
                }
            };

            return Some(Ok(ScanEntry {
                path: entry.path(),
                modified,
            }));
        }
    }
}
