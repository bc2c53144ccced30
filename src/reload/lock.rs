// src/reload/lock.rs

//! Filesystem lock markers.
//!
//! A zero-length `<original-filename>.lock` file next to an artifact means a
//! rebuild of that artifact is in progress or recently finished and pending
//! cleanup. The marker guards against a second manager process, or a
//! lingering toolchain invocation from a failed attempt, racing on the same
//! artifact; same-process serialization comes from the reload cycle itself.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lock-marker path for `artifact`: the artifact path plus a `.lock` suffix
/// (`views/a.csp` → `views/a.csp.lock`).
pub fn lock_path(artifact: &Path) -> PathBuf {
    let mut os = artifact.as_os_str().to_os_string();
    os.push(".lock");
    PathBuf::from(os)
}

/// True if the marker for `artifact` currently exists.
pub fn is_locked(artifact: &Path) -> bool {
    lock_path(artifact).exists()
}

/// Create the zero-length marker for `artifact`.
pub fn create_lock(artifact: &Path) -> io::Result<()> {
    fs::File::create(lock_path(artifact)).map(|_| ())
}

/// Remove the marker for `artifact`.
pub fn remove_lock(artifact: &Path) -> io::Result<()> {
    fs::remove_file(lock_path(artifact))
}
