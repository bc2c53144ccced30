// src/registry.rs

//! In-memory registry of loaded modules.
//!
//! The registry is the authoritative view of "what is currently loaded". It
//! is owned by the reload manager and mutated only on the reload cycle, so no
//! internal locking is needed. `H` is the opaque handle type of whatever
//! [`crate::build::loader::ModuleLoader`] the manager runs with.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

/// The tracked state for an artifact whose module is currently loaded.
#[derive(Debug)]
pub struct LoadRecord<H> {
    /// Handle owning the loaded module.
    pub handle: H,
    /// Modification time of the artifact the module was built from.
    pub modified: SystemTime,
}

#[derive(Debug)]
enum ArtifactState<H> {
    /// A module built from the artifact at `modified` is loaded.
    Loaded(LoadRecord<H>),
    /// The build for the artifact at `modified` failed; don't retry until the
    /// artifact changes again.
    Failed { modified: SystemTime },
}

impl<H> ArtifactState<H> {
    fn modified(&self) -> SystemTime {
        match self {
            ArtifactState::Loaded(record) => record.modified,
            ArtifactState::Failed { modified } => *modified,
        }
    }
}

/// Mapping from artifact path to its last-known load or failure record.
///
/// Invariant: at most one load record exists per artifact path; a new record
/// for the same path is only installed after the previous handle has been
/// released (callers go through [`take_loaded`](Self::take_loaded) first).
/// Entries for artifacts that disappear from the filesystem are never
/// evicted.
#[derive(Debug, Default)]
pub struct ArtifactRegistry<H> {
    entries: HashMap<PathBuf, ArtifactState<H>>,
}

impl<H> ArtifactRegistry<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The load record for `path`, if a module is currently loaded for it.
    pub fn lookup(&self, path: &Path) -> Option<&LoadRecord<H>> {
        match self.entries.get(path) {
            Some(ArtifactState::Loaded(record)) => Some(record),
            _ => None,
        }
    }

    /// True if nothing is recorded for `path`, or `candidate` is strictly
    /// newer than the recorded modification time (loaded or failed alike).
    ///
    /// Equal or older timestamps are never stale; this comparison is the sole
    /// de-duplication mechanism between cycles.
    pub fn is_stale(&self, path: &Path, candidate: SystemTime) -> bool {
        match self.entries.get(path) {
            None => true,
            Some(state) => candidate > state.modified(),
        }
    }

    /// Remove and return the load record for `path`, if any, so the caller
    /// can release the handle before rebuilding. Failure records are left in
    /// place.
    pub fn take_loaded(&mut self, path: &Path) -> Option<LoadRecord<H>> {
        match self.entries.remove(path)? {
            ArtifactState::Loaded(record) => Some(record),
            failed @ ArtifactState::Failed { .. } => {
                self.entries.insert(path.to_path_buf(), failed);
                None
            }
        }
    }

    /// Install the record for a freshly loaded module, replacing any previous
    /// entry. The caller must already have released the previous handle.
    pub fn install(&mut self, path: PathBuf, handle: H, modified: SystemTime) {
        debug!(artifact = ?path, "installing load record");
        self.entries
            .insert(path, ArtifactState::Loaded(LoadRecord { handle, modified }));
    }

    /// Record a failed build attempt for the artifact as modified at
    /// `modified`, so the same modification is not retried every cycle.
    pub fn mark_failed(&mut self, path: PathBuf, modified: SystemTime) {
        debug!(artifact = ?path, "recording failed build");
        self.entries.insert(path, ArtifactState::Failed { modified });
    }

    /// Number of tracked artifacts (loaded and failed).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
