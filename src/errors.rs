// src/errors.rs

//! Crate-wide error types.
//!
//! Cycle-level failures are typed so the reload manager knows their scope:
//! a [`ScanError`] aborts one directory's scan, a [`BuildError`] or
//! [`LoadError`] affects one artifact, and none of them are fatal to the
//! process. Wiring code (config loading, startup) uses `anyhow` instead.

use std::path::PathBuf;

use thiserror::Error;

pub use anyhow::{Error, Result};

/// Failure while enumerating a watch directory.
///
/// Directory-scoped: the manager logs it and abandons the rest of that
/// directory's scan; other directories in the same cycle are unaffected.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("opening watch directory {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading entry under {path:?}: {source}")]
    Entry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while loading or unloading a shared module.
///
/// The `detail` string carries the loading facility's own diagnostic.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("loading module {path:?}: {detail}")]
    Load { path: PathBuf, detail: String },

    #[error("unloading module: {detail}")]
    Unload { detail: String },
}

/// Failure in the generate → compile → load pipeline for one artifact.
///
/// Artifact-scoped: the cycle logs it and moves on to the next entry. The
/// artifact is retried once a later scan sees a strictly newer modification
/// time and its lock marker has been cleared.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("generator failed for {artifact:?} (exit status {status})")]
    Generation { artifact: PathBuf, status: i32 },

    #[error("compiler failed for {generated:?} (exit status {status})")]
    Compile { generated: PathBuf, status: i32 },

    #[error("spawning {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),
}
