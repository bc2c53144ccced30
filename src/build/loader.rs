// src/build/loader.rs

use std::path::Path;

use libloading::Library;
use tracing::{debug, info};

use crate::errors::LoadError;

/// Seam over the platform's dynamic-loading facility.
///
/// Production code uses [`DlLoader`]; tests can provide an implementation
/// with cheap counter handles.
pub trait ModuleLoader {
    /// Opaque handle owning one loaded module.
    type Handle;

    /// Load the module at `path`. A failure carries the loading facility's
    /// diagnostic string.
    fn load(&self, path: &Path) -> Result<Self::Handle, LoadError>;

    /// Release a handle. Best-effort from the manager's point of view: a
    /// failure is logged by the caller and does not block a rebuild.
    fn unload(&self, handle: Self::Handle) -> Result<(), LoadError>;
}

/// Real loader backed by `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DlLoader;

impl ModuleLoader for DlLoader {
    type Handle = Library;

    fn load(&self, path: &Path) -> Result<Library, LoadError> {
        // SAFETY: the module's initialisers run on load; the path points at
        // output the configured toolchain just produced.
        let library = unsafe { Library::new(path) }.map_err(|err| LoadError::Load {
            path: path.to_path_buf(),
            detail: err.to_string(),
        })?;

        info!(module = ?path, "loaded shared module");
        Ok(library)
    }

    fn unload(&self, handle: Library) -> Result<(), LoadError> {
        handle.close().map_err(|err| LoadError::Unload {
            detail: err.to_string(),
        })?;

        debug!("closed shared module handle");
        Ok(())
    }
}
