// src/build/invoker.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::build::loader::ModuleLoader;
use crate::build::toolchain::Toolchain;
use crate::errors::BuildError;

/// Runs the generate → compile → load pipeline for one artifact.
///
/// Each step is a hard dependency on the previous one succeeding; the first
/// failure is returned as the corresponding [`BuildError`] variant and
/// nothing later in the pipeline runs.
pub struct BuildInvoker<T> {
    toolchain: T,
    gen_ext: String,
    module_ext: String,
}

impl<T: Toolchain> BuildInvoker<T> {
    pub fn new(toolchain: T, gen_ext: impl Into<String>, module_ext: impl Into<String>) -> Self {
        Self {
            toolchain,
            gen_ext: gen_ext.into(),
            module_ext: module_ext.into(),
        }
    }

    /// Path of the generated source for `artifact` inside `out_dir`: same
    /// base name, configured generated-source extension.
    pub fn generated_source_path(&self, artifact: &Path, out_dir: &Path) -> PathBuf {
        derived_path(artifact, out_dir, &self.gen_ext)
    }

    /// Path of the loadable module for `artifact` inside `out_dir`: same
    /// base name, configured module extension.
    pub fn module_path(&self, artifact: &Path, out_dir: &Path) -> PathBuf {
        derived_path(artifact, out_dir, &self.module_ext)
    }

    /// Build `artifact` into a loaded module handle.
    ///
    /// 1. generator subprocess (`BuildError::Generation` on non-zero exit)
    /// 2. derive the generated-source path
    /// 3. compiler subprocess (`BuildError::Compile` on non-zero exit)
    /// 4. load via `loader` (`BuildError::Load` on failure)
    pub async fn build<L: ModuleLoader>(
        &self,
        loader: &L,
        artifact: &Path,
        out_dir: &Path,
    ) -> Result<L::Handle, BuildError> {
        debug!(artifact = ?artifact, out_dir = ?out_dir, "build pipeline started");

        self.toolchain.generate(artifact, out_dir).await?;

        let generated = self.generated_source_path(artifact, out_dir);
        let module = self.module_path(artifact, out_dir);
        self.toolchain.compile(&generated, &module).await?;

        let handle = loader.load(&module)?;
        Ok(handle)
    }
}

/// `<out_dir>/<stem>.<ext>` for the given artifact. Only the final
/// extension is swapped; dots earlier in the name are part of the stem.
fn derived_path(artifact: &Path, out_dir: &Path, ext: &str) -> PathBuf {
    let mut name = artifact.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(ext);
    out_dir.join(name)
}
