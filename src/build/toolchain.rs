// src/build/toolchain.rs

use std::future::Future;
use std::path::Path;
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::model::BuildSection;
use crate::errors::BuildError;

/// Pluggable build toolchain.
///
/// Production code uses [`ProcessToolchain`]; tests can provide their own
/// implementation that records invocations without spawning processes.
pub trait Toolchain {
    /// Run the external generator for `artifact`, emitting generated source
    /// into `out_dir`. A non-zero exit is [`BuildError::Generation`].
    fn generate(
        &self,
        artifact: &Path,
        out_dir: &Path,
    ) -> impl Future<Output = Result<(), BuildError>> + Send;

    /// Compile `generated` into the shared module at `module`. A non-zero
    /// exit is [`BuildError::Compile`].
    fn compile(
        &self,
        generated: &Path,
        module: &Path,
    ) -> impl Future<Output = Result<(), BuildError>> + Send;
}

/// Real toolchain backed by external processes.
///
/// Invocations follow the fixed shapes from the config:
/// `<generator> <artifact> -o <out_dir>` and
/// `<compiler> <generated> <flags> -I<dir>... -shared -fPIC <extra_flags>
/// -o <module>`. stdout/stderr are inherited; the tools do their own logging.
#[derive(Debug, Clone)]
pub struct ProcessToolchain {
    generator: String,
    compiler: String,
    flags: Vec<String>,
    include_dirs: Vec<String>,
    extra_flags: Vec<String>,
}

impl ProcessToolchain {
    pub fn from_config(build: &BuildSection) -> Self {
        Self {
            generator: build.generator.clone(),
            compiler: build.compiler.clone(),
            flags: build.flags.clone(),
            include_dirs: build.include_dirs.clone(),
            extra_flags: build.extra_flags.clone(),
        }
    }
}

impl Toolchain for ProcessToolchain {
    async fn generate(&self, artifact: &Path, out_dir: &Path) -> Result<(), BuildError> {
        let mut cmd = Command::new(&self.generator);
        cmd.arg(artifact).arg("-o").arg(out_dir);

        let status = run_tool(&self.generator, cmd).await?;
        if !status.success() {
            return Err(BuildError::Generation {
                artifact: artifact.to_path_buf(),
                status: status.code().unwrap_or(-1),
            });
        }

        debug!(artifact = ?artifact, "generated source");
        Ok(())
    }

    async fn compile(&self, generated: &Path, module: &Path) -> Result<(), BuildError> {
        let mut cmd = Command::new(&self.compiler);
        cmd.arg(generated);
        cmd.args(&self.flags);
        for dir in &self.include_dirs {
            cmd.arg(format!("-I{dir}"));
        }
        cmd.arg("-shared").arg("-fPIC");
        cmd.args(&self.extra_flags);
        cmd.arg("-o").arg(module);

        let status = run_tool(&self.compiler, cmd).await?;
        if !status.success() {
            return Err(BuildError::Compile {
                generated: generated.to_path_buf(),
                status: status.code().unwrap_or(-1),
            });
        }

        info!(module = ?module, "compiled shared module");
        Ok(())
    }
}

/// Spawn a tool and wait for it to exit. There is no timeout: once invoked,
/// a tool runs to completion.
async fn run_tool(tool: &str, mut cmd: Command) -> Result<ExitStatus, BuildError> {
    debug!(tool, command = ?cmd.as_std(), "invoking external tool");
    cmd.status().await.map_err(|source| BuildError::Spawn {
        tool: tool.to_string(),
        source,
    })
}
