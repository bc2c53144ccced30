// src/reload/manager.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::build::invoker::BuildInvoker;
use crate::build::loader::ModuleLoader;
use crate::build::toolchain::Toolchain;
use crate::config::model::ConfigFile;
use crate::registry::ArtifactRegistry;
use crate::reload::lock;
use crate::scan::scanner::{ScanEntry, scan_dir};

/// Options lifted out of the validated config.
#[derive(Debug, Clone)]
pub struct ReloadOptions {
    /// Ordered watch directories, scanned in order every cycle.
    pub dirs: Vec<PathBuf>,
    /// Extension (without dot) marking template-source candidates.
    pub source_ext: String,
    /// Compiled filename globs to skip, if any were configured.
    pub exclude: Option<GlobSet>,
    /// Where build output lands; `None` means next to each artifact.
    pub output_dir: Option<PathBuf>,
    /// Cadence of the reload cycle.
    pub interval: Duration,
    /// Grace delay before a lock marker is removed after a build.
    pub lock_release_delay: Duration,
}

impl ReloadOptions {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let exclude = if cfg.watch.exclude.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pat in &cfg.watch.exclude {
                let glob = Glob::new(pat)
                    .with_context(|| format!("invalid [watch].exclude pattern: {pat}"))?;
                builder.add(glob);
            }
            Some(builder.build()?)
        };

        Ok(Self {
            dirs: cfg.watch.dirs.clone(),
            source_ext: cfg.watch.source_ext.clone(),
            exclude,
            output_dir: cfg.build.output_dir.clone(),
            interval: Duration::from_secs_f64(cfg.reload.interval_secs),
            lock_release_delay: Duration::from_secs_f64(cfg.reload.lock_release_secs),
        })
    }
}

/// The orchestrating component.
///
/// On every interval tick the manager runs one cycle: scan each configured
/// directory, decide which artifacts are new or modified, release the stale
/// module handle, rebuild through the [`BuildInvoker`], install the fresh
/// handle in the [`ArtifactRegistry`], and schedule removal of the artifact's
/// lock marker after the configured grace delay.
///
/// Every build is awaited to completion inside the cycle, so no two builds
/// ever overlap; the filesystem lock marker only guards against *other*
/// processes touching the same artifact. All cycle errors are logged and
/// scoped to one directory or one artifact; none abort the loop.
pub struct ReloadManager<T, L: ModuleLoader> {
    options: ReloadOptions,
    invoker: BuildInvoker<T>,
    loader: L,
    registry: ArtifactRegistry<L::Handle>,
}

impl<T: Toolchain, L: ModuleLoader> ReloadManager<T, L> {
    pub fn new(options: ReloadOptions, invoker: BuildInvoker<T>, loader: L) -> Self {
        Self {
            options,
            invoker,
            loader,
            registry: ArtifactRegistry::new(),
        }
    }

    /// Read access to the registry, for introspection in tests and dry runs.
    pub fn registry(&self) -> &ArtifactRegistry<L::Handle> {
        &self.registry
    }

    /// Periodic loop: one cycle per interval tick until `shutdown_rx` yields.
    ///
    /// The first tick fires immediately, so artifacts already present at
    /// startup are compiled and loaded without waiting a full interval.
    pub async fn run(mut self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        let mut ticker = time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(dirs = ?self.options.dirs, "reload manager started");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_cycle().await,
                _ = shutdown_rx.recv() => {
                    info!("shutdown requested, stopping reload manager");
                    return Ok(());
                }
            }
        }
    }

    /// One full scan/build/swap pass over every configured directory.
    pub async fn run_cycle(&mut self) {
        debug!("reload cycle started");
        let dirs = self.options.dirs.clone();
        for dir in dirs {
            self.scan_directory(&dir).await;
        }
        debug!("reload cycle finished");
    }

    /// Scan one directory and process every candidate entry in it.
    ///
    /// Enumeration failures are directory-scoped: an open failure skips the
    /// directory, a mid-scan entry failure abandons the remainder of the
    /// listing but still processes what was already enumerated. Other
    /// directories in the same cycle are unaffected either way.
    async fn scan_directory(&mut self, dir: &Path) {
        let entries = match scan_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                error!(dir = ?dir, error = %err, "cannot enumerate watch directory");
                return;
            }
        };

        let mut files: Vec<ScanEntry> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => files.push(entry),
                Err(err) => {
                    error!(dir = ?dir, error = %err, "scan aborted");
                    break;
                }
            }
        }

        // Enumeration order is filesystem-defined; sort for deterministic
        // processing and logs.
        files.sort_by(|a, b| a.path.cmp(&b.path));

        for entry in files {
            self.process_entry(entry).await;
        }
    }

    /// Decide and, if needed, rebuild one scanned entry.
    async fn process_entry(&mut self, entry: ScanEntry) {
        let ScanEntry { path, modified } = entry;

        if !has_extension(&path, &self.options.source_ext) {
            return;
        }

        if self.is_excluded(&path) {
            debug!(artifact = ?path, "skipped by exclude pattern");
            return;
        }

        if lock::is_locked(&path) {
            debug!(artifact = ?path, "lock marker present, skipping");
            return;
        }

        if !self.registry.is_stale(&path, modified) {
            return;
        }

        info!(artifact = ?path, "stale artifact detected");

        // Release the previous module before building its replacement.
        // Best-effort: an unload failure must not block the rebuild.
        if let Some(record) = self.registry.take_loaded(&path) {
            match self.loader.unload(record.handle) {
                Ok(()) => debug!(artifact = ?path, "released previous module handle"),
                Err(err) => {
                    warn!(artifact = ?path, error = %err, "failed to release previous module handle");
                }
            }
        }

        if let Err(err) = lock::create_lock(&path) {
            error!(artifact = ?path, error = %err, "cannot create lock marker");
            return;
        }

        let out_dir = self.output_dir_for(&path);

        match self.invoker.build(&self.loader, &path, &out_dir).await {
            Ok(handle) => {
                self.registry.install(path.clone(), handle, modified);
                info!(artifact = ?path, "module reloaded");
            }
            Err(err) => {
                // No load record on failure; the failed mark keeps this exact
                // modification from being retried every tick.
                error!(artifact = ?path, error = %err, "build failed");
                self.registry.mark_failed(path.clone(), modified);
            }
        }

        self.schedule_lock_release(path);
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(exclude) = &self.options.exclude else {
            return false;
        };
        path.file_name().is_some_and(|name| exclude.is_match(name))
    }

    fn output_dir_for(&self, artifact: &Path) -> PathBuf {
        match &self.options.output_dir {
            Some(dir) => dir.clone(),
            None => artifact
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Remove the artifact's lock marker after the configured grace delay,
    /// on an independent timer task. The delay is long enough for the
    /// toolchain's output to settle on disk; until it elapses, further scans
    /// of the artifact are skipped by the marker check.
    fn schedule_lock_release(&self, artifact: PathBuf) {
        let delay = self.options.lock_release_delay;
        tokio::spawn(async move {
            time::sleep(delay).await;
            debug!(artifact = ?artifact, "removing lock marker");
            if let Err(err) = lock::remove_lock(&artifact) {
                warn!(artifact = ?artifact, error = %err, "failed to remove lock marker");
            }
        });
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}
