// src/config/validate.rs

use anyhow::{Context, Result, anyhow};
use globset::Glob;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one watch directory
/// - the generator and compiler tool names are non-empty
/// - all three extensions are non-empty and carry no leading dot
/// - `interval_secs` is positive and `lock_release_secs` non-negative
/// - exclude patterns compile as globs
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_watch_dirs(cfg)?;
    validate_tools(cfg)?;
    validate_extensions(cfg)?;
    validate_timings(cfg)?;
    validate_excludes(cfg)?;
    Ok(())
}

fn ensure_watch_dirs(cfg: &ConfigFile) -> Result<()> {
    if cfg.watch.dirs.is_empty() {
        return Err(anyhow!(
            "config must list at least one directory in [watch].dirs"
        ));
    }
    Ok(())
}

fn validate_tools(cfg: &ConfigFile) -> Result<()> {
    if cfg.build.generator.trim().is_empty() {
        return Err(anyhow!("[build].generator must be set"));
    }
    if cfg.build.compiler.trim().is_empty() {
        return Err(anyhow!("[build].compiler must be set"));
    }
    Ok(())
}

fn validate_extensions(cfg: &ConfigFile) -> Result<()> {
    for (field, ext) in [
        ("[watch].source_ext", &cfg.watch.source_ext),
        ("[build].gen_ext", &cfg.build.gen_ext),
        ("[build].module_ext", &cfg.build.module_ext),
    ] {
        if ext.is_empty() {
            return Err(anyhow!("{field} must not be empty"));
        }
        if ext.starts_with('.') {
            return Err(anyhow!(
                "{field} must not start with a dot (use \"{}\" instead of \"{ext}\")",
                ext.trim_start_matches('.')
            ));
        }
    }
    Ok(())
}

fn validate_timings(cfg: &ConfigFile) -> Result<()> {
    let interval = cfg.reload.interval_secs;
    if !interval.is_finite() || interval <= 0.0 {
        return Err(anyhow!(
            "[reload].interval_secs must be a positive number (got {interval})"
        ));
    }

    let release = cfg.reload.lock_release_secs;
    if !release.is_finite() || release < 0.0 {
        return Err(anyhow!(
            "[reload].lock_release_secs must be non-negative (got {release})"
        ));
    }

    Ok(())
}

fn validate_excludes(cfg: &ConfigFile) -> Result<()> {
    for pat in &cfg.watch.exclude {
        Glob::new(pat).with_context(|| format!("invalid [watch].exclude pattern: {pat}"))?;
    }
    Ok(())
}
