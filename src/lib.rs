// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod registry;
pub mod reload;
pub mod scan;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::build::invoker::BuildInvoker;
use crate::build::loader::DlLoader;
use crate::build::toolchain::ProcessToolchain;
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::reload::manager::{ReloadManager, ReloadOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the subprocess toolchain and the `libloading`-backed module loader
/// - the reload manager and its timer loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let options = ReloadOptions::from_config(&cfg)?;
    let invoker = BuildInvoker::new(
        ProcessToolchain::from_config(&cfg.build),
        cfg.build.gen_ext.clone(),
        cfg.build.module_ext.clone(),
    );
    let mut manager = ReloadManager::new(options, invoker, DlLoader);

    if args.once {
        manager.run_cycle().await;
        return Ok(());
    }

    // Ctrl-C → graceful shutdown.
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = shutdown_tx.send(()).await;
    });

    manager.run(shutdown_rx).await
}

/// Simple dry-run output: print the resolved watch, build and reload settings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("modwatch dry-run");
    println!("  reload.interval_secs = {}", cfg.reload.interval_secs);
    println!("  reload.lock_release_secs = {}", cfg.reload.lock_release_secs);
    println!();

    println!("watch dirs ({}):", cfg.watch.dirs.len());
    for dir in &cfg.watch.dirs {
        println!("  - {}", dir.display());
    }
    println!("  source_ext: {}", cfg.watch.source_ext);
    if !cfg.watch.exclude.is_empty() {
        println!("  exclude: {:?}", cfg.watch.exclude);
    }
    println!();

    println!("build:");
    println!("  generator: {}", cfg.build.generator);
    println!("  compiler: {}", cfg.build.compiler);
    if !cfg.build.flags.is_empty() {
        println!("  flags: {:?}", cfg.build.flags);
    }
    if !cfg.build.include_dirs.is_empty() {
        println!("  include_dirs: {:?}", cfg.build.include_dirs);
    }
    if !cfg.build.extra_flags.is_empty() {
        println!("  extra_flags: {:?}", cfg.build.extra_flags);
    }
    if let Some(out) = &cfg.build.output_dir {
        println!("  output_dir: {}", out.display());
    }
    println!(
        "  pipeline: <name>.{} -> <name>.{} -> <name>.{}",
        cfg.watch.source_ext, cfg.build.gen_ext, cfg.build.module_ext
    );
}
