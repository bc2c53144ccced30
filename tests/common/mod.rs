// tests/common/mod.rs

//! Shared test doubles: a scripted toolchain and an in-memory module loader,
//! so reload cycles run without spawning processes or touching the dynamic
//! loader. Both fakes append to one shared event log so tests can assert on
//! call ordering across the whole pipeline.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use modwatch::build::invoker::BuildInvoker;
use modwatch::build::loader::ModuleLoader;
use modwatch::build::toolchain::Toolchain;
use modwatch::errors::{BuildError, LoadError};
use modwatch::reload::manager::{ReloadManager, ReloadOptions};

pub type EventLog = Arc<Mutex<Vec<String>>>;

/// One fixture per test: hands out connected fakes and reads the event log.
pub struct Fixture {
    events: EventLog,
    pub toolchain: FakeToolchain,
    pub loader: FakeLoader,
}

impl Fixture {
    pub fn new() -> Self {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let toolchain = FakeToolchain {
            events: events.clone(),
            fail_generate_on: Arc::new(Mutex::new(None)),
            fail_compile_on: Arc::new(Mutex::new(None)),
        };
        let loader = FakeLoader {
            events: events.clone(),
            next_id: Arc::new(AtomicU64::new(0)),
            fail_load_on: Arc::new(Mutex::new(None)),
        };
        Self {
            events,
            toolchain,
            loader,
        }
    }

    /// Snapshot of everything the fakes did, in call order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Number of logged events starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    /// Script the generator to fail for artifacts with the given file stem.
    pub fn fail_generate_on(&self, stem: &str) {
        *self.toolchain.fail_generate_on.lock().unwrap() = Some(stem.to_string());
    }

    /// Script the compiler to fail for generated sources with the given stem.
    pub fn fail_compile_on(&self, stem: &str) {
        *self.toolchain.fail_compile_on.lock().unwrap() = Some(stem.to_string());
    }

    /// Script the loader to fail for modules with the given stem.
    pub fn fail_load_on(&self, stem: &str) {
        *self.loader.fail_load_on.lock().unwrap() = Some(stem.to_string());
    }
}

/// Toolchain that records invocations instead of spawning processes.
#[derive(Clone)]
pub struct FakeToolchain {
    events: EventLog,
    fail_generate_on: Arc<Mutex<Option<String>>>,
    fail_compile_on: Arc<Mutex<Option<String>>>,
}

impl Toolchain for FakeToolchain {
    async fn generate(&self, artifact: &Path, _out_dir: &Path) -> Result<(), BuildError> {
        if matches_stem(&self.fail_generate_on, artifact) {
            self.events
                .lock()
                .unwrap()
                .push(format!("generate-fail {}", file_name(artifact)));
            return Err(BuildError::Generation {
                artifact: artifact.to_path_buf(),
                status: 1,
            });
        }

        self.events
            .lock()
            .unwrap()
            .push(format!("generate {}", file_name(artifact)));
        Ok(())
    }

    async fn compile(&self, generated: &Path, module: &Path) -> Result<(), BuildError> {
        if matches_stem(&self.fail_compile_on, generated) {
            self.events
                .lock()
                .unwrap()
                .push(format!("compile-fail {}", file_name(generated)));
            return Err(BuildError::Compile {
                generated: generated.to_path_buf(),
                status: 1,
            });
        }

        self.events.lock().unwrap().push(format!(
            "compile {} -> {}",
            file_name(generated),
            file_name(module)
        ));
        Ok(())
    }
}

/// Loader that hands out counter handles instead of calling the platform
/// loading facility.
#[derive(Clone)]
pub struct FakeLoader {
    events: EventLog,
    next_id: Arc<AtomicU64>,
    fail_load_on: Arc<Mutex<Option<String>>>,
}

impl ModuleLoader for FakeLoader {
    type Handle = u64;

    fn load(&self, path: &Path) -> Result<u64, LoadError> {
        if matches_stem(&self.fail_load_on, path) {
            self.events
                .lock()
                .unwrap()
                .push(format!("load-fail {}", file_name(path)));
            return Err(LoadError::Load {
                path: path.to_path_buf(),
                detail: "scripted load failure".to_string(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.events
            .lock()
            .unwrap()
            .push(format!("load {} #{id}", file_name(path)));
        Ok(id)
    }

    fn unload(&self, handle: u64) -> Result<(), LoadError> {
        self.events.lock().unwrap().push(format!("unload #{handle}"));
        Ok(())
    }
}

/// Default reload options for a single watch directory, with a short lock
/// release delay suitable for paused-clock tests.
pub fn options(dir: &Path) -> ReloadOptions {
    ReloadOptions {
        dirs: vec![dir.to_path_buf()],
        source_ext: "csp".to_string(),
        exclude: None,
        output_dir: None,
        interval: Duration::from_secs(5),
        lock_release_delay: Duration::from_millis(200),
    }
}

pub fn manager_from(
    options: ReloadOptions,
    fixture: &Fixture,
) -> ReloadManager<FakeToolchain, FakeLoader> {
    ReloadManager::new(
        options,
        BuildInvoker::new(fixture.toolchain.clone(), "cc", "so"),
        fixture.loader.clone(),
    )
}

pub fn manager(dir: &Path, fixture: &Fixture) -> ReloadManager<FakeToolchain, FakeLoader> {
    manager_from(options(dir), fixture)
}

/// Push a file's modification time strictly ahead of its current value.
pub fn bump_mtime(path: &Path, ahead: Duration) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + ahead).unwrap();
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn matches_stem(scripted: &Mutex<Option<String>>, path: &Path) -> bool {
    let scripted = scripted.lock().unwrap();
    match (scripted.as_deref(), path.file_stem()) {
        (Some(stem), Some(actual)) => actual.to_string_lossy() == stem,
        _ => false,
    }
}
