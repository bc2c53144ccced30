// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// dirs = ["views"]
/// source_ext = "csp"
///
/// [build]
/// generator = "viewc"
/// compiler = "g++"
/// flags = ["-std=c++17", "-O2"]
/// include_dirs = ["include"]
///
/// [reload]
/// interval_secs = 5.0
/// lock_release_secs = 3.5
/// ```
///
/// All sections are optional in the TOML and have defaults; `[watch].dirs`
/// and `[build].generator` must still end up non-empty, which is enforced by
/// validation rather than deserialization.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Watched directories and the source extension, from `[watch]`.
    #[serde(default)]
    pub watch: WatchSection,

    /// External toolchain settings from `[build]`.
    #[serde(default)]
    pub build: BuildSection,

    /// Timer cadences from `[reload]`.
    #[serde(default)]
    pub reload: ReloadSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Ordered list of directories scanned each cycle. Direct children only;
    /// the scan does not recurse.
    #[serde(default)]
    pub dirs: Vec<PathBuf>,

    /// Extension of template sources that trigger rebuilds, without the dot.
    #[serde(default = "default_source_ext")]
    pub source_ext: String,

    /// Filename globs to skip even when the extension matches.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_source_ext() -> String {
    "csp".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            source_ext: default_source_ext(),
            exclude: Vec::new(),
        }
    }
}

/// `[build]` section.
///
/// The generator is invoked as `<generator> <artifact> -o <output-dir>`; the
/// compiler as `<compiler> <generated> <flags> -I<dir>... -shared -fPIC
/// <extra_flags> -o <module>`.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// External tool that turns one template source into compilable source.
    #[serde(default)]
    pub generator: String,

    /// Compiler that produces the loadable module from generated source.
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Fixed compiler flags, passed through verbatim.
    #[serde(default)]
    pub flags: Vec<String>,

    /// Include directories, each emitted as `-I<dir>`.
    #[serde(default)]
    pub include_dirs: Vec<String>,

    /// Flags appended after `-shared -fPIC`.
    #[serde(default = "default_extra_flags")]
    pub extra_flags: Vec<String>,

    /// Where generated sources and modules land.
    ///
    /// If `None`, both are written next to the artifact itself.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Extension of the generated source, without the dot.
    #[serde(default = "default_gen_ext")]
    pub gen_ext: String,

    /// Extension of the loadable module, without the dot.
    #[serde(default = "default_module_ext")]
    pub module_ext: String,
}

fn default_compiler() -> String {
    "g++".to_string()
}

fn default_extra_flags() -> Vec<String> {
    vec!["--no-gnu-unique".to_string()]
}

fn default_gen_ext() -> String {
    "cc".to_string()
}

fn default_module_ext() -> String {
    "so".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            generator: String::new(),
            compiler: default_compiler(),
            flags: Vec::new(),
            include_dirs: Vec::new(),
            extra_flags: default_extra_flags(),
            output_dir: None,
            gen_ext: default_gen_ext(),
            module_ext: default_module_ext(),
        }
    }
}

/// `[reload]` section.
///
/// Both values are fixed constants of the configuration: the lock-release
/// delay is a heuristic upper bound on toolchain settling time, not a
/// synchronization signal from the build step.
#[derive(Debug, Clone, Deserialize)]
pub struct ReloadSection {
    /// Seconds between reload cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,

    /// Grace delay in seconds before an artifact's lock marker is removed
    /// after a build.
    #[serde(default = "default_lock_release_secs")]
    pub lock_release_secs: f64,
}

fn default_interval_secs() -> f64 {
    5.0
}

fn default_lock_release_secs() -> f64 {
    3.5
}

impl Default for ReloadSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            lock_release_secs: default_lock_release_secs(),
        }
    }
}
