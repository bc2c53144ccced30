// src/build/mod.rs

//! Build pipeline: external toolchain invocation and module loading.
//!
//! - [`toolchain`] abstracts the generator/compiler subprocesses behind a
//!   trait so tests can substitute a scripted implementation.
//! - [`loader`] abstracts the dynamic-loading facility the same way;
//!   production uses `libloading`.
//! - [`invoker`] runs the generate → compile → load sequence for one
//!   artifact and derives the intermediate paths.

pub mod invoker;
pub mod loader;
pub mod toolchain;

pub use invoker::BuildInvoker;
pub use loader::{DlLoader, ModuleLoader};
pub use toolchain::{ProcessToolchain, Toolchain};
