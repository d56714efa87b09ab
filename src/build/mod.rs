//! Build driver: compiles a directory of generated sources into a module
//!
//! The driver collects the source set, discovers previously compiled modules
//! under a set of installation roots, and hands everything to a [`Toolchain`]
//! in a single compilation pass. Diagnostics come back as data; the driver
//! never aborts on a compile error.

mod driver;
mod modules;
mod toolchain;

pub use driver::{BuildDriver, BuildOutcome};
pub use modules::{DLL_PREFIX, DiscoveredModule, module_name, probe_module};
pub use toolchain::{
    CompileDiagnostic, CompileRequest, RustcToolchain, Severity, Toolchain,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent a build from starting
///
/// Diagnostics produced by the toolchain itself are not errors; they are
/// reported through [`BuildOutcome`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The requested source directory does not exist
    #[error("source directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The source directory contains no compilable sources
    #[error("no source files found in {0}")]
    EmptySourceSet(PathBuf),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;
