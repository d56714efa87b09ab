//! Build orchestration: source collection, module discovery, compilation

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::modules::{DiscoveredModule, module_name, probe_module};
use super::toolchain::{
    CompileDiagnostic, CompileRequest, RustcToolchain, Severity, Toolchain,
};
use super::{BuildError, BuildResult};

/// Diagnostics from a completed compilation pass, partitioned by severity
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Error-severity diagnostics
    pub errors: Vec<CompileDiagnostic>,
    /// Warning-severity diagnostics
    pub warnings: Vec<CompileDiagnostic>,
}

impl BuildOutcome {
    /// Whether the compilation produced any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether the compilation produced any warnings
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Drives one package build from source directory to compiled module
#[derive(Debug, Default)]
pub struct BuildDriver<T = RustcToolchain> {
    toolchain: T,
}

impl BuildDriver<RustcToolchain> {
    /// Create a driver backed by the system rustc
    #[must_use]
    pub fn new() -> Self {
        Self {
            toolchain: RustcToolchain::new(),
        }
    }
}

impl<T: Toolchain> BuildDriver<T> {
    /// Create a driver backed by a specific toolchain
    pub fn with_toolchain(toolchain: T) -> Self {
        Self { toolchain }
    }

    /// Compile every source in `source_dir` into a single module at `output`.
    ///
    /// Modules already installed under `roots` are linked as references; a
    /// module whose name matches the output is skipped so a rebuild never
    /// links against its own previous artifact. The whole source set goes
    /// through one compilation pass and all diagnostics are returned,
    /// partitioned by severity.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DirectoryNotFound`] if `source_dir` does not
    /// exist, [`BuildError::EmptySourceSet`] if it holds no `.rs` files, or
    /// an I/O error if the toolchain cannot be invoked.
    pub fn build(
        &self,
        source_dir: &Path,
        roots: &[PathBuf],
        output: &Path,
    ) -> BuildResult<BuildOutcome> {
        if !source_dir.is_dir() {
            return Err(BuildError::DirectoryNotFound(source_dir.to_path_buf()));
        }

        let sources = collect_sources(source_dir)?;
        if sources.is_empty() {
            return Err(BuildError::EmptySourceSet(source_dir.to_path_buf()));
        }
        tracing::info!(
            count = sources.len(),
            dir = %source_dir.display(),
            "collected sources"
        );

        let references = discover_references(roots, output);
        tracing::debug!(count = references.len(), "discovered module references");

        let request = CompileRequest {
            sources,
            references,
            output: output.to_path_buf(),
        };
        let diagnostics = self.toolchain.compile(&request)?;

        let mut outcome = BuildOutcome::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => outcome.errors.push(diagnostic),
                Severity::Warning => outcome.warnings.push(diagnostic),
            }
        }
        Ok(outcome)
    }
}

/// Collect `.rs` files from the source directory, sorted by path for a
/// deterministic compilation order
fn collect_sources(source_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut sources: Vec<PathBuf> = std::fs::read_dir(source_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("rs")
        })
        .collect();
    sources.sort();
    Ok(sources)
}

/// Scan installation roots for compiled modules to link against.
///
/// Each root contributes its `lib` directory (and `bin` on Windows). Roots
/// are scanned in order and the first module found under a given name wins;
/// a module matching the output's own name is excluded. Infallible: bad
/// candidates and unreadable directories are skipped, never propagated.
fn discover_references(roots: &[PathBuf], output: &Path) -> Vec<DiscoveredModule> {
    let self_name = module_name(output);
    let mut seen: HashSet<String> = HashSet::new();
    let mut references = Vec::new();

    for root in roots {
        for dir in module_dirs(root) {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            let mut paths: Vec<PathBuf> =
                entries.filter_map(Result::ok).map(|e| e.path()).collect();
            paths.sort();

            for path in paths {
                if !path.is_file() {
                    continue;
                }
                let Some(module) = probe_module(&path) else {
                    continue;
                };
                if Some(&module.name) == self_name.as_ref() {
                    tracing::debug!(name = %module.name, "skipping self reference");
                    continue;
                }
                if seen.insert(module.name.clone()) {
                    references.push(module);
                }
            }
        }
    }
    references
}

fn module_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![root.join("lib")];
    if cfg!(windows) {
        dirs.push(root.join("bin"));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingToolchain {
        requests: RefCell<Vec<CompileRequest>>,
        diagnostics: Vec<CompileDiagnostic>,
    }

    impl RecordingToolchain {
        fn new(diagnostics: Vec<CompileDiagnostic>) -> Self {
            Self {
                requests: RefCell::new(Vec::new()),
                diagnostics,
            }
        }
    }

    impl Toolchain for &RecordingToolchain {
        fn compile(
            &self,
            request: &CompileRequest,
        ) -> std::io::Result<Vec<CompileDiagnostic>> {
            self.requests.borrow_mut().push(request.clone());
            Ok(self.diagnostics.clone())
        }
    }

    fn diagnostic(severity: Severity, message: &str) -> CompileDiagnostic {
        CompileDiagnostic {
            severity,
            unit: None,
            code: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_build_missing_directory() {
        let toolchain = RecordingToolchain::new(Vec::new());
        let driver = BuildDriver::with_toolchain(&toolchain);
        let err = driver
            .build(Path::new("/nonexistent/msgdir"), &[], Path::new("out.so"))
            .unwrap_err();
        assert!(matches!(err, BuildError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_build_empty_source_set() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();

        let toolchain = RecordingToolchain::new(Vec::new());
        let driver = BuildDriver::with_toolchain(&toolchain);
        let err = driver
            .build(dir.path(), &[], Path::new("out.so"))
            .unwrap_err();
        assert!(matches!(err, BuildError::EmptySourceSet(_)));
    }

    #[test]
    fn test_build_sorts_sources_and_partitions_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_msg.rs"), "pub struct B;").unwrap();
        std::fs::write(dir.path().join("a_msg.rs"), "pub struct A;").unwrap();

        let toolchain = RecordingToolchain::new(vec![
            diagnostic(Severity::Warning, "unused"),
            diagnostic(Severity::Error, "broken"),
        ]);
        let driver = BuildDriver::with_toolchain(&toolchain);
        let outcome = driver
            .build(dir.path(), &[], &dir.path().join("libout.so"))
            .unwrap();

        assert!(outcome.has_errors());
        assert!(outcome.has_warnings());
        assert_eq!(outcome.errors[0].message, "broken");
        assert_eq!(outcome.warnings[0].message, "unused");

        let requests = toolchain.requests.borrow();
        assert_eq!(requests.len(), 1);
        let names: Vec<_> = requests[0]
            .sources
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a_msg.rs", "b_msg.rs"]);
    }

    #[test]
    fn test_discover_references_filters_and_dedups() {
        let root_a = tempfile::tempdir().unwrap();
        let root_b = tempfile::tempdir().unwrap();
        let lib_a = root_a.path().join("lib");
        let lib_b = root_b.path().join("lib");
        std::fs::create_dir_all(&lib_a).unwrap();
        std::fs::create_dir_all(&lib_b).unwrap();

        let elf = b"\x7fELF module body";
        std::fs::write(lib_a.join("libgeometry_msgs.so"), elf).unwrap();
        std::fs::write(lib_a.join("libnav_msgs.so"), elf).unwrap();
        // Duplicate name in a later root loses to the first
        std::fs::write(lib_b.join("libgeometry_msgs.so"), elf).unwrap();
        // Same extension, wrong header
        std::fs::write(lib_a.join("libnotes.so"), b"plain text").unwrap();
        // Module matching the output name is excluded
        std::fs::write(lib_a.join("libtest_msgs.so"), elf).unwrap();

        let roots = vec![root_a.path().to_path_buf(), root_b.path().to_path_buf()];
        let references = discover_references(&roots, Path::new("/tmp/libtest_msgs.so"));

        let mut names: Vec<_> = references.iter().map(|m| m.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["geometry_msgs", "nav_msgs"]);

        let geometry = references
            .iter()
            .find(|m| m.name == "geometry_msgs")
            .unwrap();
        assert!(geometry.path.starts_with(root_a.path()));
    }

    #[test]
    fn test_build_passes_references_to_toolchain() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("point_msg.rs"), "pub struct Point;").unwrap();

        let root = tempfile::tempdir().unwrap();
        let lib = root.path().join("lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("libstd_msgs.so"), b"\x7fELF body").unwrap();

        let toolchain = RecordingToolchain::new(Vec::new());
        let driver = BuildDriver::with_toolchain(&toolchain);
        driver
            .build(
                dir.path(),
                &[root.path().to_path_buf()],
                &dir.path().join("libtest_msgs.so"),
            )
            .unwrap();

        let requests = toolchain.requests.borrow();
        assert_eq!(requests[0].references.len(), 1);
        assert_eq!(requests[0].references[0].name, "std_msgs");
    }
}
