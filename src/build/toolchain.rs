//! Toolchain abstraction and the rustc-backed implementation

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use heck::ToSnakeCase;
use serde::Deserialize;

use super::modules::{DiscoveredModule, module_name};

/// One compilation pass: every source in the set, compiled together
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Source files, in deterministic order
    pub sources: Vec<PathBuf>,
    /// Previously compiled modules linked as external references
    pub references: Vec<DiscoveredModule>,
    /// Path of the compiled artifact to produce
    pub output: PathBuf,
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Compilation failed for the affected unit
    Error,
    /// Compilation succeeded but the unit deserves attention
    Warning,
}

/// A single diagnostic reported by the toolchain, kept as data
#[derive(Debug, Clone)]
pub struct CompileDiagnostic {
    /// Severity of the diagnostic
    pub severity: Severity,
    /// Source file the diagnostic points at, when known
    pub unit: Option<String>,
    /// Toolchain-specific diagnostic code, when the toolchain assigns one
    pub code: Option<String>,
    /// Human-readable diagnostic text
    pub message: String,
}

/// A compiler capable of turning a source set into a loadable module
///
/// The build driver is generic over this trait so tests can substitute a
/// recording implementation.
pub trait Toolchain {
    /// Compile the request, returning all diagnostics produced.
    ///
    /// A failed compilation is expressed through error-severity diagnostics,
    /// not through `Err`; the `Err` path is for failures to invoke the
    /// toolchain at all.
    fn compile(&self, request: &CompileRequest) -> std::io::Result<Vec<CompileDiagnostic>>;
}

/// `rustc`-backed toolchain producing a dynamic library
///
/// The source set is wrapped in a synthesized crate root that declares each
/// file as a `#[path]` module and re-exports its items, so units in the same
/// set can reference each other through `crate::`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustcToolchain;

impl RustcToolchain {
    /// Create a new rustc toolchain
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn crate_root_source(request: &CompileRequest) -> std::io::Result<String> {
        let mut source = String::from("#![allow(unsafe_code)]\n\n");
        for path in &request.sources {
            let absolute = path.canonicalize()?;
            let stem = absolute
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unit");
            let module = stem.to_snake_case();
            source.push_str(&format!(
                "#[path = {:?}]\npub mod {module};\npub use {module}::*;\n",
                absolute.display()
            ));
        }
        Ok(source)
    }
}

impl Toolchain for RustcToolchain {
    fn compile(&self, request: &CompileRequest) -> std::io::Result<Vec<CompileDiagnostic>> {
        let staging = tempfile::tempdir()?;
        let root = staging.path().join("lib.rs");
        let mut file = std::fs::File::create(&root)?;
        file.write_all(Self::crate_root_source(request)?.as_bytes())?;
        drop(file);

        let crate_name = module_name(&request.output)
            .unwrap_or_else(|| "generated".to_string())
            .replace('-', "_");

        let mut command = Command::new("rustc");
        command
            .arg("--edition=2021")
            .arg("--crate-type=dylib")
            .arg("--crate-name")
            .arg(&crate_name)
            .arg("--error-format=json")
            .arg("-A")
            .arg("dead_code")
            .arg("-o")
            .arg(&request.output)
            .arg(&root);
        for module in &request.references {
            if let Some(dir) = module.path.parent() {
                command.arg("-L").arg(dir);
            }
            command
                .arg("--extern")
                .arg(format!("{}={}", module.name, module.path.display()));
        }

        tracing::debug!(
            crate_name,
            sources = request.sources.len(),
            references = request.references.len(),
            "invoking rustc"
        );
        let output = command.output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(parse_diagnostics(&stderr))
    }
}

#[derive(Deserialize)]
struct RustcMessage {
    message: String,
    code: Option<RustcCode>,
    level: String,
    #[serde(default)]
    spans: Vec<RustcSpan>,
}

#[derive(Deserialize)]
struct RustcCode {
    code: String,
}

#[derive(Deserialize)]
struct RustcSpan {
    file_name: String,
}

/// Decode rustc's JSON diagnostic stream, one message per line.
///
/// Lines that are not JSON diagnostics (linker noise, ICE banners) are
/// skipped, as are informational levels like `note` and `help`.
fn parse_diagnostics(stderr: &str) -> Vec<CompileDiagnostic> {
    stderr
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str::<RustcMessage>(line).ok())
        .filter_map(|message| {
            let severity = match message.level.as_str() {
                level if level.starts_with("error") => Severity::Error,
                "warning" => Severity::Warning,
                _ => return None,
            };
            Some(CompileDiagnostic {
                severity,
                unit: message.spans.first().map(|span| span.file_name.clone()),
                code: message.code.map(|code| code.code),
                message: message.message,
            })
        })
        .collect()
}
