//! High-level operations composing the parser, generator, and build driver
//!
//! These are the two entry points a packaging pipeline calls: generate Rust
//! source from one message definition, and compile a directory of generated
//! sources into a loadable module.

use std::env;
use std::path::{Path, PathBuf};

use crate::build::{BuildDriver, BuildOutcome, BuildResult};
use crate::generator::{CodeGenerator, GeneratorResult, ModelCatalog};
use crate::msg::parse_message_file;

/// Environment variable listing installed package roots
pub const AMENT_PREFIX_PATH: &str = "AMENT_PREFIX_PATH";

/// Parse one message definition file and write the generated Rust source.
///
/// The output filename is `{Name}_{msg|srv}.rs` depending on the message
/// role; the written path is returned. Service definition files (`.srv`)
/// are skipped and yield `Ok(None)`, matching a pipeline that feeds every
/// interface file through without pre-filtering.
///
/// Sibling definitions in the same directory are parsed into the resolution
/// catalog first, so same-package composite fields resolve. A sibling that
/// fails to parse is skipped with a warning; it only matters if the target
/// actually references it, and then generation fails with an unresolved
/// type error naming it.
///
/// # Errors
///
/// Returns an error when the definition fails to parse, a composite field
/// type cannot be resolved, or the output cannot be written.
pub fn generate_from_file(
    definition_path: &Path,
    package: &str,
    output_dir: &Path,
) -> GeneratorResult<Option<PathBuf>> {
    if definition_path.extension().and_then(|e| e.to_str()) == Some("srv") {
        tracing::debug!(path = %definition_path.display(), "skipping service definition file");
        return Ok(None);
    }

    let model = parse_message_file(package, definition_path)?;
    let catalog = sibling_catalog(package, definition_path);

    let code = CodeGenerator::new().generate(&model, &catalog)?;

    std::fs::create_dir_all(output_dir)?;
    let output_path =
        output_dir.join(format!("{}_{}.rs", model.name, model.role.file_suffix()));
    std::fs::write(&output_path, code)?;
    tracing::info!(
        message = %model.full_name(),
        output = %output_path.display(),
        "generated message source"
    );
    Ok(Some(output_path))
}

/// Parse every sibling `.msg` definition into a resolution catalog
fn sibling_catalog(package: &str, definition_path: &Path) -> ModelCatalog {
    let mut catalog = ModelCatalog::new();
    let Some(dir) = definition_path.parent() else {
        return catalog;
    };
    let Ok(entries) = std::fs::read_dir(dir) else {
        return catalog;
    };

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("msg") {
            continue;
        }
        match parse_message_file(package, &path) {
            Ok(model) => catalog.insert(model),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "skipping unparseable sibling definition"
                );
            }
        }
    }
    catalog
}

/// Compile a directory of generated sources into a module at `output`.
///
/// Installed packages found under the roots named by `AMENT_PREFIX_PATH`
/// are linked as references. Compile diagnostics are returned as data in
/// the outcome rather than failing the call; a caller deciding process exit
/// status should treat only [`crate::BuildError`] as fatal.
///
/// # Errors
///
/// Returns an error when the source directory is missing or empty, or the
/// toolchain cannot be invoked.
pub fn compile_package(source_dir: &Path, output: &Path) -> BuildResult<BuildOutcome> {
    let roots = ament_search_roots();
    BuildDriver::new().build(source_dir, &roots, output)
}

/// Installation roots from `AMENT_PREFIX_PATH`, in listed order.
///
/// The separator is `;` on Windows and `:` elsewhere. A missing variable
/// yields no roots; generation-only pipelines run without an installation.
#[must_use]
pub fn ament_search_roots() -> Vec<PathBuf> {
    let Ok(raw) = env::var(AMENT_PREFIX_PATH) else {
        tracing::warn!("{AMENT_PREFIX_PATH} is not set, no installed packages will be linked");
        return Vec::new();
    };
    let separator = if cfg!(windows) { ';' } else { ':' };
    raw.split(separator)
        .filter(|part| !part.is_empty())
        .map(PathBuf::from)
        .collect()
}
