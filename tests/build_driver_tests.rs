//! Build driver tests using a recording toolchain and fake module trees

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ros2msgc::build::{
    BuildDriver, BuildError, CompileDiagnostic, CompileRequest, Severity, Toolchain,
};

struct RecordingToolchain {
    requests: Mutex<Vec<CompileRequest>>,
    diagnostics: Vec<CompileDiagnostic>,
}

impl RecordingToolchain {
    fn new(diagnostics: Vec<CompileDiagnostic>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            diagnostics,
        }
    }

    fn last_request(&self) -> CompileRequest {
        self.requests.lock().unwrap().last().unwrap().clone()
    }
}

impl Toolchain for &RecordingToolchain {
    fn compile(&self, request: &CompileRequest) -> std::io::Result<Vec<CompileDiagnostic>> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.diagnostics.clone())
    }
}

const ELF_HEADER: &[u8] = b"\x7fELF fake module body";

fn install_root(modules: &[&str]) -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let lib = root.path().join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    for name in modules {
        std::fs::write(lib.join(format!("lib{name}.so")), ELF_HEADER).unwrap();
    }
    root
}

fn source_dir(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        std::fs::write(dir.path().join(name), "pub struct Unit;\n").unwrap();
    }
    dir
}

#[test]
fn missing_source_directory_fails_before_compiling() {
    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);

    let err = driver
        .build(
            Path::new("/nonexistent/generated"),
            &[],
            Path::new("libtest_msgs.so"),
        )
        .unwrap_err();

    assert!(matches!(err, BuildError::DirectoryNotFound(_)));
    assert!(toolchain.requests.lock().unwrap().is_empty());
}

#[test]
fn directory_without_rust_sources_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Point.msg"), "float64 x\n").unwrap();

    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);
    let err = driver
        .build(dir.path(), &[], Path::new("libtest_msgs.so"))
        .unwrap_err();

    match err {
        BuildError::EmptySourceSet(path) => assert_eq!(path, dir.path()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sources_are_compiled_in_one_sorted_pass() {
    let dir = source_dir(&["pose_msg.rs", "point_msg.rs", "twist_msg.rs"]);
    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);

    let outcome = driver
        .build(dir.path(), &[], &dir.path().join("libtest_msgs.so"))
        .unwrap();
    assert!(!outcome.has_errors());
    assert!(!outcome.has_warnings());

    let request = toolchain.last_request();
    let names: Vec<String> = request
        .sources
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["point_msg.rs", "pose_msg.rs", "twist_msg.rs"]);
}

#[test]
fn installed_modules_become_references() {
    let dir = source_dir(&["plan_msg.rs"]);
    let root = install_root(&["geometry_msgs", "std_msgs"]);

    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);
    driver
        .build(
            dir.path(),
            &[root.path().to_path_buf()],
            &dir.path().join("libnav_msgs.so"),
        )
        .unwrap();

    let request = toolchain.last_request();
    let mut names: Vec<String> = request
        .references
        .iter()
        .map(|m| m.name.clone())
        .collect();
    names.sort();
    assert_eq!(names, vec!["geometry_msgs", "std_msgs"]);
}

#[test]
fn output_module_is_excluded_from_its_own_references() {
    let dir = source_dir(&["plan_msg.rs"]);
    let root = install_root(&["geometry_msgs", "nav_msgs"]);

    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);
    driver
        .build(
            dir.path(),
            &[root.path().to_path_buf()],
            &dir.path().join("libnav_msgs.so"),
        )
        .unwrap();

    let request = toolchain.last_request();
    let names: Vec<&str> = request.references.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["geometry_msgs"]);
}

#[test]
fn first_root_wins_for_duplicate_module_names() {
    let dir = source_dir(&["plan_msg.rs"]);
    let first = install_root(&["geometry_msgs"]);
    let second = install_root(&["geometry_msgs"]);

    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);
    driver
        .build(
            dir.path(),
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            &dir.path().join("libnav_msgs.so"),
        )
        .unwrap();

    let request = toolchain.last_request();
    assert_eq!(request.references.len(), 1);
    assert!(request.references[0].path.starts_with(first.path()));
}

#[test]
fn non_module_files_in_lib_are_ignored() {
    let dir = source_dir(&["plan_msg.rs"]);
    let root = install_root(&["geometry_msgs"]);
    let lib = root.path().join("lib");
    std::fs::write(lib.join("libREADME.so"), b"not a module at all").unwrap();
    std::fs::write(lib.join("config.yaml"), b"key: value").unwrap();

    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);
    driver
        .build(
            dir.path(),
            &[root.path().to_path_buf()],
            &dir.path().join("libnav_msgs.so"),
        )
        .unwrap();

    let request = toolchain.last_request();
    let names: Vec<&str> = request.references.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["geometry_msgs"]);
}

#[cfg(unix)]
#[test]
fn unreadable_candidate_does_not_abort_the_scan() {
    let dir = source_dir(&["plan_msg.rs"]);
    let root = install_root(&["geometry_msgs"]);
    // Opens fine but fails on read
    std::os::unix::fs::symlink("/proc/self/mem", root.path().join("lib/libbad.so")).unwrap();

    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);
    let outcome = driver
        .build(
            dir.path(),
            &[root.path().to_path_buf()],
            &dir.path().join("libnav_msgs.so"),
        )
        .unwrap();
    assert!(!outcome.has_errors());

    let request = toolchain.last_request();
    let names: Vec<&str> = request.references.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["geometry_msgs"]);
}

#[test]
fn missing_roots_are_skipped_without_error() {
    let dir = source_dir(&["plan_msg.rs"]);
    let roots = vec![PathBuf::from("/nonexistent/install")];

    let toolchain = RecordingToolchain::new(Vec::new());
    let driver = BuildDriver::with_toolchain(&toolchain);
    let outcome = driver
        .build(dir.path(), &roots, &dir.path().join("libnav_msgs.so"))
        .unwrap();
    assert!(!outcome.has_errors());

    let request = toolchain.last_request();
    assert!(request.references.is_empty());
}

#[test]
fn diagnostics_are_partitioned_by_severity() {
    let dir = source_dir(&["plan_msg.rs"]);
    let toolchain = RecordingToolchain::new(vec![
        CompileDiagnostic {
            severity: Severity::Error,
            unit: Some("plan_msg.rs".to_string()),
            code: Some("E0412".to_string()),
            message: "cannot find type `Pose`".to_string(),
        },
        CompileDiagnostic {
            severity: Severity::Warning,
            unit: Some("plan_msg.rs".to_string()),
            code: None,
            message: "struct is never constructed".to_string(),
        },
    ]);

    let driver = BuildDriver::with_toolchain(&toolchain);
    let outcome = driver
        .build(dir.path(), &[], &dir.path().join("libnav_msgs.so"))
        .unwrap();

    assert!(outcome.has_errors());
    assert!(outcome.has_warnings());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.errors[0].code.as_deref(), Some("E0412"));
    assert_eq!(outcome.errors[0].unit.as_deref(), Some("plan_msg.rs"));
}
