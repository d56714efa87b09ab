//! Discovery of previously compiled modules under installation roots

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Platform prefix stripped from compiled library filenames
#[cfg(not(windows))]
pub const DLL_PREFIX: &str = "lib";
/// Platform prefix stripped from compiled library filenames
#[cfg(windows)]
pub const DLL_PREFIX: &str = "";

/// A compiled module found under an installation root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModule {
    /// Logical module name, derived from the filename
    pub name: String,
    /// Path to the compiled artifact
    pub path: PathBuf,
}

/// Derive the logical module name from an artifact path.
///
/// The name is the filename stem with the platform library prefix removed,
/// so `libgeometry_msgs.so` and `geometry_msgs.dll` both map to
/// `geometry_msgs`.
#[must_use]
pub fn module_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_prefix(DLL_PREFIX).unwrap_or(stem);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Check whether a file is a loadable compiled module.
///
/// Inspects the file header rather than trusting the extension, so stray
/// files in a lib directory are skipped without failing the build. Open and
/// read failures count as not-a-module; a bad candidate must never abort
/// the scan.
#[must_use]
pub fn probe_module(path: &Path) -> Option<DiscoveredModule> {
    let name = module_name(path)?;

    let mut header = [0u8; 4];
    let mut file = File::open(path).ok()?;
    let read = file.read(&mut header).ok()?;
    if read < 4 || !is_module_magic(&header) {
        return None;
    }

    Some(DiscoveredModule {
        name,
        path: path.to_path_buf(),
    })
}

/// Recognized loadable-object headers: ELF, Mach-O (both endiannesses,
/// 32 and 64 bit), and PE
fn is_module_magic(header: &[u8; 4]) -> bool {
    matches!(
        header,
        [0x7f, b'E', b'L', b'F']
            | [0xfe, 0xed, 0xfa, 0xce]
            | [0xfe, 0xed, 0xfa, 0xcf]
            | [0xce, 0xfa, 0xed, 0xfe]
            | [0xcf, 0xfa, 0xed, 0xfe]
    ) || header.starts_with(b"MZ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_module_name_strips_prefix() {
        #[cfg(not(windows))]
        {
            assert_eq!(
                module_name(Path::new("/opt/ros/lib/libgeometry_msgs.so")),
                Some("geometry_msgs".to_string())
            );
        }
        assert_eq!(
            module_name(Path::new("geometry_msgs.dll")),
            Some("geometry_msgs".to_string())
        );
    }

    #[test]
    fn test_probe_accepts_elf_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "libtest_msgs.so", b"\x7fELF rest of file");
        let module = probe_module(&path).unwrap();
        assert_eq!(module.name, "test_msgs");
        assert_eq!(module.path, path);
    }

    #[test]
    fn test_probe_accepts_pe_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "test_msgs.dll", b"MZ\x90\x00 rest");
        assert!(probe_module(&path).is_some());
    }

    #[test]
    fn test_probe_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "libnotes.so", b"this is not a module");
        assert!(probe_module(&path).is_none());
    }

    #[test]
    fn test_probe_rejects_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "libshort.so", b"\x7fE");
        assert!(probe_module(&path).is_none());
    }

    #[test]
    fn test_probe_treats_unreadable_candidate_as_non_module() {
        assert!(probe_module(Path::new("/nonexistent/libghost.so")).is_none());

        // A directory opens fine but fails to read as a file
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libodd.so");
        std::fs::create_dir(&path).unwrap();
        assert!(probe_module(&path).is_none());
    }
}
