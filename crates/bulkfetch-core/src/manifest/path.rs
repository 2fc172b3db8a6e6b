//! Destination path resolution with traversal checks.

use std::path::{Component, Path, PathBuf};

/// Why a manifest `filename` was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnsafeFilename {
    #[error("filename is empty")]
    Empty,
    #[error("filename {0:?} is absolute")]
    Absolute(String),
    #[error("filename {0:?} escapes the manifest directory")]
    Traversal(String),
    #[error("filename {0:?} contains a control character")]
    ControlCharacter(String),
}

/// Joins `filename` under `source_dir`, refusing anything that could land
/// outside it.
///
/// Nested relative paths (`data/part1.bin`) are accepted; `.` segments are
/// dropped. `..` segments are refused even when they would stay inside
/// `source_dir`, and so are backslash-separated `..` segments.
pub fn resolve_destination(source_dir: &Path, filename: &str) -> Result<PathBuf, UnsafeFilename> {
    if filename.is_empty() {
        return Err(UnsafeFilename::Empty);
    }
    if filename.chars().any(|c| c.is_control()) {
        return Err(UnsafeFilename::ControlCharacter(filename.to_string()));
    }
    if filename.split(['/', '\\']).any(|seg| seg == "..") {
        return Err(UnsafeFilename::Traversal(filename.to_string()));
    }

    let mut relative = PathBuf::new();
    for component in Path::new(filename).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(UnsafeFilename::Traversal(filename.to_string())),
            Component::RootDir | Component::Prefix(_) => {
                return Err(UnsafeFilename::Absolute(filename.to_string()))
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(UnsafeFilename::Empty);
    }
    Ok(source_dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_joins_under_source_dir() {
        let p = resolve_destination(Path::new("/data/set1"), "model.bin").unwrap();
        assert_eq!(p, Path::new("/data/set1/model.bin"));
    }

    #[test]
    fn nested_and_dot_segments() {
        let p = resolve_destination(Path::new("/data"), "./sub/./x.zip").unwrap();
        assert_eq!(p, Path::new("/data/sub/x.zip"));
    }

    #[test]
    fn rejects_parent_segments() {
        assert_eq!(
            resolve_destination(Path::new("/data"), "../etc/passwd"),
            Err(UnsafeFilename::Traversal("../etc/passwd".to_string()))
        );
        assert!(matches!(
            resolve_destination(Path::new("/data"), "sub/../../x"),
            Err(UnsafeFilename::Traversal(_))
        ));
        assert!(matches!(
            resolve_destination(Path::new("/data"), "..\\x.bin"),
            Err(UnsafeFilename::Traversal(_))
        ));
    }

    #[test]
    fn rejects_absolute() {
        assert!(matches!(
            resolve_destination(Path::new("/data"), "/tmp/x"),
            Err(UnsafeFilename::Absolute(_))
        ));
    }

    #[test]
    fn rejects_empty_and_dot_only() {
        assert_eq!(resolve_destination(Path::new("/data"), ""), Err(UnsafeFilename::Empty));
        assert_eq!(resolve_destination(Path::new("/data"), "."), Err(UnsafeFilename::Empty));
        assert_eq!(resolve_destination(Path::new("/data"), "./"), Err(UnsafeFilename::Empty));
    }

    #[test]
    fn rejects_control_chars() {
        assert!(matches!(
            resolve_destination(Path::new("/data"), "a\0b"),
            Err(UnsafeFilename::ControlCharacter(_))
        ));
    }
}
