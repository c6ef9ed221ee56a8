use crate::error::{Result, TempArchiveError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A resolved output location for one entry
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    /// Entry name as it appeared in the archive
    pub name: String,
    /// Concrete location under the destination root
    pub path: PathBuf,
    /// Whether something already exists at `path`
    pub exists: bool,
}

/// Maps entry names to writable output locations.
///
/// Splitting `resolve` from `open_sink` lets the engine ask about a
/// destination (does it exist?) before committing to create anything, so an
/// interactive skip leaves no trace on disk.
pub trait DestinationResolver {
    /// Resolve an entry name to a concrete location, without side effects
    fn resolve(&mut self, name: &str) -> Result<ResolvedPath>;

    /// Open a writable sink at a resolved location, creating intermediate
    /// directories as needed
    fn open_sink(&mut self, resolved: &ResolvedPath) -> Result<Box<dyn Write>>;
}

/// Resolver that roots every entry under a base directory.
///
/// Entry names come from untrusted archive data, so names that would escape
/// the root (absolute paths, drive prefixes, `..` segments) are rejected
/// rather than sanitized into something else.
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DestinationResolver for DirResolver {
    fn resolve(&mut self, name: &str) -> Result<ResolvedPath> {
        let relative = sanitize_entry_name(name).map_err(|reason| {
            TempArchiveError::DestinationResolution {
                name: name.to_string(),
                reason,
            }
        })?;
        let path = self.root.join(relative);
        let exists = path.exists();
        Ok(ResolvedPath {
            name: name.to_string(),
            path,
            exists,
        })
    }

    fn open_sink(&mut self, resolved: &ResolvedPath) -> Result<Box<dyn Write>> {
        if let Some(parent) = resolved.path.parent() {
            fs::create_dir_all(parent).map_err(|err| TempArchiveError::DestinationResolution {
                name: resolved.name.clone(),
                reason: format!("cannot create directory {}: {err}", parent.display()),
            })?;
        }
        tracing::debug!(path = %resolved.path.display(), "opening destination");
        let file = File::create(&resolved.path).map_err(TempArchiveError::SinkWrite)?;
        Ok(Box::new(file))
    }
}

/// Normalize an entry name to a safe relative path.
///
/// Backslashes are treated as separators (the format originates on Windows);
/// empty and `.` segments are dropped. Returns the rejection reason for names
/// that would resolve outside the destination root.
fn sanitize_entry_name(name: &str) -> std::result::Result<PathBuf, String> {
    if name.contains('\0') {
        return Err("name contains a NUL byte".to_string());
    }
    let normalized = name.replace('\\', "/");
    if normalized.starts_with('/') {
        return Err("absolute path".to_string());
    }
    if normalized.as_bytes().get(1) == Some(&b':') {
        return Err("drive prefix".to_string());
    }

    let mut relative = PathBuf::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err("parent-directory segment".to_string()),
            other => relative.push(other),
        }
    }
    if relative.as_os_str().is_empty() {
        return Err("name is empty after normalization".to_string());
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plain_names() {
        assert_eq!(
            sanitize_entry_name("foo.txt").unwrap(),
            PathBuf::from("foo.txt")
        );
        assert_eq!(
            sanitize_entry_name("sub/bar.dat").unwrap(),
            PathBuf::from("sub/bar.dat")
        );
        assert_eq!(
            sanitize_entry_name("sub\\win\\style.bin").unwrap(),
            PathBuf::from("sub/win/style.bin")
        );
        assert_eq!(
            sanitize_entry_name("./a//b/./c").unwrap(),
            PathBuf::from("a/b/c")
        );
    }

    #[test]
    fn test_sanitize_rejects_escapes() {
        assert!(sanitize_entry_name("../evil.txt").is_err());
        assert!(sanitize_entry_name("sub/../../evil.txt").is_err());
        assert!(sanitize_entry_name("/etc/passwd").is_err());
        assert!(sanitize_entry_name("C:\\Windows\\evil.dll").is_err());
        assert!(sanitize_entry_name("a\0b").is_err());
        assert!(sanitize_entry_name(".").is_err());
        assert!(sanitize_entry_name("").is_err());
    }

    #[test]
    fn test_resolve_reports_existence() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = DirResolver::new(dir.path());

        let fresh = resolver.resolve("new.txt").unwrap();
        assert!(!fresh.exists);
        assert_eq!(fresh.path, dir.path().join("new.txt"));

        std::fs::write(dir.path().join("present.txt"), b"x").unwrap();
        let present = resolver.resolve("present.txt").unwrap();
        assert!(present.exists);
    }

    #[test]
    fn test_open_sink_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = DirResolver::new(dir.path());

        let resolved = resolver.resolve("deep/nested/file.bin").unwrap();
        let mut sink = resolver.open_sink(&resolved).unwrap();
        sink.write_all(b"payload").unwrap();
        drop(sink);

        assert_eq!(
            std::fs::read(dir.path().join("deep/nested/file.bin")).unwrap(),
            b"payload"
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = DirResolver::new(dir.path());
        let err = resolver.resolve("../../escape.txt").unwrap_err();
        assert!(matches!(
            err,
            TempArchiveError::DestinationResolution { .. }
        ));
    }
}
