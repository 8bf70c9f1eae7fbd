//! Path normalization utilities
//!
//! All paths in results use '/' as separator and are relative to root.

use std::path::{Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Display name for a file: relative to root when under it, else the path as given
pub fn display_path(path: &Path, root: &Path) -> String {
    make_relative(path, root)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| normalize_path(path))
}

/// Resolve a user-supplied path against root unless it is absolute
pub fn resolve_under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Check whether the file extension is one of `extensions` (case-insensitive)
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Destination of `path` under `out_dir`, keeping its location relative to root
pub fn output_path(path: &Path, root: &Path, out_dir: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => out_dir.join(relative),
        _ => out_dir.join(path.file_name().unwrap_or(path.as_os_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("site/index.html");
        assert_eq!(normalize_path(path), "site/index.html");
    }

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = Path::new("/project/site/index.html");
        assert_eq!(make_relative(path, root), Some("site/index.html".to_string()));
    }

    #[test]
    fn test_make_relative_not_under_root() {
        let root = Path::new("/project");
        let path = Path::new("/other/index.html");
        assert_eq!(make_relative(path, root), None);
    }

    #[test]
    fn test_display_path_outside_root() {
        let root = Path::new("/project");
        assert_eq!(
            display_path(Path::new("/other/a.html"), root),
            "/other/a.html"
        );
        assert_eq!(display_path(Path::new("/project/a.html"), root), "a.html");
    }

    #[test]
    fn test_resolve_under_root() {
        let root = Path::new("/project");
        assert_eq!(
            resolve_under_root(root, Path::new("site")),
            PathBuf::from("/project/site")
        );
        assert_eq!(
            resolve_under_root(root, Path::new("/abs/site")),
            PathBuf::from("/abs/site")
        );
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["html".to_string(), "htm".to_string()];
        assert!(has_extension(Path::new("a/index.html"), &exts));
        assert!(has_extension(Path::new("a/INDEX.HTM"), &exts));
        assert!(!has_extension(Path::new("a/style.css"), &exts));
        assert!(!has_extension(Path::new("a/Makefile"), &exts));
    }

    #[test]
    fn test_output_path_keeps_relative_layout() {
        let root = Path::new("/project");
        let out = Path::new("/project/dist");
        assert_eq!(
            output_path(Path::new("/project/blog/post.html"), root, out),
            PathBuf::from("/project/dist/blog/post.html")
        );
        assert_eq!(
            output_path(Path::new("/elsewhere/page.html"), root, out),
            PathBuf::from("/project/dist/page.html")
        );
    }
}
