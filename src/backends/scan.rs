//! Document discovery
//!
//! Uses the ignore crate for traversal so .gitignore and hidden-file rules
//! apply the same way they do for other tools in the workspace.

use anyhow::{bail, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::paths::{has_extension, resolve_under_root};

/// Default extensions treated as HTML documents
pub const DEFAULT_EXTENSIONS: &[&str] = &["html", "htm"];

/// How to discover documents
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// File extensions to include when walking directories
    pub extensions: Vec<String>,
    /// Include hidden files and directories
    pub hidden: bool,
    /// Respect .gitignore and other ignore files
    pub ignore: bool,
    /// Directory never descended into (usually the output directory)
    pub exclude: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            hidden: false,
            ignore: true,
            exclude: None,
        }
    }
}

/// Collect documents from `inputs` (files or directories, relative to root).
///
/// Explicit files are taken as-is; directories are walked and filtered by
/// extension. With no inputs, root is walked. Output is sorted and deduplicated.
pub fn collect_documents(
    root: &Path,
    inputs: &[PathBuf],
    options: &ScanOptions,
) -> Result<Vec<PathBuf>> {
    let inputs: Vec<PathBuf> = if inputs.is_empty() {
        vec![root.to_path_buf()]
    } else {
        inputs.iter().map(|p| resolve_under_root(root, p)).collect()
    };

    let mut documents = Vec::new();

    for input in &inputs {
        if input.is_file() {
            documents.push(input.clone());
        } else if input.is_dir() {
            walk_dir(input, options, &mut documents);
        } else {
            bail!("Path not found: {}", input.display());
        }
    }

    documents.sort();
    documents.dedup();
    Ok(documents)
}

fn walk_dir(dir: &Path, options: &ScanOptions, documents: &mut Vec<PathBuf>) {
    let mut builder = WalkBuilder::new(dir);
    builder
        .hidden(!options.hidden)
        .git_ignore(options.ignore)
        .git_global(options.ignore)
        .git_exclude(options.ignore)
        .ignore(options.ignore);

    if let Some(exclude) = options.exclude.clone() {
        builder.filter_entry(move |entry| !entry.path().starts_with(&exclude));
    }

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("scan"; "skipping entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if !has_extension(path, &options.extensions) {
            continue;
        }

        documents.push(path.to_path_buf());
    }
}

/// Map every file through `f`, in parallel when the `parallel` feature is on.
/// Output order follows `files`.
pub fn map_files<T, F>(files: &[PathBuf], f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Path) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        files.par_iter().map(|p| f(p)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        files.iter().map(|p| f(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_collect_empty_dir() {
        let temp = tempdir().unwrap();
        let docs = collect_documents(temp.path(), &[], &ScanOptions::default()).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_collect_filters_by_extension_and_sorts() {
        let temp = tempdir().unwrap();
        File::create(temp.path().join("b.html")).unwrap();
        File::create(temp.path().join("a.htm")).unwrap();
        File::create(temp.path().join("style.css")).unwrap();
        fs::create_dir(temp.path().join("blog")).unwrap();
        File::create(temp.path().join("blog/post.HTML")).unwrap();

        let docs = collect_documents(temp.path(), &[], &ScanOptions::default()).unwrap();
        assert_eq!(
            names(temp.path(), &docs),
            vec!["a.htm", "b.html", "blog/post.HTML"]
        );
    }

    #[test]
    fn test_collect_skips_hidden_by_default() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join(".cache")).unwrap();
        File::create(temp.path().join(".cache/page.html")).unwrap();
        File::create(temp.path().join("index.html")).unwrap();

        let docs = collect_documents(temp.path(), &[], &ScanOptions::default()).unwrap();
        assert_eq!(names(temp.path(), &docs), vec!["index.html"]);

        let options = ScanOptions {
            hidden: true,
            ..ScanOptions::default()
        };
        let docs = collect_documents(temp.path(), &[], &options).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_collect_excludes_output_dir() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("dist")).unwrap();
        File::create(temp.path().join("dist/index.html")).unwrap();
        File::create(temp.path().join("index.html")).unwrap();

        let options = ScanOptions {
            exclude: Some(temp.path().join("dist")),
            ..ScanOptions::default()
        };
        let docs = collect_documents(temp.path(), &[], &options).unwrap();
        assert_eq!(names(temp.path(), &docs), vec!["index.html"]);
    }

    #[test]
    fn test_collect_explicit_file_ignores_extension() {
        let temp = tempdir().unwrap();
        File::create(temp.path().join("sample.txt")).unwrap();

        let docs = collect_documents(
            temp.path(),
            &[PathBuf::from("sample.txt")],
            &ScanOptions::default(),
        )
        .unwrap();
        assert_eq!(names(temp.path(), &docs), vec!["sample.txt"]);
    }

    #[test]
    fn test_collect_missing_path() {
        let temp = tempdir().unwrap();
        let err = collect_documents(
            temp.path(),
            &[PathBuf::from("nope")],
            &ScanOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Path not found"));
    }

    #[test]
    fn test_map_files_keeps_order() {
        let files = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")];
        let out = map_files(&files, |p| p.to_string_lossy().to_uppercase());
        assert_eq!(out, vec!["A", "B", "C"]);
    }
}
