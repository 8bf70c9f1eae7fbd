//! Rewrite backend - runs the rule engine over files and writes the results
//!
//! Each file is read whole, transformed independently with the shared rule
//! set and written either in place (only when it changed) or under an output
//! directory (always, so the output directory mirrors the input).

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::backends::scan::{collect_documents, map_files, ScanOptions};
use crate::core::file_reader::{classify, read_document, FileContent, SkipReason};
use crate::core::model::{ItemError, Meta, ResultItem, ResultSet, Status};
use crate::core::paths::{display_path, output_path};
use crate::core::render::{RenderConfig, Renderer};
use crate::rules::{transform, RewriteOptions, RuleSet};

/// Where rewritten files go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    InPlace,
    OutDir(PathBuf),
}

/// Settings for a rewrite run
#[derive(Debug, Clone)]
pub struct RewriteSettings {
    pub destination: Destination,
    pub max_file_size: u64,
}

impl RewriteSettings {
    fn target_for(&self, path: &Path, root: &Path) -> Option<PathBuf> {
        match &self.destination {
            Destination::InPlace => None,
            Destination::OutDir(dir) => Some(output_path(path, root, dir)),
        }
    }
}

fn write_output(target: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    fs::write(target, contents).with_context(|| format!("cannot write {}", target.display()))
}

fn failed(relative: String, code: &str, err: &anyhow::Error) -> ResultItem {
    warn!("rewrite"; "{}: {:#}", relative, err);
    ResultItem::error(ItemError::new(code, format!("{:#}", err))).with_path(relative)
}

/// Rewrite a single file and describe the outcome
pub fn rewrite_file(
    path: &Path,
    root: &Path,
    rules: &RuleSet,
    settings: &RewriteSettings,
) -> ResultItem {
    let relative = display_path(path, root);

    let content = match read_document(path, settings.max_file_size) {
        Ok(content) => content,
        Err(e) => {
            let err = anyhow::Error::new(e).context(format!("cannot read {}", path.display()));
            return failed(relative, "READ_FAILED", &err);
        }
    };
    let size = content.len() as u64;

    match content {
        FileContent::Text(text) => {
            let rewritten = rules.rewrite(&text);
            let changed = rewritten.changed();
            let report = rewritten.report;

            let target = match settings.target_for(path, root) {
                Some(target) => Some(target),
                None if changed => Some(path.to_path_buf()),
                None => None,
            };

            let mut written = false;
            if let Some(target) = target {
                if let Err(err) = write_output(&target, rewritten.output.as_bytes()) {
                    return failed(relative, "WRITE_FAILED", &err);
                }
                written = true;
            }

            debug!(
                "rewrite";
                "{}: {} anchors, {} rewritten",
                relative, report.anchors, report.rewritten
            );

            let status = if changed {
                Status::Rewritten
            } else {
                Status::Unchanged
            };

            ResultItem::file(relative, status)
                .with_meta(Meta {
                    size: Some(size),
                    written,
                })
                .with_data(json!({
                    "anchors": report.anchors,
                    "eligible": report.eligible,
                    "rewritten": report.rewritten,
                    "attributes_added": report.attributes_added,
                    "changed": changed,
                }))
        }
        FileContent::Skipped { reason, bytes } => {
            debug!("rewrite"; "{}: skipped ({})", relative, reason.as_str());

            // Pass-through copy so the output directory stays complete.
            let mut written = false;
            if reason != SkipReason::Empty {
                if let Some(target) = settings.target_for(path, root) {
                    if let Err(err) = write_output(&target, &bytes) {
                        return failed(relative, "WRITE_FAILED", &err);
                    }
                    written = true;
                }
            }

            ResultItem::file(relative, Status::Skipped)
                .with_meta(Meta {
                    size: Some(size),
                    written,
                })
                .with_data(json!({ "reason": reason.as_str() }))
        }
    }
}

/// Rewrite every file, one result item per file, sorted by path
pub fn rewrite_files(
    files: &[PathBuf],
    root: &Path,
    rules: &RuleSet,
    settings: &RewriteSettings,
) -> ResultSet {
    let mut result_set: ResultSet = map_files(files, |path| rewrite_file(path, root, rules, settings))
        .into_iter()
        .collect();
    result_set.sort();
    result_set
}

/// Rewrite a single document from stdin to stdout
pub fn run_stdin(options: Option<&RewriteOptions>, max_file_size: u64) -> Result<()> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("cannot read stdin")?;

    let output = match classify(bytes, max_file_size) {
        FileContent::Text(text) => transform(&text, options)?.into_bytes(),
        FileContent::Skipped { reason, bytes } => {
            debug!("rewrite"; "stdin: passed through ({})", reason.as_str());
            bytes
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output).context("cannot write stdout")?;
    stdout.flush().context("cannot write stdout")?;
    Ok(())
}

/// Run the rewrite command
pub fn run_rewrite(
    root: &Path,
    inputs: &[PathBuf],
    scan: &ScanOptions,
    settings: &RewriteSettings,
    rules: &RuleSet,
    render_config: RenderConfig,
) -> Result<()> {
    if rules.is_noop() {
        warn!("rewrite"; "neither rel nor target is configured; no anchor will change");
    }

    let files = collect_documents(root, inputs, scan)?;
    debug!("rewrite"; "{} documents found", files.len());

    let result_set = rewrite_files(&files, root, rules, settings);

    let renderer = Renderer::with_config(render_config);
    println!("{}", renderer.render(&result_set));

    let changed = result_set
        .items
        .iter()
        .filter(|item| item.status == Some(Status::Rewritten))
        .count();
    info!("rewrite"; "{} of {} files rewritten", changed, files.len());

    let errors = result_set.error_count();
    if errors > 0 {
        bail!("{} file(s) failed", errors);
    }

    Ok(())
}
