//! Plan backend - dry run that reports the decision for every anchor

use anyhow::Result;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

use crate::backends::scan::{collect_documents, map_files, ScanOptions};
use crate::core::file_reader::{read_document, FileContent};
use crate::core::model::{ItemError, Meta, ResultItem, ResultSet, Status};
use crate::core::paths::display_path;
use crate::core::render::{RenderConfig, Renderer};
use crate::html::Document;
use crate::rules::RuleSet;

/// Evaluate every anchor of one file without writing anything
pub fn plan_file(path: &Path, root: &Path, rules: &RuleSet, max_file_size: u64) -> Vec<ResultItem> {
    let relative = display_path(path, root);

    let text = match read_document(path, max_file_size) {
        Ok(FileContent::Text(text)) => text,
        Ok(FileContent::Skipped { reason, bytes }) => {
            return vec![ResultItem::file(relative, Status::Skipped)
                .with_meta(Meta {
                    size: Some(bytes.len() as u64),
                    written: false,
                })
                .with_data(json!({ "reason": reason.as_str() }))];
        }
        Err(e) => {
            warn!("plan"; "{}: {}", relative, e);
            return vec![ResultItem::error(ItemError::new(
                "READ_FAILED",
                format!("cannot read {}: {}", path.display(), e),
            ))
            .with_path(relative)];
        }
    };

    let document = Document::parse(text);
    document
        .anchors()
        .iter()
        .map(|anchor| {
            let decision = rules.evaluate(anchor);
            let attributes: Map<String, Value> = decision
                .attributes
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect();

            ResultItem::anchor(relative.clone(), document.line_of(anchor.offset())).with_data(
                json!({
                    "href": anchor.href(),
                    "reason": decision.reason,
                    "eligible": decision.eligible,
                    "attributes": attributes,
                }),
            )
        })
        .collect()
}

/// Run the plan command
pub fn run_plan(
    root: &Path,
    inputs: &[PathBuf],
    scan: &ScanOptions,
    rules: &RuleSet,
    max_file_size: u64,
    render_config: RenderConfig,
) -> Result<()> {
    let files = collect_documents(root, inputs, scan)?;
    debug!("plan"; "{} documents found", files.len());

    let mut result_set = ResultSet::new();
    for items in map_files(&files, |path| plan_file(path, root, rules, max_file_size)) {
        result_set.extend(items);
    }
    result_set.sort();

    let renderer = Renderer::with_config(render_config);
    println!("{}", renderer.render(&result_set));

    let pending = result_set
        .items
        .iter()
        .filter(|item| {
            item.data
                .as_ref()
                .and_then(|d| d.get("attributes"))
                .and_then(|a| a.as_object())
                .map(|a| !a.is_empty())
                .unwrap_or(false)
        })
        .count();
    info!("plan"; "{} anchors would change", pending);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_reader::DEFAULT_MAX_FILE_SIZE;
    use crate::rules::RewriteOptions;
    use std::fs;
    use tempfile::tempdir;

    fn rules(value: Value) -> RuleSet {
        let options: RewriteOptions = serde_json::from_value(value).unwrap();
        RuleSet::from_options(Some(&options)).unwrap()
    }

    #[test]
    fn test_plan_reports_each_anchor_without_writing() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("index.html");
        let source = "<p>\n<a href=\"https://www.example.com\">E</a>\n<a href=\"https://t.com\">T</a>\n</p>";
        fs::write(&path, source).unwrap();

        let items = plan_file(
            &path,
            temp.path(),
            &rules(json!({"keyword": "example", "rel": "nofollow"})),
            DEFAULT_MAX_FILE_SIZE,
        );

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].range.unwrap().start, 2);
        let first = items[0].data.as_ref().unwrap();
        assert_eq!(first["reason"], "keyword_match");
        assert_eq!(first["attributes"]["rel"], "nofollow");

        let second = items[1].data.as_ref().unwrap();
        assert_eq!(second["reason"], "no_keyword_match");
        assert_eq!(second["eligible"], false);

        assert_eq!(fs::read_to_string(&path).unwrap(), source);
    }

    #[test]
    fn test_plan_white_list_reason() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("index.html");
        fs::write(&path, "<a href=\"https://www.example.com\">E</a>").unwrap();

        let items = plan_file(
            &path,
            temp.path(),
            &rules(json!({"keyword": "example", "rel": "nofollow", "whiteList": true})),
            DEFAULT_MAX_FILE_SIZE,
        );

        let data = items[0].data.as_ref().unwrap();
        assert_eq!(data["reason"], "white_listed");
        assert!(data["attributes"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_plan_skipped_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.html");
        fs::write(&path, "").unwrap();

        let items = plan_file(
            &path,
            temp.path(),
            &rules(json!({"rel": "nofollow"})),
            DEFAULT_MAX_FILE_SIZE,
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, Some(Status::Skipped));
    }
}
