//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md

use crate::core::model::{Kind, ResultItem, ResultSet};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
        }
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let mut files = Vec::new();
        let mut anchors = Vec::new();
        let mut errors = Vec::new();

        for item in &result_set.items {
            match item.kind {
                Kind::File => files.push(item),
                Kind::Anchor => anchors.push(item),
                Kind::Error => errors.push(item),
            }
        }

        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for error in &item.errors {
                    match &item.path {
                        Some(path) => output.push_str(&format!(
                            "- `{}` **{}**: {}\n",
                            path, error.code, error.message
                        )),
                        None => {
                            output.push_str(&format!("- **{}**: {}\n", error.code, error.message))
                        }
                    }
                }
            }
            output.push('\n');
        }

        if !files.is_empty() {
            output.push_str("## Files\n\n");
            for item in files {
                self.render_file_md(&mut output, item);
            }
            output.push('\n');
        }

        if !anchors.is_empty() {
            output.push_str("## Anchors\n\n");
            for item in anchors {
                self.render_anchor_md(&mut output, item);
            }
            output.push('\n');
        }

        output
    }

    fn render_file_md(&self, output: &mut String, item: &ResultItem) {
        let Some(path) = &item.path else {
            return;
        };

        output.push_str(&format!("- `{}`", path));
        if let Some(status) = item.status {
            let status = serde_json::to_value(status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            output.push_str(&format!(" {}", status));
        }
        if let Some(data) = &item.data {
            if let (Some(rewritten), Some(anchors)) = (
                data.get("rewritten").and_then(|v| v.as_u64()),
                data.get("anchors").and_then(|v| v.as_u64()),
            ) {
                output.push_str(&format!(" ({}/{} anchors)", rewritten, anchors));
            }
        }
        output.push('\n');
    }

    fn render_anchor_md(&self, output: &mut String, item: &ResultItem) {
        let (Some(path), Some(range)) = (&item.path, &item.range) else {
            return;
        };

        output.push_str(&format!("- `{}:{}`", path, range.start));
        if let Some(data) = &item.data {
            if let Some(href) = data.get("href").and_then(|v| v.as_str()) {
                output.push_str(&format!(" `{}`", href));
            }
            if let Some(reason) = data.get("reason").and_then(|v| v.as_str()) {
                output.push_str(&format!(" {}", reason));
            }
        }
        output.push('\n');
    }
}
