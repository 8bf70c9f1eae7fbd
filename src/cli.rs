//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::backends::rewrite::{Destination, RewriteSettings};
use crate::backends::scan::ScanOptions;
use crate::core::file_reader::DEFAULT_MAX_FILE_SIZE;
use crate::core::paths::resolve_under_root;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::rules::{ConfigError, RewriteOptions, RuleSet};

/// anchor-rewriter - add rel/target attributes to HTML anchors by href rules.
#[derive(Parser, Debug)]
#[command(name = "anchor-rewriter")]
#[command(
    author,
    version,
    about,
    long_about = r#"anchor-rewriter walks HTML files and adds `rel` and/or `target` attributes
to <a> elements whose href matches (or, in white-list mode, does not match)
a set of keywords. Existing attributes are never overwritten, and everything
outside the edited start tags is written back byte for byte.

Each command prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown

Examples:
    anchor-rewriter rewrite --rel nofollow
    anchor-rewriter rewrite site --keyword twitter.com,github.io --rel nofollow --target _blank
    anchor-rewriter rewrite --keyword example.com --white-list --rel nofollow --out-dir dist
    anchor-rewriter plan --config anchors.json
    cat page.html | anchor-rewriter rewrite - --rel nofollow
"#
)]
pub struct Cli {
    /// Root directory for all operations.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory for all operations (defaults to the current directory).\n\n\
All paths emitted in results are relative to this root, and positional paths and\n\
--out-dir are interpreted relative to it."
    )]
    pub root: PathBuf,

    /// Output format (jsonl/json/md).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)"
    )]
    pub format: String,

    /// Disable colored diagnostics.
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output on stderr. This is useful when logging to files or when\n\
your terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (no diagnostics on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress diagnostics on stderr. Results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable per-file diagnostics on stderr. Ignored when --quiet is set."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Rule options shared by rewrite and plan.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// JSON options file ({"keyword", "rel", "target", "whiteList"}).
    #[arg(
        long,
        value_name = "FILE",
        env = "ANCHOR_REWRITER_CONFIG",
        long_help = "Read rewrite options from a JSON file:\n\n\
  {\"keyword\": [\"twitter.com\"], \"rel\": \"nofollow\", \"target\": \"_blank\", \"whiteList\": false}\n\n\
`keyword` may be a string or an array of strings. Command-line flags override\n\
values from the file (use --no-white-list to clear a file's whiteList)."
    )]
    pub config: Option<PathBuf>,

    /// Keyword to look for in hrefs (repeatable or comma-separated).
    #[arg(
        long = "keyword",
        value_name = "KEYWORD",
        value_delimiter = ',',
        long_help = "Only rewrite anchors whose href contains one of these keywords\n\
(case-sensitive substring match). Without keywords every anchor is rewritten."
    )]
    pub keywords: Vec<String>,

    /// Value for the rel attribute.
    #[arg(long, value_name = "VALUE")]
    pub rel: Option<String>,

    /// Value for the target attribute.
    #[arg(long, value_name = "VALUE")]
    pub target: Option<String>,

    /// Rewrite anchors that do NOT match the keywords.
    #[arg(
        long,
        overrides_with = "no_white_list",
        long_help = "Invert keyword matching: anchors whose href contains a keyword are left\n\
alone and all other anchors are rewritten."
    )]
    pub white_list: bool,

    /// Turn off white-list mode set in the options file.
    #[arg(long, overrides_with = "white_list")]
    pub no_white_list: bool,
}

impl RuleArgs {
    fn has_flags(&self) -> bool {
        !self.keywords.is_empty()
            || self.rel.is_some()
            || self.target.is_some()
            || self.white_list
            || self.no_white_list
    }

    /// Merge the options file with command-line flags.
    ///
    /// Returns `None` when neither a file nor any flag supplied options.
    pub fn resolve(&self) -> Result<Option<RewriteOptions>, ConfigError> {
        let from_file = match &self.config {
            Some(path) => RewriteOptions::load(path)?,
            None => None,
        };

        if from_file.is_none() && !self.has_flags() {
            return Ok(None);
        }

        let mut options = from_file.unwrap_or_default();
        if !self.keywords.is_empty() {
            options.keyword = Some(Value::Array(
                self.keywords.iter().cloned().map(Value::String).collect(),
            ));
        }
        if let Some(rel) = &self.rel {
            options.rel = Some(rel.clone());
        }
        if let Some(target) = &self.target {
            options.target = Some(target.clone());
        }
        if self.white_list {
            options.white_list = true;
        } else if self.no_white_list {
            options.white_list = false;
        }

        Ok(Some(options))
    }

    /// Resolve and validate into a rule set, before any file is touched.
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        let options = self.resolve()?;
        RuleSet::from_options(options.as_ref())
    }
}

/// File discovery options shared by rewrite and plan.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Extensions treated as HTML when walking directories.
    #[arg(
        long = "ext",
        value_name = "EXT",
        value_delimiter = ',',
        default_values = ["html", "htm"]
    )]
    pub extensions: Vec<String>,

    /// Include hidden files/directories (dotfiles).
    #[arg(long)]
    pub hidden: bool,

    /// Disable .gitignore and other ignore rules.
    #[arg(long)]
    pub no_ignore: bool,

    /// Skip files larger than this many bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,
}

impl ScanArgs {
    fn scan_options(&self, exclude: Option<PathBuf>) -> ScanOptions {
        ScanOptions {
            extensions: self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            hidden: self.hidden,
            ignore: !self.no_ignore,
            exclude,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite anchors in HTML files.
    #[command(
        long_about = "Transform every HTML file under ROOT (or the given PATHS) and write the\n\
result. Without --out-dir files are rewritten in place, and only when an anchor\n\
changed. With --out-dir every processed file is written there, keeping its path\n\
relative to ROOT.\n\n\
Empty files are skipped; binary, non-UTF-8 and oversized files are copied\n\
unchanged into --out-dir. Use `-` as the only PATH to filter stdin to stdout.\n\n\
Examples:\n\
  anchor-rewriter rewrite --rel nofollow\n\
  anchor-rewriter rewrite public --keyword example.com --white-list --rel nofollow --target _blank\n\
  anchor-rewriter rewrite src --config anchors.json --out-dir dist\n"
    )]
    Rewrite {
        /// Files or directories (relative to ROOT unless absolute), or `-` for stdin.
        #[arg(value_name = "PATHS", num_args = 0..)]
        paths: Vec<PathBuf>,

        /// Write results under this directory instead of in place.
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Report what rewrite would do, anchor by anchor, without writing.
    #[command(
        long_about = "Evaluate the rules against every anchor and emit one anchor result per\n\
element with its href, the decision reason and the attributes that would be added.\n\
No file is modified.\n\n\
Example:\n\
  anchor-rewriter plan --keyword twitter.com --rel nofollow --format md\n"
    )]
    Plan {
        /// Files or directories (relative to ROOT unless absolute).
        #[arg(value_name = "PATHS", num_args = 0..)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        rules: RuleArgs,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

fn log_rejected(err: &ConfigError) {
    debug!("cli"; "rules rejected ({})", err.code());
}

fn is_stdin(paths: &[PathBuf]) -> bool {
    paths.len() == 1 && paths[0] == Path::new("-")
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    crate::core::log::init(cli.verbose, cli.quiet, cli.no_color);

    let format: OutputFormat = cli.format.parse().unwrap_or_else(|e: String| {
        warn!("cli"; "{}, using jsonl", e);
        OutputFormat::default()
    });
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    // Get absolute root path
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    match cli.command {
        Commands::Rewrite {
            paths,
            out_dir,
            rules,
            scan,
        } => {
            let options = rules.resolve().inspect_err(log_rejected)?;
            let rule_set = RuleSet::from_options(options.as_ref()).inspect_err(log_rejected)?;
            debug!("cli"; "rules: {:?}", rule_set);

            if is_stdin(&paths) {
                return crate::backends::rewrite::run_stdin(options.as_ref(), scan.max_file_size);
            }

            let out_dir = out_dir.map(|dir| resolve_under_root(&root, &dir));
            let settings = RewriteSettings {
                destination: match &out_dir {
                    Some(dir) => Destination::OutDir(dir.clone()),
                    None => Destination::InPlace,
                },
                max_file_size: scan.max_file_size,
            };

            crate::backends::rewrite::run_rewrite(
                &root,
                &paths,
                &scan.scan_options(out_dir),
                &settings,
                &rule_set,
                render_config,
            )
        }

        Commands::Plan { paths, rules, scan } => {
            let rule_set = rules.rule_set().inspect_err(log_rejected)?;
            debug!("cli"; "rules: {:?}", rule_set);

            crate::backends::plan::run_plan(
                &root,
                &paths,
                &scan.scan_options(None),
                &rule_set,
                scan.max_file_size,
                render_config,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_options_is_missing() {
        let args = RuleArgs::default();
        assert!(matches!(
            args.rule_set(),
            Err(ConfigError::ConfigurationMissing)
        ));
    }

    #[test]
    fn test_flags_build_options() {
        let args = RuleArgs {
            keywords: vec!["a.com".to_string(), "b.com".to_string()],
            rel: Some("nofollow".to_string()),
            white_list: true,
            ..RuleArgs::default()
        };

        let options = args.resolve().unwrap().unwrap();
        assert_eq!(options.keyword, Some(serde_json::json!(["a.com", "b.com"])));
        assert_eq!(options.rel.as_deref(), Some("nofollow"));
        assert!(options.white_list);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("options.json");
        fs::write(
            &path,
            r#"{"keyword": "example.com", "rel": "external", "target": "_new"}"#,
        )
        .unwrap();

        let args = RuleArgs {
            config: Some(path),
            rel: Some("nofollow".to_string()),
            ..RuleArgs::default()
        };

        let options = args.resolve().unwrap().unwrap();
        assert_eq!(options.keyword, Some(serde_json::json!("example.com")));
        assert_eq!(options.rel.as_deref(), Some("nofollow"));
        assert_eq!(options.target.as_deref(), Some("_new"));
    }

    #[test]
    fn test_no_white_list_overrides_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("options.json");
        fs::write(
            &path,
            r#"{"keyword": "example.com", "rel": "nofollow", "whiteList": true}"#,
        )
        .unwrap();

        let args = RuleArgs {
            config: Some(path.clone()),
            ..RuleArgs::default()
        };
        assert!(args.resolve().unwrap().unwrap().white_list);

        let args = RuleArgs {
            config: Some(path),
            no_white_list: true,
            ..RuleArgs::default()
        };
        assert!(!args.resolve().unwrap().unwrap().white_list);
    }

    #[test]
    fn test_last_white_list_flag_wins() {
        let cli = Cli::try_parse_from([
            "anchor-rewriter",
            "plan",
            "--rel",
            "nofollow",
            "--white-list",
            "--no-white-list",
        ])
        .unwrap();
        let Commands::Plan { rules, .. } = cli.command else {
            panic!("expected plan");
        };
        assert!(!rules.white_list);
        assert!(rules.no_white_list);
    }

    #[test]
    fn test_invalid_keyword_in_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("options.json");
        fs::write(&path, r#"{"keyword": 3, "rel": "nofollow"}"#).unwrap();

        let args = RuleArgs {
            config: Some(path),
            ..RuleArgs::default()
        };
        assert!(matches!(
            args.rule_set(),
            Err(ConfigError::InvalidKeywordType)
        ));
    }

    #[test]
    fn test_is_stdin() {
        assert!(is_stdin(&[PathBuf::from("-")]));
        assert!(!is_stdin(&[PathBuf::from("site")]));
        assert!(!is_stdin(&[]));
    }

    #[test]
    fn test_scan_options_strip_dots() {
        let scan = ScanArgs {
            extensions: vec![".html".to_string(), "xhtml".to_string()],
            hidden: false,
            no_ignore: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        };
        let options = scan.scan_options(None);
        assert_eq!(options.extensions, vec!["html", "xhtml"]);
        assert!(!options.ignore);
    }
}
