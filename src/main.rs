//! anchor-rewriter - Rewrite `rel`/`target` attributes of HTML anchors
//!
//! anchor-rewriter provides:
//! - Keyword rules on anchor hrefs (include or white-list mode)
//! - Non-destructive attribute edits that keep the rest of the file byte for byte
//! - Directory walking with ignore rules, in place or into an output directory
//! - Unified output format (jsonl/json/md)

use anyhow::Result;
use clap::Parser;

#[macro_use]
mod core;

mod backends;
mod cli;
mod html;
mod rules;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
