//! Diagnostics on stderr
//!
//! Results go to stdout; everything meant for a human goes through these
//! macros to stderr with a colored scope prefix.
//!
//! ```ignore
//! info!("rewrite"; "{} files processed", count);
//! debug!("scan"; "skipping {}", path.display());
//! warn!("rewrite"; "cannot read {}", path.display());
//! ```

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);
static QUIET: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// Configure verbosity and color once, from the CLI flags
pub fn init(verbose: bool, quiet: bool, no_color: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
    QUIET.store(quiet, Ordering::SeqCst);
    if no_color {
        colored::control::set_override(false);
    }
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::SeqCst)
}

/// Whether a message at `level` is shown. Quiet wins over verbose.
pub fn enabled(level: Level, verbose: bool, quiet: bool) -> bool {
    match level {
        Level::Debug => verbose && !quiet,
        Level::Info | Level::Warn => !quiet,
    }
}

/// Write one message to stderr if its level is enabled
pub fn emit(level: Level, scope: &str, message: &str) {
    if !enabled(level, is_verbose(), is_quiet()) {
        return;
    }

    let prefix = format!("[{}]", scope);
    let prefix = match level {
        Level::Debug => prefix.dimmed(),
        Level::Info => prefix.cyan().bold(),
        Level::Warn => prefix.yellow().bold(),
    };
    eprintln!("{} {}", prefix, message);
}

macro_rules! info {
    ($scope:expr; $($arg:tt)*) => {{
        $crate::core::log::emit($crate::core::log::Level::Info, $scope, &format!($($arg)*))
    }};
}

macro_rules! debug {
    ($scope:expr; $($arg:tt)*) => {{
        $crate::core::log::emit($crate::core::log::Level::Debug, $scope, &format!($($arg)*))
    }};
}

macro_rules! warn {
    ($scope:expr; $($arg:tt)*) => {{
        $crate::core::log::emit($crate::core::log::Level::Warn, $scope, &format!($($arg)*))
    }};
}
