//! Rules module - Rewrite configuration and the per-anchor rule engine
//!
//! Provides:
//! - options: user-facing options, keyword classification, configuration errors
//! - engine: validated rule set, anchor evaluation and attribute rewriting

pub mod engine;
pub mod options;

pub use engine::{transform, RuleSet};
pub use options::{ConfigError, RewriteOptions};
