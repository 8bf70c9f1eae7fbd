//! Backends module - File discovery and the transform pipeline
//!
//! Provides:
//! - scan: HTML document discovery with the ignore crate
//! - rewrite: Apply rules to files and write the results
//! - plan: Dry-run report of per-anchor decisions

pub mod plan;
pub mod rewrite;
pub mod scan;
