//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Diagnostics on stderr (log macros)
//! - Unified result model (ResultItem)
//! - Rendering functions for different output formats
//! - Path normalization utilities
//! - Whole-file reading for the transform pipeline

#[macro_use]
pub mod log;

pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
