//! HTML module - Document adapter over a start-tag scanner
//!
//! Provides:
//! - document: parse text, enumerate anchors, serialize with appended attributes
//! - tokenizer: start tags and attributes with byte offsets, skipping text-only elements
//! - escape: attribute value escaping and character reference decoding

pub mod document;
pub mod escape;
pub mod tokenizer;

pub use document::{Document, ElementHandle};
