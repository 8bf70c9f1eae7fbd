//! Parsed HTML document with editable anchors
//!
//! The start-tag scanner locates every `<a>` element and its attributes.
//! Edits are recorded on the anchor and spliced back into the original source
//! on serialization, so a document without edits round-trips byte for byte.

use std::fmt::Write as _;

use super::escape::escape_attr;
use super::tokenizer::{start_tags, StartTag};

/// Attribute access the rule engine needs from an element.
///
/// Attribute names are matched ASCII case-insensitively.
pub trait ElementHandle {
    /// Value of the attribute, `Some("")` for a valueless attribute.
    fn get_attribute(&self, name: &str) -> Option<&str>;

    /// Append an attribute after the existing ones.
    ///
    /// Returns `false` and changes nothing when `name` is already present.
    fn set_attribute(&mut self, name: &str, value: &str) -> bool;

    fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }
}

/// An `<a>` element found in the document
#[derive(Debug, Clone)]
pub struct Anchor {
    /// Byte offset of the `<` opening the start tag
    offset: usize,

    /// Byte offset where appended attributes are written
    insert_at: usize,

    /// The last attribute is a bare `=` that needs an empty value first
    dangling_value: bool,

    /// Attributes as parsed, in source order
    attributes: Vec<(String, Option<String>)>,

    /// Attributes appended since parsing
    added: Vec<(String, String)>,
}

impl Anchor {
    /// Byte offset of the start tag in the source
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `href` value, empty when absent
    pub fn href(&self) -> &str {
        self.get_attribute("href").unwrap_or_default()
    }

    pub fn is_modified(&self) -> bool {
        !self.added.is_empty()
    }
}

impl ElementHandle for Anchor {
    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_deref().unwrap_or_default())
            .or_else(|| {
                self.added
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value.as_str())
            })
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        if self.has_attribute(name) {
            return false;
        }
        self.added.push((name.to_string(), value.to_string()));
        true
    }
}

/// An HTML document owning its source text and anchors
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    anchors: Vec<Anchor>,
}

impl Document {
    /// Parse a document. Never fails: text without markup yields a document
    /// without anchors that serializes to the original text.
    pub fn parse(text: impl Into<String>) -> Self {
        let source = text.into();
        let anchors = start_tags(&source)
            .filter(|tag| tag.name == "a")
            .map(Anchor::from)
            .collect();

        Self { source, anchors }
    }

    /// Anchors in document order
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    /// Mutable anchors in document order
    pub fn anchors_mut(&mut self) -> &mut [Anchor] {
        &mut self.anchors
    }

    /// Whether any anchor has appended attributes
    pub fn is_modified(&self) -> bool {
        self.anchors.iter().any(Anchor::is_modified)
    }

    /// 1-indexed line of a byte offset in the source
    pub fn line_of(&self, offset: usize) -> u32 {
        let end = offset.min(self.source.len());
        self.source.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count() as u32
            + 1
    }

    /// Serialize the document, writing appended attributes at the end of
    /// each modified start tag.
    pub fn serialize(&self) -> String {
        if !self.is_modified() {
            return self.source.clone();
        }

        let mut output = String::with_capacity(self.source.len() + self.anchors.len() * 24);
        let mut cursor = 0;

        for anchor in self.anchors.iter().filter(|a| a.is_modified()) {
            output.push_str(&self.source[cursor..anchor.insert_at]);
            if anchor.dangling_value {
                output.push_str("\"\"");
            }
            for (name, value) in &anchor.added {
                let _ = write!(output, " {}=\"{}\"", name, escape_attr(value));
            }
            cursor = anchor.insert_at;
        }

        output.push_str(&self.source[cursor..]);
        output
    }
}

impl From<StartTag> for Anchor {
    fn from(tag: StartTag) -> Self {
        Self {
            offset: tag.offset,
            insert_at: tag.attributes_end,
            dangling_value: tag.dangling_value,
            attributes: tag
                .attributes
                .into_iter()
                .map(|a| (a.name, a.value))
                .collect(),
            added: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finds_nested_anchors_in_order() {
        let doc = Document::parse(
            r#"<div><p><a href="https://one.test">1</a></p></div><a href="https://two.test">2</a>"#,
        );
        let hrefs: Vec<_> = doc.anchors().iter().map(|a| a.href()).collect();
        assert_eq!(hrefs, vec!["https://one.test", "https://two.test"]);
    }

    #[test]
    fn test_parse_uppercase_tag_and_attribute() {
        let doc = Document::parse(r#"<A HREF="https://x.test">X</A>"#);
        assert_eq!(doc.anchors().len(), 1);
        assert_eq!(doc.anchors()[0].href(), "https://x.test");
    }

    #[test]
    fn test_untouched_document_round_trips() {
        let source = "<html>\r\n<body>\r\n  <a href=\"https://github.com/\" target=\"_new\" rel=\"external\"\r\n     title=\"T\">G</a>\r\n</body>\r\n</html>\r\n";
        let doc = Document::parse(source);
        assert_eq!(doc.serialize(), source);
    }

    #[test]
    fn test_non_html_text_round_trips() {
        let source = "just some text, no markup < here & there";
        let doc = Document::parse(source);
        assert!(doc.anchors().is_empty());
        assert_eq!(doc.serialize(), source);
    }

    #[test]
    fn test_set_attribute_appends_at_end_of_start_tag() {
        let mut doc = Document::parse(r#"<a href="https://www.example.com">Example</a>"#);
        assert!(doc.anchors_mut()[0].set_attribute("rel", "nofollow"));
        assert!(doc.anchors_mut()[0].set_attribute("target", "_new"));
        assert_eq!(
            doc.serialize(),
            r#"<a href="https://www.example.com" rel="nofollow" target="_new">Example</a>"#
        );
    }

    #[test]
    fn test_set_attribute_refuses_existing() {
        let mut doc = Document::parse(r#"<a href="x" REL="">X</a>"#);
        let anchor = &mut doc.anchors_mut()[0];
        assert_eq!(anchor.get_attribute("rel"), Some(""));
        assert!(!anchor.set_attribute("rel", "nofollow"));
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_self_closing_anchor() {
        let mut doc = Document::parse(r#"<a href="x" />"#);
        doc.anchors_mut()[0].set_attribute("rel", "nofollow");
        assert_eq!(doc.serialize(), r#"<a href="x" rel="nofollow" />"#);
    }

    #[test]
    fn test_anchor_without_attributes() {
        let mut doc = Document::parse("<p><a>bare</a></p>");
        assert_eq!(doc.anchors()[0].href(), "");
        doc.anchors_mut()[0].set_attribute("target", "_blank");
        assert_eq!(doc.serialize(), r#"<p><a target="_blank">bare</a></p>"#);
    }

    #[test]
    fn test_quoted_gt_in_attribute_value() {
        let mut doc = Document::parse(r#"<a title="a > b" href="x">t</a>"#);
        doc.anchors_mut()[0].set_attribute("rel", "nofollow");
        assert_eq!(
            doc.serialize(),
            r#"<a title="a > b" href="x" rel="nofollow">t</a>"#
        );
    }

    #[test]
    fn test_appended_value_is_escaped() {
        let mut doc = Document::parse("<a href=x>t</a>");
        doc.anchors_mut()[0].set_attribute("rel", r#"a"b"#);
        assert_eq!(doc.serialize(), r#"<a href=x rel="a&quot;b">t</a>"#);
    }

    #[test]
    fn test_line_of() {
        let doc = Document::parse("<p>\n\n<a href=\"x\">t</a>");
        assert_eq!(doc.line_of(doc.anchors()[0].offset()), 3);
    }

    #[test]
    fn test_unquoted_href_with_slashes() {
        let mut doc = Document::parse(
            "<a href=\"https://ok.com\">ok</a>\n<a href=https://x.com/page>x</a>\n<a href=/path/>p</a>",
        );
        let hrefs: Vec<_> = doc.anchors().iter().map(|a| a.href()).collect();
        assert_eq!(hrefs, vec!["https://ok.com", "https://x.com/page", "/path/"]);

        for anchor in doc.anchors_mut() {
            anchor.set_attribute("rel", "nofollow");
        }
        assert_eq!(
            doc.serialize(),
            "<a href=\"https://ok.com\" rel=\"nofollow\">ok</a>\n<a href=https://x.com/page rel=\"nofollow\">x</a>\n<a href=/path/ rel=\"nofollow\">p</a>"
        );
    }

    #[test]
    fn test_root_href() {
        let doc = Document::parse("<p><a href=/>home</a></p>");
        assert_eq!(doc.anchors()[0].href(), "/");
    }

    #[test]
    fn test_dangling_equals_gets_empty_value() {
        let mut doc = Document::parse("<a href=>x</a>");
        assert_eq!(doc.anchors()[0].get_attribute("href"), Some(""));
        doc.anchors_mut()[0].set_attribute("rel", "nofollow");
        assert_eq!(doc.serialize(), r#"<a href="" rel="nofollow">x</a>"#);
    }

    #[test]
    fn test_anchor_markup_in_script_is_not_an_anchor() {
        let source = r#"<script>var s = '<a href="x">y</a>';</script><a href="z">z</a>"#;
        let doc = Document::parse(source);
        assert_eq!(doc.anchors().len(), 1);
        assert_eq!(doc.anchors()[0].href(), "z");
    }

    #[test]
    fn test_anchor_markup_in_style_is_not_an_anchor() {
        let doc = Document::parse(r#"<style>/* <a href="x"> */</style>"#);
        assert!(doc.anchors().is_empty());
    }

    #[test]
    fn test_anchor_markup_in_textarea_is_not_an_anchor() {
        let doc = Document::parse(r#"<textarea><a href="x">y</a></textarea>"#);
        assert!(doc.anchors().is_empty());
    }

    #[test]
    fn test_anchor_markup_in_title_and_noscript_is_not_an_anchor() {
        let doc = Document::parse(
            r#"<title><a href="x"></title><noscript><a href="y">y</a></noscript>"#,
        );
        assert!(doc.anchors().is_empty());
    }

    #[test]
    fn test_anchor_in_pre_is_left_alone() {
        let doc = Document::parse(r#"<pre><a href="x">y</a></pre><p><a href="z">z</a></p>"#);
        let hrefs: Vec<_> = doc.anchors().iter().map(|a| a.href()).collect();
        assert_eq!(hrefs, vec!["z"]);
    }

    #[test]
    fn test_anchor_in_comment_is_not_an_anchor() {
        let doc = Document::parse(r#"<!-- <a href="x">old</a> --><a href="y">y</a>"#);
        assert_eq!(doc.anchors().len(), 1);
    }

    #[test]
    fn test_entity_in_href_is_decoded() {
        let doc = Document::parse(r#"<a href="/search?q=a&amp;page=2">s</a>"#);
        assert_eq!(doc.anchors()[0].href(), "/search?q=a&page=2");
    }
}
