//! Start-tag scanner
//!
//! Walks the source the way the HTML tokenizer does, but only reports start
//! tags, with exact byte offsets for their attributes:
//! - comments, doctypes, CDATA and processing instructions are skipped
//! - end tags are consumed (attributes included) and dropped
//! - the content of text-only elements (`script`, `style`, `textarea`, `pre`
//!   and friends) is never scanned for tags
//! - a tag cut off by the end of input is not reported
//!
//! Attribute values follow the tokenizer rules, so `href=/path/` is an
//! unquoted value `/path/` and not a self-closing tag.

use super::escape::unescape_attr;

/// Elements whose content is kept as text instead of markup
const TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
    "pre",
];

/// One attribute of a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased name
    pub name: String,
    /// Decoded value, `None` when the attribute has no `=`
    pub value: Option<String>,
}

/// A start tag found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercased tag name
    pub name: String,
    /// Byte offset of `<`
    pub offset: usize,
    /// Attributes in source order; repeated names keep the first occurrence
    pub attributes: Vec<Attribute>,
    /// Byte offset right after the last attribute (or the tag name)
    pub attributes_end: usize,
    /// The last attribute ends in a bare `=` with no value
    pub dangling_value: bool,
    /// Byte offset one past the closing `>`
    pub end: usize,
}

/// Iterator over the start tags of a document, in source order
pub struct StartTags<'a> {
    source: &'a str,
    pos: usize,
}

/// Scan `source` for start tags
pub fn start_tags(source: &str) -> StartTags<'_> {
    StartTags { source, pos: 0 }
}

impl Iterator for StartTags<'_> {
    type Item = StartTag;

    fn next(&mut self) -> Option<StartTag> {
        let bytes = self.source.as_bytes();

        while self.pos < bytes.len() {
            let Some(lt) = find(bytes, self.pos, b"<") else {
                self.pos = bytes.len();
                break;
            };

            match bytes.get(lt + 1) {
                Some(b'!') => self.pos = skip_markup_declaration(bytes, lt),
                Some(b'?') => self.pos = skip_bogus_comment(bytes, lt + 2),
                Some(b'/') => match bytes.get(lt + 2) {
                    Some(c) if c.is_ascii_alphabetic() => match read_tag(self.source, lt, lt + 2) {
                        Some(tag) => self.pos = tag.end,
                        None => self.pos = bytes.len(),
                    },
                    Some(b'>') => self.pos = lt + 3,
                    Some(_) => self.pos = skip_bogus_comment(bytes, lt + 2),
                    None => self.pos = bytes.len(),
                },
                Some(c) if c.is_ascii_alphabetic() => {
                    let Some(tag) = read_tag(self.source, lt, lt + 1) else {
                        self.pos = bytes.len();
                        break;
                    };

                    self.pos = if tag.name == "plaintext" {
                        bytes.len()
                    } else if TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                        skip_text_content(bytes, tag.end, &tag.name)
                    } else {
                        tag.end
                    };
                    return Some(tag);
                }
                _ => self.pos = lt + 1,
            }
        }

        None
    }
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

/// Skip to just past the next `>`
fn skip_bogus_comment(bytes: &[u8], from: usize) -> usize {
    find(bytes, from, b">").map_or(bytes.len(), |p| p + 1)
}

/// Skip `<!-- ... -->` or any other `<! ... >` opened at `lt`
fn skip_markup_declaration(bytes: &[u8], lt: usize) -> usize {
    if !bytes[lt..].starts_with(b"<!--") {
        return skip_bogus_comment(bytes, lt + 2);
    }

    let body = lt + 4;
    let rest = &bytes[body..];
    if rest.starts_with(b">") {
        return body + 1;
    }
    if rest.starts_with(b"->") {
        return body + 2;
    }

    let close = find(bytes, body, b"-->").map(|p| p + 3);
    let bang_close = find(bytes, body, b"--!>").map(|p| p + 4);
    match (close, bang_close) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => bytes.len(),
    }
}

/// Offset of the `</name` that closes a text-only element, or end of input
fn skip_text_content(bytes: &[u8], from: usize, name: &str) -> usize {
    let mut at = from;
    while let Some(open) = find(bytes, at, b"</") {
        let name_start = open + 2;
        let name_end = name_start + name.len();
        let same_name = bytes
            .get(name_start..name_end)
            .is_some_and(|n| n.eq_ignore_ascii_case(name.as_bytes()));
        let terminated = bytes
            .get(name_end)
            .map_or(true, |&b| is_space(b) || b == b'/' || b == b'>');

        if same_name && terminated {
            return open;
        }
        at = name_start;
    }
    bytes.len()
}

/// Read a start or end tag whose name begins at `name_start`.
///
/// Returns `None` when the input ends inside the tag.
fn read_tag(source: &str, lt: usize, name_start: usize) -> Option<StartTag> {
    let bytes = source.as_bytes();
    let len = bytes.len();

    let mut i = name_start;
    while i < len && !is_space(bytes[i]) && bytes[i] != b'/' && bytes[i] != b'>' {
        i += 1;
    }

    let mut tag = StartTag {
        name: source[name_start..i].to_ascii_lowercase(),
        offset: lt,
        attributes: Vec::new(),
        attributes_end: i,
        dangling_value: false,
        end: len,
    };

    loop {
        // Before attribute name; a `/` only matters right before `>`.
        while i < len && (is_space(bytes[i]) || bytes[i] == b'/') {
            if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>') {
                tag.end = i + 2;
                return Some(tag);
            }
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(b'>') => {
                tag.end = i + 1;
                return Some(tag);
            }
            Some(_) => {}
        }

        // Attribute name; a leading `=` belongs to the name.
        let name_start = i;
        i += 1;
        while i < len && !is_space(bytes[i]) && !matches!(bytes[i], b'/' | b'>' | b'=') {
            i += 1;
        }
        let name = source[name_start..i].to_ascii_lowercase();
        tag.attributes_end = i;
        tag.dangling_value = false;

        let mut j = i;
        while j < len && is_space(bytes[j]) {
            j += 1;
        }

        let mut value = None;
        if bytes.get(j) == Some(&b'=') {
            j += 1;
            while j < len && is_space(bytes[j]) {
                j += 1;
            }

            match *bytes.get(j)? {
                quote @ (b'"' | b'\'') => {
                    let close = find(bytes, j + 1, &[quote])?;
                    value = Some(&source[j + 1..close]);
                    i = close + 1;
                }
                b'>' => {
                    value = Some("");
                    tag.dangling_value = true;
                    i = j;
                }
                _ => {
                    let start = j;
                    while j < len && !is_space(bytes[j]) && bytes[j] != b'>' {
                        j += 1;
                    }
                    if j >= len {
                        return None;
                    }
                    value = Some(&source[start..j]);
                    i = j;
                }
            }
            tag.attributes_end = i;
        }

        if !tag.attributes.iter().any(|a| a.name == name) {
            tag.attributes.push(Attribute {
                name,
                value: value.map(|v| unescape_attr(v).into_owned()),
            });
        }
    }
}
