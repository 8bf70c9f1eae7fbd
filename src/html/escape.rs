//! Attribute value escaping and character reference decoding

use std::borrow::Cow;

/// Characters that cannot appear verbatim inside a double-quoted attribute value.
const ATTR_ESCAPE_CHARS: [char; 4] = ['&', '"', '<', '>'];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    }
}

/// Escape a value for a double-quoted attribute.
///
/// Borrows when nothing needs escaping.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ATTR_ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => escaped.push_str(entity),
            None => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn named_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

fn numeric_reference(digits: &str) -> Option<char> {
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    match code {
        0 => Some(char::REPLACEMENT_CHARACTER),
        _ => Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)),
    }
}

/// Decode character references in a raw attribute value.
///
/// Handles numeric references and the common named ones; anything else is
/// kept verbatim.
pub fn unescape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut decoded = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];

        let reference = tail.find(';').and_then(|semi| {
            let body = &tail[..semi];
            let c = match body.strip_prefix('#') {
                Some(digits) => numeric_reference(digits),
                None => named_reference(body),
            };
            c.map(|c| (c, semi))
        });

        match reference {
            Some((c, semi)) => {
                decoded.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                decoded.push('&');
                rest = tail;
            }
        }
    }
    decoded.push_str(rest);
    Cow::Owned(decoded)
}
