//! Attribute string parsing.
//!
//! Parses the `{#id .class key="value" flag}` syntax of directives and the
//! `language key=value flag` info string of code fences.

use crate::Attributes;

/// Parse a directive attribute string (without braces).
///
/// Supports `#id`, `.class` (classes are joined with spaces), `key="value"`,
/// `key='value'`, `key=value` and bare `flag` (stored with an empty value).
pub(crate) fn parse_attributes(input: &str) -> Attributes {
    let mut attrs = Attributes::new();
    let mut classes: Vec<&str> = Vec::new();
    let mut remaining = input.trim();

    while !remaining.is_empty() {
        if let Some(rest) = remaining.strip_prefix('#') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                .unwrap_or(rest.len());
            attrs.insert("id", &rest[..end]);
            remaining = &rest[end..];
        } else if let Some(rest) = remaining.strip_prefix('.') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                .unwrap_or(rest.len());
            classes.push(&rest[..end]);
            remaining = &rest[end..];
        } else {
            let (key, value, rest) = parse_word(remaining);
            if !key.is_empty() {
                attrs.insert(key, value);
            }
            remaining = rest;
        }
        remaining = remaining.trim_start();
    }

    if !classes.is_empty() {
        attrs.insert("class", classes.join(" "));
    }

    attrs
}

/// Parse a fence info string.
///
/// The first bare word becomes the `language` attribute; everything after it
/// is parsed as attributes. An empty info string still yields `language=""`.
pub(crate) fn parse_info_string(info: &str) -> Attributes {
    let info = info.trim();
    let mut attrs = Attributes::new();

    let first_end = info.find(char::is_whitespace).unwrap_or(info.len());
    let first = &info[..first_end];

    let rest = if first.contains('=') {
        info
    } else {
        attrs.insert("language", first);
        &info[first_end..]
    };

    for (key, value) in parse_attributes(rest).iter() {
        attrs.insert(key, value);
    }

    attrs
}

/// Parse one `key=value` pair or bare flag.
///
/// Returns `(key, value, rest)`. Unterminated quotes take the remainder.
fn parse_word(s: &str) -> (&str, &str, &str) {
    let key_end = s
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(s.len());
    let key = &s[..key_end];
    let after_key = &s[key_end..];

    let Some(after_eq) = after_key.strip_prefix('=') else {
        return (key, "", after_key);
    };

    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            return match stripped.find(quote) {
                Some(end) => (key, &stripped[..end], &stripped[end + 1..]),
                None => (key, stripped, ""),
            };
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    (key, &after_eq[..end], &after_eq[end..])
}
